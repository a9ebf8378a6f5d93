//! Terraform State Management
//!
//! Resource state crosses the engine boundary as JSON objects. Records are
//! decoded into typed structs on the way in and encoded back on the way out.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use citrixitm_common::{Error, Result};

/// Decode a resource record from engine state
///
/// Shape errors (missing required attributes, unknown attributes, wrong
/// types) are reported as validation errors.
pub fn decode_record<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::Validation(e.to_string()))
}

/// Encode a resource record as engine state
pub fn encode_record<T: Serialize>(record: &T) -> Result<Value> {
    Ok(serde_json::to_value(record)?)
}

/// The state object, or None when the engine passed nothing or null
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Parse the persisted decimal identifier into the API's integer id
pub fn parse_id(id: &str) -> Result<i64> {
    id.parse::<i64>().map_err(|source| Error::InvalidId {
        id: id.to_string(),
        source,
    })
}

//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod dns_app;
pub mod platform;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use citrixitm_common::Result;

use crate::client::ItmApi;
use crate::retry::RetryPolicy;

/// Everything a handler needs to talk to the API
#[derive(Clone)]
pub struct ItmContext {
    pub api: Arc<dyn ItmApi>,
    pub retry: RetryPolicy,
    /// Publish DNS applications as part of create and update
    pub publish_dns_apps: bool,
}

impl ItmContext {
    pub fn new(api: Arc<dyn ItmApi>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            publish_dns_apps: true,
        }
    }
}

/// Trait for resource operations
#[async_trait]
pub trait Resource: Send + Sync {
    /// Typed declarative record
    type Record: Serialize + DeserializeOwned + Send + Sync;

    /// Resource type name
    fn type_name() -> &'static str;

    /// Persisted identifier of a record
    fn id_of(record: &Self::Record) -> &str;

    /// Create a new resource and return its refreshed state
    async fn create(ctx: &ItmContext, desired: &Self::Record) -> Result<Self::Record>;

    /// Fetch the authoritative state for an identifier
    async fn read_by_id(ctx: &ItmContext, id: &str) -> Result<Self::Record>;

    /// Update an existing resource; `prior` is the last-known state
    async fn update(
        ctx: &ItmContext,
        prior: &Self::Record,
        desired: &Self::Record,
    ) -> Result<Self::Record>;

    /// Delete a resource
    async fn delete(ctx: &ItmContext, state: &Self::Record) -> Result<()>;

    /// Read an existing resource
    async fn read(ctx: &ItmContext, state: &Self::Record) -> Result<Self::Record> {
        Self::read_by_id(ctx, Self::id_of(state)).await
    }

    /// Materialise a full record from a bare identifier
    async fn import(ctx: &ItmContext, id: &str) -> Result<Self::Record> {
        Self::read_by_id(ctx, id).await
    }
}

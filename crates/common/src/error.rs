//! Error types for the Citrix ITM provider

use std::fmt;
use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// CRUD operation a remote call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Read => write!(f, "READ"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed input in a resource record. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The persisted identifier is not a decimal integer. Never retried.
    #[error("Invalid resource id {id:?}: {source}")]
    InvalidId {
        id: String,
        source: std::num::ParseIntError,
    },

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode API response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Last error of a remote call whose retry budget ran out.
    #[error("[{kind}][{operation}] remote call failed for {id}: {source}")]
    Remote {
        kind: &'static str,
        operation: Operation,
        id: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Returns the innermost error, looking through retry context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Remote { source, .. } => source.root(),
            other => other,
        }
    }

    /// True if the remote service reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound { .. })
    }
}

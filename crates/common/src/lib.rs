//! Citrix ITM Common Library
//!
//! Error types and the wire representation of the Citrix Intelligent Traffic
//! Management configuration API shared by the provider crate.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Operation, Result};
pub use types::*;

/// Provider version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

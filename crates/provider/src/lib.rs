//! Citrix ITM Terraform Provider
//!
//! This crate maps `citrixitm_platform` and `citrixitm_dns_app` resources
//! onto the Citrix Intelligent Traffic Management configuration API.

pub mod client;
pub mod config;
pub mod provider;
pub mod resources;
pub mod retry;
pub mod state;

pub use client::{ItmApi, ItmClient};
pub use config::ProviderConfig;
pub use provider::CitrixItmProvider;
pub use resources::{ItmContext, Resource};
pub use retry::RetryPolicy;

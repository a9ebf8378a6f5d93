//! Citrix ITM Terraform Provider Implementation
//!
//! Routes engine requests to the resource handler registered for a type
//! name. State crosses this boundary as JSON values.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use citrixitm_common::{Error, Result};

use crate::client::{ItmApi, ItmClient};
use crate::config::ProviderConfig;
use crate::resources::{
    dns_app::DnsAppResource, platform::PlatformResource, ItmContext, Resource,
};
use crate::state::{decode_record, encode_record, present};

/// Citrix ITM Terraform Provider
pub struct CitrixItmProvider {
    ctx: ItmContext,
}

impl CitrixItmProvider {
    /// Configure a provider talking to the ITM API over HTTP
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        info!(base_url = config.api_root(), "Configuring provider");
        let client = ItmClient::new(config)?;

        let mut ctx = ItmContext::new(Arc::new(client));
        ctx.publish_dns_apps = config.publish_dns_apps;
        Ok(Self { ctx })
    }

    /// Provider backed by an arbitrary API implementation
    pub fn with_context(ctx: ItmContext) -> Self {
        Self { ctx }
    }

    pub fn with_api(api: Arc<dyn ItmApi>) -> Self {
        Self::with_context(ItmContext::new(api))
    }

    /// Resource type names this provider manages
    pub fn resource_types() -> [&'static str; 2] {
        [PlatformResource::type_name(), DnsAppResource::type_name()]
    }

    /// Refresh a resource from the API
    pub async fn read_resource(&self, type_name: &str, current_state: &Value) -> Result<Value> {
        info!("ReadResource called for {type_name}");

        match type_name {
            t if t == PlatformResource::type_name() => {
                read::<PlatformResource>(&self.ctx, current_state).await
            }
            t if t == DnsAppResource::type_name() => {
                read::<DnsAppResource>(&self.ctx, current_state).await
            }
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        }
    }

    /// Apply a planned change
    ///
    /// An absent prior state means create, an absent planned state means
    /// delete, and both present means update. Returns the new state, which
    /// is null after a delete.
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior_state: Option<&Value>,
        planned_state: Option<&Value>,
    ) -> Result<Value> {
        info!("ApplyResourceChange called for {type_name}");

        match type_name {
            t if t == PlatformResource::type_name() => {
                apply::<PlatformResource>(&self.ctx, prior_state, planned_state).await
            }
            t if t == DnsAppResource::type_name() => {
                apply::<DnsAppResource>(&self.ctx, prior_state, planned_state).await
            }
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        }
    }

    /// Build the state of an existing remote object from its identifier
    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> Result<Value> {
        info!("ImportResourceState called for {type_name} with ID {id}");

        match type_name {
            t if t == PlatformResource::type_name() => {
                import::<PlatformResource>(&self.ctx, id).await
            }
            t if t == DnsAppResource::type_name() => {
                import::<DnsAppResource>(&self.ctx, id).await
            }
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        }
    }
}

async fn read<R: Resource>(ctx: &ItmContext, state: &Value) -> Result<Value> {
    let record: R::Record = decode_record(state)?;
    let refreshed = R::read(ctx, &record).await?;
    encode_record(&refreshed)
}

async fn apply<R: Resource>(
    ctx: &ItmContext,
    prior: Option<&Value>,
    planned: Option<&Value>,
) -> Result<Value> {
    match (present(prior), present(planned)) {
        (None, Some(planned)) => {
            debug!("Creating {}", R::type_name());
            let desired: R::Record = decode_record(planned)?;
            encode_record(&R::create(ctx, &desired).await?)
        }
        (Some(prior), None) => {
            debug!("Deleting {}", R::type_name());
            let state: R::Record = decode_record(prior)?;
            R::delete(ctx, &state).await?;
            Ok(Value::Null)
        }
        (Some(prior), Some(planned)) => {
            debug!("Updating {}", R::type_name());
            let prior: R::Record = decode_record(prior)?;
            let desired: R::Record = decode_record(planned)?;
            encode_record(&R::update(ctx, &prior, &desired).await?)
        }
        (None, None) => Ok(Value::Null),
    }
}

async fn import<R: Resource>(ctx: &ItmContext, id: &str) -> Result<Value> {
    encode_record(&R::import(ctx, id).await?)
}

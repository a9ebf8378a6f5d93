//! DNS application Resource handler for Terraform

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use citrixitm_common::{AppProtocol, AppType, DnsApp, DnsAppOpts, Operation, Result};

use super::{ItmContext, Resource};
use crate::state::parse_id;

/// Log and error tag for this resource kind
pub const KIND: &str = "DNS_APP";

/// Availability threshold sent with every request
pub const AVAILABILITY_THRESHOLD: i64 = 10;

/// Declarative DNS application record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DnsAppRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub app_type: AppType,
    #[serde(default)]
    pub protocol: AppProtocol,
    /// Application script or configuration
    pub app_data: String,
    pub fallback_cname: String,
    #[serde(default)]
    pub fallback_ttl: i64,
    /// Assigned by the service
    #[serde(default)]
    pub cname: String,
    /// Assigned by the service
    #[serde(default)]
    pub version: i64,
}

/// Compare application payloads, ignoring leading and trailing whitespace
pub fn app_data_equal(old: &str, new: &str) -> bool {
    old.trim() == new.trim()
}

pub fn expand_dns_app(record: &DnsAppRecord) -> DnsAppOpts {
    DnsAppOpts {
        name: record.name.clone(),
        description: record.description.clone(),
        app_type: record.app_type,
        protocol: record.protocol,
        app_data: record.app_data.clone(),
        fallback_cname: record.fallback_cname.clone(),
        fallback_ttl: record.fallback_ttl,
        platforms: Vec::new(),
        avl_threshold: AVAILABILITY_THRESHOLD,
    }
}

pub fn flatten_dns_app(id: &str, app: &DnsApp) -> DnsAppRecord {
    DnsAppRecord {
        id: id.to_string(),
        name: app.name.clone(),
        description: app.description.clone(),
        app_type: app.app_type,
        protocol: app.protocol,
        app_data: app.app_data.clone(),
        fallback_cname: app.fallback_cname.clone(),
        fallback_ttl: app.fallback_ttl,
        cname: app.cname.clone(),
        version: app.version,
    }
}

/// Whether an update has to be sent for `desired` given the last-known state
///
/// `type` and `protocol` are not part of the comparison, so changing only
/// those leaves the remote application untouched.
pub fn has_changes(prior: &DnsAppRecord, desired: &DnsAppRecord) -> bool {
    prior.name != desired.name
        || prior.description != desired.description
        || prior.fallback_cname != desired.fallback_cname
        || prior.fallback_ttl != desired.fallback_ttl
        || !app_data_equal(&prior.app_data, &desired.app_data)
}

pub struct DnsAppResource;

#[async_trait]
impl Resource for DnsAppResource {
    type Record = DnsAppRecord;

    fn type_name() -> &'static str {
        "citrixitm_dns_app"
    }

    fn id_of(record: &DnsAppRecord) -> &str {
        &record.id
    }

    async fn create(ctx: &ItmContext, desired: &DnsAppRecord) -> Result<DnsAppRecord> {
        info!(kind = KIND, "Create start");

        let opts = expand_dns_app(desired);
        debug!(kind = KIND, ?opts, "Create options");

        let publish = ctx.publish_dns_apps;
        let app = ctx
            .retry
            .run(KIND, Operation::Create, &desired.name, || {
                ctx.api.create_dns_app(&opts, publish)
            })
            .await?;

        let id = app.id.to_string();
        info!(kind = KIND, id = %id, "Create success");

        Self::read_by_id(ctx, &id).await
    }

    async fn read_by_id(ctx: &ItmContext, id: &str) -> Result<DnsAppRecord> {
        info!(kind = KIND, id, "Read start");
        let numeric_id = parse_id(id)?;

        let app = ctx
            .retry
            .run(KIND, Operation::Read, id, || ctx.api.get_dns_app(numeric_id))
            .await?;

        debug!(kind = KIND, id, ?app, "Read success");
        Ok(flatten_dns_app(id, &app))
    }

    async fn update(
        ctx: &ItmContext,
        prior: &DnsAppRecord,
        desired: &DnsAppRecord,
    ) -> Result<DnsAppRecord> {
        let id = prior.id.as_str();
        info!(kind = KIND, id, "Update start");
        let numeric_id = parse_id(id)?;

        if has_changes(prior, desired) {
            let opts = expand_dns_app(desired);
            debug!(kind = KIND, id, ?opts, "Update options");

            let publish = ctx.publish_dns_apps;
            let app = ctx
                .retry
                .run(KIND, Operation::Update, id, || {
                    ctx.api.update_dns_app(numeric_id, &opts, publish)
                })
                .await?;

            info!(kind = KIND, id, version = app.version, "Update success");
        } else {
            debug!(kind = KIND, id, "No change detected");
        }

        Self::read_by_id(ctx, id).await
    }

    async fn delete(ctx: &ItmContext, state: &DnsAppRecord) -> Result<()> {
        let id = state.id.as_str();
        info!(kind = KIND, id, "Delete start");
        let numeric_id = parse_id(id)?;

        ctx.retry
            .run(KIND, Operation::Delete, id, || {
                ctx.api.delete_dns_app(numeric_id)
            })
            .await?;

        info!(kind = KIND, id, "Delete success");
        Ok(())
    }
}

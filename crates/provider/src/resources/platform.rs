//! Platform Resource handler for Terraform
//!
//! A platform is a delivery network known to Openmix together with the
//! Radar probes used to measure it.
//!
//! Two mappings are deliberately one-way and kept as the API behaves today:
//! the category id is only ever written (reads use the category name), and
//! `enabled` is always reported as `true` after a read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use citrixitm_common::{Category, Error, Operation, Platform, PlatformOpts, RadarOpts, Result};

use super::{ItmContext, Resource};
use crate::state::parse_id;

/// Log and error tag for this resource kind
pub const KIND: &str = "PLATFORM";

pub const DEFAULT_DESCRIPTION: &str = "Managed by Terraform";
pub const DEFAULT_CATEGORY: &str = "Delivery Networks";
pub const DEFAULT_RADAR_WEIGHT: &str = "10";

/// Category labels with a known numeric id
const CATEGORY_IDS: &[(&str, i64)] = &[("Delivery Networks", 3)];

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_weight() -> String {
    DEFAULT_RADAR_WEIGHT.to_string()
}

fn default_true() -> bool {
    true
}

/// Declarative platform record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformRecord {
    #[serde(default)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Machine name, derived from `name` when empty
    #[serde(default)]
    pub alias: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub openmix_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar: Option<RadarRecord>,
}

/// Radar probe settings of a platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadarRecord {
    pub probe_response_time_url: String,
    pub probe_availability_url: String,
    pub probe_throughput_url: String,
    /// Decimal integer, kept as text
    #[serde(default = "default_weight")]
    pub weight: String,
}

/// Machine name for a display name: lowercased, spaces become underscores
pub fn derive_alias(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

/// Numeric id for a category label, 0 when the label is not known
pub fn category_id(label: &str) -> i64 {
    CATEGORY_IDS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, id)| *id)
        .unwrap_or(0)
}

pub fn parse_weight(weight: &str) -> Result<i64> {
    weight.parse::<i64>().map_err(|e| {
        Error::Validation(format!(
            "radar weight {weight:?} is not an integer: {e}"
        ))
    })
}

pub fn expand_radar(radar: &RadarRecord) -> Result<RadarOpts> {
    Ok(RadarOpts {
        rtt_secure_url: radar.probe_response_time_url.clone(),
        prime_secure_url: radar.probe_availability_url.clone(),
        xl_secure_url: radar.probe_throughput_url.clone(),
        weight: parse_weight(&radar.weight)?,
    })
}

pub fn flatten_radar(radar: &RadarOpts) -> RadarRecord {
    RadarRecord {
        probe_response_time_url: radar.rtt_secure_url.clone(),
        probe_availability_url: radar.prime_secure_url.clone(),
        probe_throughput_url: radar.xl_secure_url.clone(),
        weight: radar.weight.to_string(),
    }
}

/// Build the API request body for a record
pub fn expand_platform(record: &PlatformRecord) -> Result<PlatformOpts> {
    let radar_opts = record.radar.as_ref().map(expand_radar).transpose()?;

    let alias = if record.alias.is_empty() {
        derive_alias(&record.name)
    } else {
        record.alias.clone()
    };

    Ok(PlatformOpts {
        name: alias,
        display_name: record.name.clone(),
        category: Category {
            id: category_id(&record.category),
            name: record.category.clone(),
        },
        radar_opts,
        description: record.description.clone(),
        enabled: record.enabled,
        openmix_enabled: record.openmix_enabled,
        openmix_visible: true,
        is_private: true,
        public_provider_archetype_id: 0,
    })
}

/// Build a record from the API representation
pub fn flatten_platform(id: &str, platform: &Platform) -> PlatformRecord {
    PlatformRecord {
        id: id.to_string(),
        name: platform.display_name.clone(),
        alias: platform.name.clone(),
        description: platform.description.clone(),
        category: platform.category.name.clone(),
        enabled: true,
        openmix_enabled: platform.openmix_enabled,
        radar: platform.radar_opts.as_ref().map(flatten_radar),
    }
}

/// Whether an update has to be sent for `desired` given the last-known state
pub fn has_changes(prior: &PlatformRecord, desired: &PlatformRecord) -> bool {
    prior.name != desired.name
        || prior.alias != desired.alias
        || prior.description != desired.description
        || prior.category != desired.category
        || prior.radar != desired.radar
}

pub struct PlatformResource;

#[async_trait]
impl Resource for PlatformResource {
    type Record = PlatformRecord;

    fn type_name() -> &'static str {
        "citrixitm_platform"
    }

    fn id_of(record: &PlatformRecord) -> &str {
        &record.id
    }

    async fn create(ctx: &ItmContext, desired: &PlatformRecord) -> Result<PlatformRecord> {
        info!(kind = KIND, "Create start");

        let opts = expand_platform(desired).map_err(|e| {
            debug!(kind = KIND, error = %e, "Error in preparing options");
            e
        })?;
        debug!(kind = KIND, ?opts, "Create options");

        let platform = ctx
            .retry
            .run(KIND, Operation::Create, &desired.name, || {
                ctx.api.create_platform(&opts)
            })
            .await?;

        let id = platform.id.to_string();
        info!(kind = KIND, id = %id, "Create success");

        Self::read_by_id(ctx, &id).await
    }

    async fn read_by_id(ctx: &ItmContext, id: &str) -> Result<PlatformRecord> {
        info!(kind = KIND, id, "Read start");
        let numeric_id = parse_id(id)?;

        let platform = ctx
            .retry
            .run(KIND, Operation::Read, id, || ctx.api.get_platform(numeric_id))
            .await?;

        debug!(kind = KIND, id, ?platform, "Read success");
        Ok(flatten_platform(id, &platform))
    }

    async fn update(
        ctx: &ItmContext,
        prior: &PlatformRecord,
        desired: &PlatformRecord,
    ) -> Result<PlatformRecord> {
        let id = prior.id.as_str();
        info!(kind = KIND, id, "Update start");
        let numeric_id = parse_id(id)?;

        // The alias is identity-adjacent; once known it is never re-derived from a new name.
        let mut desired = desired.clone();
        if desired.alias.is_empty() {
            desired.alias = prior.alias.clone();
        }

        if has_changes(prior, &desired) {
            let opts = expand_platform(&desired)?;
            debug!(kind = KIND, id, ?opts, "Update options");

            let platform = ctx
                .retry
                .run(KIND, Operation::Update, id, || {
                    ctx.api.update_platform(numeric_id, &opts)
                })
                .await?;

            info!(kind = KIND, id, ?platform, "Update success");
        } else {
            debug!(kind = KIND, id, "No change detected");
        }

        Self::read_by_id(ctx, id).await
    }

    async fn delete(ctx: &ItmContext, state: &PlatformRecord) -> Result<()> {
        let id = state.id.as_str();
        info!(kind = KIND, id, "Delete start");
        let numeric_id = parse_id(id)?;

        ctx.retry
            .run(KIND, Operation::Delete, id, || {
                ctx.api.delete_platform(numeric_id)
            })
            .await?;

        info!(kind = KIND, id, "Delete success");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn radar(weight: &str) -> RadarRecord {
        RadarRecord {
            probe_response_time_url: "https://probe.example.com/rtt.js".to_string(),
            probe_availability_url: "https://probe.example.com/r20.gif".to_string(),
            probe_throughput_url: "https://probe.example.com/r20-100KB.png".to_string(),
            weight: weight.to_string(),
        }
    }

    fn record(name: &str, alias: &str) -> PlatformRecord {
        PlatformRecord {
            id: String::new(),
            name: name.to_string(),
            alias: alias.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            enabled: true,
            openmix_enabled: true,
            radar: Some(radar("10")),
        }
    }

    #[test]
    fn test_alias_derived_from_name() {
        let opts = expand_platform(&record("My Platform", "")).unwrap();
        assert_eq!(opts.name, "my_platform");
        assert_eq!(opts.display_name, "My Platform");
    }

    #[test]
    fn test_explicit_alias_kept() {
        let opts = expand_platform(&record("My Platform", "custom")).unwrap();
        assert_eq!(opts.name, "custom");
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(category_id("Delivery Networks"), 3);
        assert_eq!(category_id("Cloud Computing"), 0);
        assert_eq!(category_id(""), 0);

        let mut unknown = record("Edge", "");
        unknown.category = "Something Else".to_string();
        let opts = expand_platform(&unknown).unwrap();
        assert_eq!(
            opts.category,
            Category {
                id: 0,
                name: "Something Else".to_string()
            }
        );
    }

    #[test]
    fn test_radar_expansion_renames_and_parses_weight() {
        let opts = expand_radar(&radar("25")).unwrap();
        assert_eq!(opts.rtt_secure_url, "https://probe.example.com/rtt.js");
        assert_eq!(opts.prime_secure_url, "https://probe.example.com/r20.gif");
        assert_eq!(opts.xl_secure_url, "https://probe.example.com/r20-100KB.png");
        assert_eq!(opts.weight, 25);
    }

    #[test]
    fn test_non_numeric_weight_rejected() {
        assert!(matches!(parse_weight("abc"), Err(Error::Validation(_))));

        let mut bad = record("My Platform", "");
        bad.radar = Some(radar("abc"));
        assert!(matches!(expand_platform(&bad), Err(Error::Validation(_))));
    }

    #[test]
    fn test_fixed_request_flags() {
        let opts = expand_platform(&record("My Platform", "")).unwrap();
        assert!(opts.openmix_visible);
        assert!(opts.is_private);
        assert_eq!(opts.public_provider_archetype_id, 0);
    }

    #[test]
    fn test_flatten_asymmetries() {
        let mut desired = record("My Platform", "");
        desired.enabled = false;
        let opts = expand_platform(&desired).unwrap();

        let platform = Platform {
            id: 77,
            name: opts.name.clone(),
            display_name: opts.display_name.clone(),
            description: opts.description.clone(),
            enabled: opts.enabled,
            openmix_enabled: opts.openmix_enabled,
            category: Category {
                id: 99,
                name: opts.category.name.clone(),
            },
            radar_opts: opts.radar_opts.clone(),
        };
        let flattened = flatten_platform("77", &platform);

        // enabled is reported as true whatever the server says
        assert!(!platform.enabled);
        assert!(flattened.enabled);
        // only the category label comes back, the id is never read
        assert_eq!(flattened.category, DEFAULT_CATEGORY);
        // the derived alias is what the server stores
        assert_eq!(flattened.alias, "my_platform");
        assert_eq!(flattened.radar, desired.radar);
        assert_ne!(flattened, PlatformRecord { id: "77".into(), ..desired });
    }

    #[test]
    fn test_change_detection() {
        let prior = PlatformRecord {
            id: "1".to_string(),
            ..record("My Platform", "my_platform")
        };

        assert!(!has_changes(&prior, &prior.clone()));

        let renamed = PlatformRecord {
            name: "Renamed".to_string(),
            ..prior.clone()
        };
        assert!(has_changes(&prior, &renamed));

        let reweighted = PlatformRecord {
            radar: Some(radar("20")),
            ..prior.clone()
        };
        assert!(has_changes(&prior, &reweighted));

        // openmix_enabled and enabled are not tracked
        let toggled = PlatformRecord {
            openmix_enabled: false,
            enabled: false,
            ..prior.clone()
        };
        assert!(!has_changes(&prior, &toggled));
    }

    #[test]
    fn test_record_defaults() {
        let record: PlatformRecord = serde_json::from_value(json!({
            "name": "Edge CDN",
            "radar": {
                "probe_response_time_url": "a",
                "probe_availability_url": "b",
                "probe_throughput_url": "c"
            }
        }))
        .unwrap();

        assert_eq!(record.alias, "");
        assert_eq!(record.description, DEFAULT_DESCRIPTION);
        assert_eq!(record.category, DEFAULT_CATEGORY);
        assert!(record.enabled);
        assert!(record.openmix_enabled);
        assert_eq!(record.radar.unwrap().weight, "10");
    }

    #[test]
    fn test_radar_block_requires_probe_urls() {
        let result = serde_json::from_value::<PlatformRecord>(json!({
            "name": "Edge CDN",
            "radar": { "probe_response_time_url": "a", "weight": "5" }
        }));
        assert!(result.is_err());
    }
}

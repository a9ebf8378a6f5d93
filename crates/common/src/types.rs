//! Wire types of the Citrix ITM configuration API

use serde::{Deserialize, Serialize};

/// Platform category reference
///
/// Only the name is ever read back from the API, the id is set on writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Radar probe configuration attached to a platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarOpts {
    /// Response time probe
    pub rtt_secure_url: String,
    /// Availability probe
    pub prime_secure_url: String,
    /// Throughput probe
    pub xl_secure_url: String,
    pub weight: i64,
}

/// Request body for platform create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOpts {
    /// Machine name (the record's alias)
    pub name: String,
    pub display_name: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar_opts: Option<RadarOpts>,
    pub description: String,
    pub enabled: bool,
    pub openmix_enabled: bool,
    pub openmix_visible: bool,
    pub is_private: bool,
    pub public_provider_archetype_id: i64,
}

/// Platform as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub openmix_enabled: bool,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub radar_opts: Option<RadarOpts>,
}

/// Openmix application type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppType {
    #[serde(rename = "V1_JS")]
    V1Js,
    #[serde(rename = "V2_PHP")]
    V2Php,
    #[serde(rename = "STATIC_ROUTING")]
    StaticRouting,
    #[serde(rename = "RT_HTTP_PERFORMANCE")]
    RtHttpPerformance,
    #[serde(rename = "RR_PURE_WEIGHTED")]
    RrPureWeighted,
    #[serde(rename = "STATIC_FAILOVER")]
    StaticFailover,
}

impl Default for AppType {
    fn default() -> Self {
        Self::V1Js
    }
}

impl std::fmt::Display for AppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppType::V1Js => write!(f, "V1_JS"),
            AppType::V2Php => write!(f, "V2_PHP"),
            AppType::StaticRouting => write!(f, "STATIC_ROUTING"),
            AppType::RtHttpPerformance => write!(f, "RT_HTTP_PERFORMANCE"),
            AppType::RrPureWeighted => write!(f, "RR_PURE_WEIGHTED"),
            AppType::StaticFailover => write!(f, "STATIC_FAILOVER"),
        }
    }
}

/// Protocol a DNS application answers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppProtocol {
    Http,
    Dns,
}

impl Default for AppProtocol {
    fn default() -> Self {
        Self::Http
    }
}

impl std::fmt::Display for AppProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppProtocol::Http => write!(f, "http"),
            AppProtocol::Dns => write!(f, "dns"),
        }
    }
}

/// Request body for DNS application create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsAppOpts {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub protocol: AppProtocol,
    pub app_data: String,
    pub fallback_cname: String,
    pub fallback_ttl: i64,
    pub platforms: Vec<serde_json::Value>,
    pub avl_threshold: i64,
}

/// DNS application as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsApp {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub app_type: AppType,
    #[serde(default)]
    pub protocol: AppProtocol,
    #[serde(default)]
    pub app_data: String,
    #[serde(default)]
    pub fallback_cname: String,
    #[serde(default)]
    pub fallback_ttl: i64,
    /// Canonical name assigned by the service
    #[serde(default, alias = "appCname")]
    pub cname: String,
    /// Revision counter, bumped on every publish
    #[serde(default)]
    pub version: i64,
}

//! Provider configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use citrixitm_common::Error;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://portal.cedexis.com/api";

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "CITRIXITM_BASE_URL";
/// Environment variable overriding `client_id`
pub const ENV_CLIENT_ID: &str = "CITRIXITM_CLIENT_ID";
/// Environment variable overriding `client_secret`
pub const ENV_CLIENT_SECRET: &str = "CITRIXITM_CLIENT_SECRET";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the ITM API, without trailing slash
    pub base_url: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Timeout for a single HTTP request
    pub timeout_secs: u64,

    /// Publish DNS applications on create and update
    pub publish_dns_apps: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_secs: 30,
            publish_dns_apps: true,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay values from the process environment
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(id) = lookup(ENV_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.client_id = id;
        }
        if let Some(secret) = lookup(ENV_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.client_secret = secret;
        }
    }

    /// Check that the client can be built from this configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".to_string()));
        }
        if self.client_id.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "client_id is required (set it in the config file or {ENV_CLIENT_ID})"
            )));
        }
        if self.client_secret.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "client_secret is required (set it in the config file or {ENV_CLIENT_SECRET})"
            )));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

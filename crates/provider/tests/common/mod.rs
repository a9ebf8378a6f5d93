//! Shared test helpers: an in-memory ITM API that records every call

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use citrixitm_common::{DnsApp, DnsAppOpts, Error, Platform, PlatformOpts, Result};
use citrixitm_provider::{ItmApi, ItmContext};

#[derive(Default)]
struct Inner {
    next_id: i64,
    platforms: HashMap<i64, Platform>,
    dns_apps: HashMap<i64, DnsApp>,
    calls: Vec<String>,
    /// Number of upcoming calls that fail with HTTP 503
    failures_left: u32,
    /// Platforms report this `enabled` value regardless of what was sent
    platform_enabled_override: Option<bool>,
    last_publish: Option<bool>,
}

/// In-memory stand-in for the ITM API
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.inner.lock().unwrap().next_id = 100;
        api
    }

    pub fn context(&self) -> ItmContext {
        ItmContext::new(Arc::new(self.clone()))
    }

    /// Make the next `n` calls fail
    pub fn fail_next(&self, n: u32) {
        self.inner.lock().unwrap().failures_left = n;
    }

    pub fn report_platform_enabled(&self, enabled: bool) {
        self.inner.lock().unwrap().platform_enabled_override = Some(enabled);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn last_publish(&self) -> Option<bool> {
        self.inner.lock().unwrap().last_publish
    }

    pub fn platform(&self, id: i64) -> Option<Platform> {
        self.inner.lock().unwrap().platforms.get(&id).cloned()
    }

    pub fn dns_app(&self, id: i64) -> Option<DnsApp> {
        self.inner.lock().unwrap().dns_apps.get(&id).cloned()
    }

    pub fn insert_dns_app(&self, app: DnsApp) {
        self.inner.lock().unwrap().dns_apps.insert(app.id, app);
    }

    /// Change a stored application behind the provider's back
    pub fn edit_dns_app(&self, id: i64, edit: impl FnOnce(&mut DnsApp)) {
        if let Some(app) = self.inner.lock().unwrap().dns_apps.get_mut(&id) {
            edit(app);
        }
    }

    fn record(&self, call: String) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if inner.failures_left > 0 {
            inner.failures_left -= 1;
            return Err(Error::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn platform_from_opts(id: i64, opts: &PlatformOpts) -> Platform {
    Platform {
        id,
        name: opts.name.clone(),
        display_name: opts.display_name.clone(),
        description: opts.description.clone(),
        enabled: opts.enabled,
        openmix_enabled: opts.openmix_enabled,
        category: opts.category.clone(),
        radar_opts: opts.radar_opts.clone(),
    }
}

fn dns_app_from_opts(id: i64, opts: &DnsAppOpts, version: i64) -> DnsApp {
    DnsApp {
        id,
        name: opts.name.clone(),
        description: opts.description.clone(),
        app_type: opts.app_type,
        protocol: opts.protocol,
        app_data: opts.app_data.clone(),
        fallback_cname: opts.fallback_cname.clone(),
        fallback_ttl: opts.fallback_ttl,
        cname: format!("2-01-{id:04}-000a.cdx.cedexis.net"),
        version,
    }
}

fn not_found(kind: &str, id: i64) -> Error {
    Error::NotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl ItmApi for MockApi {
    async fn create_platform(&self, opts: &PlatformOpts) -> Result<Platform> {
        self.record("create_platform".to_string())?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        let platform = platform_from_opts(id, opts);
        inner.platforms.insert(id, platform.clone());
        Ok(platform)
    }

    async fn get_platform(&self, id: i64) -> Result<Platform> {
        self.record(format!("get_platform {id}"))?;
        let inner = self.inner.lock().unwrap();
        let mut platform = inner
            .platforms
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("platform", id))?;
        if let Some(enabled) = inner.platform_enabled_override {
            platform.enabled = enabled;
        }
        Ok(platform)
    }

    async fn update_platform(&self, id: i64, opts: &PlatformOpts) -> Result<Platform> {
        self.record(format!("update_platform {id}"))?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.platforms.contains_key(&id) {
            return Err(not_found("platform", id));
        }
        let platform = platform_from_opts(id, opts);
        inner.platforms.insert(id, platform.clone());
        Ok(platform)
    }

    async fn delete_platform(&self, id: i64) -> Result<()> {
        self.record(format!("delete_platform {id}"))?;
        let mut inner = self.inner.lock().unwrap();
        inner
            .platforms
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("platform", id))
    }

    async fn create_dns_app(&self, opts: &DnsAppOpts, publish: bool) -> Result<DnsApp> {
        self.record("create_dns_app".to_string())?;
        let mut inner = self.inner.lock().unwrap();
        inner.last_publish = Some(publish);
        inner.next_id += 1;
        let id = inner.next_id;
        let app = dns_app_from_opts(id, opts, 1);
        inner.dns_apps.insert(id, app.clone());
        Ok(app)
    }

    async fn get_dns_app(&self, id: i64) -> Result<DnsApp> {
        self.record(format!("get_dns_app {id}"))?;
        let inner = self.inner.lock().unwrap();
        inner
            .dns_apps
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("dns_app", id))
    }

    async fn update_dns_app(&self, id: i64, opts: &DnsAppOpts, publish: bool) -> Result<DnsApp> {
        self.record(format!("update_dns_app {id}"))?;
        let mut inner = self.inner.lock().unwrap();
        inner.last_publish = Some(publish);
        let version = inner
            .dns_apps
            .get(&id)
            .map(|app| app.version + 1)
            .ok_or_else(|| not_found("dns_app", id))?;
        let app = dns_app_from_opts(id, opts, version);
        inner.dns_apps.insert(id, app.clone());
        Ok(app)
    }

    async fn delete_dns_app(&self, id: i64) -> Result<()> {
        self.record(format!("delete_dns_app {id}"))?;
        let mut inner = self.inner.lock().unwrap();
        inner
            .dns_apps
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("dns_app", id))
    }
}

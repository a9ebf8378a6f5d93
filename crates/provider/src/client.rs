//! Client for the Citrix ITM configuration API

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use citrixitm_common::{DnsApp, DnsAppOpts, Error, Platform, PlatformOpts, Result};

use crate::config::ProviderConfig;

const PLATFORMS_PATH: &str = "v2/config/platforms.json";
const DNS_APPS_PATH: &str = "v2/config/applications/dns.json";
const TOKEN_PATH: &str = "oauth/token";

/// Remote operations used by the resource handlers
#[async_trait]
pub trait ItmApi: Send + Sync {
    async fn create_platform(&self, opts: &PlatformOpts) -> Result<Platform>;

    async fn get_platform(&self, id: i64) -> Result<Platform>;

    async fn update_platform(&self, id: i64, opts: &PlatformOpts) -> Result<Platform>;

    async fn delete_platform(&self, id: i64) -> Result<()>;

    /// Create a DNS application, publishing it immediately when `publish` is set
    async fn create_dns_app(&self, opts: &DnsAppOpts, publish: bool) -> Result<DnsApp>;

    async fn get_dns_app(&self, id: i64) -> Result<DnsApp>;

    async fn update_dns_app(&self, id: i64, opts: &DnsAppOpts, publish: bool) -> Result<DnsApp>;

    async fn delete_dns_app(&self, id: i64) -> Result<()>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP implementation of [`ItmApi`]
pub struct ItmClient {
    http: reqwest::Client,
    api_root: String,
    client_id: String,
    client_secret: String,
    token: OnceCell<String>,
}

impl ItmClient {
    /// Build a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_root: config.api_root().to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path)
    }

    /// Access token, fetched on first use and kept for the client's lifetime
    async fn access_token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let url = self.url(TOKEN_PATH);
                debug!("POST {url}");

                let response = self
                    .http
                    .post(&url)
                    .form(&TokenRequest {
                        grant_type: "client_credentials",
                        client_id: &self.client_id,
                        client_secret: &self.client_secret,
                    })
                    .send()
                    .await
                    .map_err(|e| Error::Network(e.to_string()))?;

                let status = response.status();
                let body = response
                    .text()
                    .await
                    .map_err(|e| Error::Network(format!("Failed to read token response: {e}")))?;

                if !status.is_success() {
                    error!(status = status.as_u16(), "Token request rejected");
                    return Err(Error::Auth(format!("HTTP {status}: {body}")));
                }

                serde_json::from_str::<TokenResponse>(&body)
                    .map(|t| t.access_token)
                    .map_err(|e| Error::Auth(format!("Malformed token response: {e}")))
            })
            .await?;

        Ok(token.as_str())
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.access_token().await?;
        let url = self.url(path);
        debug!("{method} {url}");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Send a request and return the raw body of a successful response
    async fn execute(&self, request: RequestBuilder, kind: &str, id: Option<i64>) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Response status");

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                kind: kind.to_string(),
                id: id.map(|i| i.to_string()).unwrap_or_default(),
            });
        }

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        kind: &str,
        id: Option<i64>,
    ) -> Result<T> {
        let body = self.execute(request, kind, id).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(kind, "JSON parse failed: {e}");
            Error::Decode(e.to_string())
        })
    }
}

fn publish_query(publish: bool) -> Vec<(&'static str, &'static str)> {
    if publish {
        vec![("publish", "true")]
    } else {
        vec![]
    }
}

#[async_trait]
impl ItmApi for ItmClient {
    async fn create_platform(&self, opts: &PlatformOpts) -> Result<Platform> {
        let request = self.request(Method::POST, PLATFORMS_PATH).await?.json(opts);
        self.execute_json(request, "platform", None).await
    }

    async fn get_platform(&self, id: i64) -> Result<Platform> {
        let path = format!("{PLATFORMS_PATH}/{id}");
        let request = self.request(Method::GET, &path).await?;
        self.execute_json(request, "platform", Some(id)).await
    }

    async fn update_platform(&self, id: i64, opts: &PlatformOpts) -> Result<Platform> {
        let path = format!("{PLATFORMS_PATH}/{id}");
        let request = self.request(Method::PUT, &path).await?.json(opts);
        self.execute_json(request, "platform", Some(id)).await
    }

    async fn delete_platform(&self, id: i64) -> Result<()> {
        let path = format!("{PLATFORMS_PATH}/{id}");
        let request = self.request(Method::DELETE, &path).await?;
        self.execute(request, "platform", Some(id)).await?;
        Ok(())
    }

    async fn create_dns_app(&self, opts: &DnsAppOpts, publish: bool) -> Result<DnsApp> {
        let request = self
            .request(Method::POST, DNS_APPS_PATH)
            .await?
            .query(&publish_query(publish))
            .json(opts);
        self.execute_json(request, "dns_app", None).await
    }

    async fn get_dns_app(&self, id: i64) -> Result<DnsApp> {
        let path = format!("{DNS_APPS_PATH}/{id}");
        let request = self.request(Method::GET, &path).await?;
        self.execute_json(request, "dns_app", Some(id)).await
    }

    async fn update_dns_app(&self, id: i64, opts: &DnsAppOpts, publish: bool) -> Result<DnsApp> {
        let path = format!("{DNS_APPS_PATH}/{id}");
        let request = self
            .request(Method::PUT, &path)
            .await?
            .query(&publish_query(publish))
            .json(opts);
        self.execute_json(request, "dns_app", Some(id)).await
    }

    async fn delete_dns_app(&self, id: i64) -> Result<()> {
        let path = format!("{DNS_APPS_PATH}/{id}");
        let request = self.request(Method::DELETE, &path).await?;
        self.execute(request, "dns_app", Some(id)).await?;
        Ok(())
    }
}

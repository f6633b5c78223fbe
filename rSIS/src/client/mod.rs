//! HTTP client and configuration.

mod auth;
mod http;

pub use auth::AuthInfo;
pub use http::{ensure_success, Device, HttpConfig, DEFAULT_BASE_URL};

use crate::api::NotificationApi;
use crate::cache::CacheStorage;
use crate::error::{Error, Result};
use http::{build_client, HttpExecutor};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating SISClient.
pub struct SISClientBuilder {
    auth: Option<AuthInfo>,
    http_config: HttpConfig,
    cache: Option<Arc<dyn CacheStorage>>,
}

impl std::fmt::Debug for SISClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SISClientBuilder")
            .field("auth", &self.auth.as_ref().map(|a| &a.user_id))
            .field("http_config", &self.http_config)
            .field("cache", &self.cache.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for SISClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SISClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            auth: None,
            http_config: HttpConfig::default(),
            cache: None,
        }
    }

    /// Set authentication.
    pub fn auth(mut self, auth_code: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.auth = Some(AuthInfo::new(auth_code, user_id));
        self
    }

    /// Set authentication from AuthInfo.
    pub fn with_auth(mut self, auth: AuthInfo) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.http_config.base_url = url.into();
        self
    }

    /// Set device type.
    pub fn device(mut self, device: Device) -> Self {
        self.http_config.device = device;
        self
    }

    /// Set custom user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.http_config.custom_user_agent = Some(ua.into());
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = timeout;
        self
    }

    /// Set read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.read_timeout = timeout;
        self
    }

    /// Set cache storage for the local fallback snapshot.
    pub fn cache(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.cache = Some(storage);
        self
    }

    /// Build SISClient.
    pub fn build(self) -> Result<SISClient> {
        let http_client = build_client(&self.http_config)?;

        Ok(SISClient {
            inner: Arc::new(SISClientInner {
                http: http_client,
                config: self.http_config,
                auth: self.auth,
                cache: self.cache,
            }),
        })
    }
}

/// Internal client state.
pub(crate) struct SISClientInner {
    pub http: reqwest::Client,
    pub config: HttpConfig,
    pub auth: Option<AuthInfo>,
    /// Cache storage for the offline notification snapshot
    pub cache: Option<Arc<dyn CacheStorage>>,
}

impl SISClientInner {
    /// Get auth info or error.
    pub fn require_auth(&self) -> Result<&AuthInfo> {
        self.auth.as_ref().ok_or(Error::AuthRequired)
    }

    /// Create HTTP executor.
    pub fn executor(&self) -> HttpExecutor<'_> {
        HttpExecutor::new(&self.http, &self.config)
    }

    /// Execute an authenticated GET request.
    pub async fn get_authed(
        &self,
        api: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let auth = self.require_auth()?;
        let value = self
            .executor()
            .get_json(api, query, Some(&auth.auth_code))
            .await?;
        ensure_success(&value)?;
        Ok(value)
    }

    /// Execute an authenticated POST request with a JSON body.
    pub async fn post_authed(
        &self,
        api: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let auth = self.require_auth()?;
        let value = self
            .executor()
            .post_json(api, query, body, Some(&auth.auth_code))
            .await?;
        ensure_success(&value)?;
        Ok(value)
    }
}

/// SIS client for interacting with the school backend.
#[derive(Clone)]
pub struct SISClient {
    pub(crate) inner: Arc<SISClientInner>,
}

impl SISClient {
    /// Create a new client builder.
    pub fn builder() -> SISClientBuilder {
        SISClientBuilder::new()
    }

    /// Get the notification API.
    pub fn notifications(&self) -> NotificationApi {
        NotificationApi::new(self.inner.clone())
    }

    /// Check if the client is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.inner.auth.is_some()
    }

    /// Get the current authentication info.
    pub fn auth_info(&self) -> Option<&AuthInfo> {
        self.inner.auth.as_ref()
    }

    /// Get the current user ID if authenticated.
    pub fn current_user_id(&self) -> Option<&str> {
        self.inner.auth.as_ref().map(|a| a.user_id.as_str())
    }

    /// Get the configured cache storage, if any.
    pub fn cache(&self) -> Option<Arc<dyn CacheStorage>> {
        self.inner.cache.clone()
    }
}

impl std::fmt::Debug for SISClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SISClient")
            .field("authenticated", &self.is_authenticated())
            .field("base_url", &self.inner.config.base_url)
            .finish()
    }
}

//! HTTP client configuration and request execution.

use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

/// Default SIS API base URL. Real deployments are per-school and set their
/// own via the builder.
pub const DEFAULT_BASE_URL: &str = "https://sis.example.edu/api/mobile/";

/// User agents for different platforms.
pub mod user_agents {
    pub const IOS: &str = "SISMobile/4.2.0 (iPhone; iOS 18.0)";
    pub const ANDROID: &str = "SISMobile/4.2.0 (Android 14)";
    pub const WEB: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
}

/// Device type for requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Device {
    #[default]
    Ios,
    Android,
    Web,
}

impl Device {
    /// Get the user agent string for this device.
    pub fn user_agent(&self) -> &'static str {
        match self {
            Device::Ios => user_agents::IOS,
            Device::Android => user_agents::ANDROID,
            Device::Web => user_agents::WEB,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL for API requests.
    pub base_url: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Device type for User-Agent.
    pub device: Device,
    /// Custom user agent.
    pub custom_user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(20),
            device: Device::default(),
            custom_user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Get the user agent to use.
    pub fn user_agent(&self) -> &str {
        self.custom_user_agent
            .as_deref()
            .unwrap_or_else(|| self.device.user_agent())
    }

    /// Resolve a relative API path to a full URL.
    pub fn resolve_url(&self, api: &str) -> Result<Url> {
        if api.starts_with("http://") || api.starts_with("https://") {
            return Url::parse(api).map_err(Error::Url);
        }

        Url::parse(&self.base_url)
            .and_then(|b| b.join(api))
            .map_err(Error::Url)
    }
}

/// Build a reqwest client with the given configuration.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .gzip(true)
        .build()
        .map_err(Error::Network)
}

/// HTTP request executor.
pub struct HttpExecutor<'a> {
    client: &'a Client,
    config: &'a HttpConfig,
}

impl<'a> HttpExecutor<'a> {
    /// Create a new executor.
    pub fn new(client: &'a Client, config: &'a HttpConfig) -> Self {
        Self { client, config }
    }

    /// Build a request with common headers.
    fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        let ua = self.config.user_agent();

        self.client
            .request(method, url)
            .header("User-Agent", ua)
            .header("Accept", "application/json")
    }

    /// Execute a GET request and parse the JSON response.
    pub async fn get_json(
        &self,
        api: &str,
        query: &[(&str, &str)],
        auth_code: Option<&str>,
    ) -> Result<serde_json::Value> {
        let url = self.config.resolve_url(api)?;
        let full_query = with_auth(query, auth_code);

        let request = self.build_request(Method::GET, url).query(&full_query);

        let response = request.send().await.map_err(Error::Network)?;
        handle_response(response).await
    }

    /// Execute a POST request with a JSON body and parse the JSON response.
    pub async fn post_json(
        &self,
        api: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
        auth_code: Option<&str>,
    ) -> Result<serde_json::Value> {
        let url = self.config.resolve_url(api)?;
        let full_query = with_auth(query, auth_code);

        let request = self
            .build_request(Method::POST, url)
            .query(&full_query)
            .json(body);

        let response = request.send().await.map_err(Error::Network)?;
        handle_response(response).await
    }
}

/// Append the auth code and strip empty query values.
fn with_auth<'q>(query: &[(&'q str, &'q str)], auth_code: Option<&'q str>) -> Vec<(&'q str, &'q str)> {
    let mut full: Vec<(&str, &str)> = query
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .copied()
        .collect();
    if let Some(code) = auth_code {
        full.push(("authCode", code));
    }
    full
}

/// Handle a response: surface HTTP errors, then parse the body as JSON.
async fn handle_response(response: Response) -> Result<serde_json::Value> {
    let status = response.status();

    let bytes = response.bytes().await.map_err(Error::Network)?;

    if !status.is_success() {
        let message = String::from_utf8_lossy(&bytes);
        return Err(Error::api(
            status.as_u16().to_string(),
            if message.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error")
            } else {
                message.trim()
            },
        ));
    }

    serde_json::from_slice(&bytes).map_err(Error::Json)
}

/// Check the server's `success` envelope flag, surfacing its error message.
pub fn ensure_success(value: &serde_json::Value) -> Result<()> {
    match value.get("success").and_then(|v| v.as_bool()) {
        Some(false) => {
            let message = value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|v| v.as_str())
                .unwrap_or("request failed");
            let code = value
                .get("code")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "0".to_owned());
            Err(Error::api(code.trim_matches('"'), message))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_url() {
        let config = HttpConfig::default();

        let url = config.resolve_url("notifications").unwrap();
        assert!(url.as_str().starts_with(DEFAULT_BASE_URL));
        assert!(url.as_str().ends_with("notifications"));
    }

    #[test]
    fn test_resolve_absolute_url() {
        let config = HttpConfig::default();
        let url = config.resolve_url("https://other.example.com/x").unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x");
    }

    #[test]
    fn test_with_auth_drops_empty() {
        let q = with_auth(&[("page", "1"), ("category", "")], Some("code"));
        assert_eq!(q, vec![("page", "1"), ("authCode", "code")]);
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success(&json!({ "success": true })).is_ok());
        assert!(ensure_success(&json!({ "notifications": [] })).is_ok());

        let err = ensure_success(&json!({ "success": false, "message": "denied", "code": 403 }))
            .unwrap_err();
        assert_eq!(format!("{}", err), "SIS API error [403]: denied");
    }
}

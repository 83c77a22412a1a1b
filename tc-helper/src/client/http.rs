//! HTTP client configuration and the transport seam.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use url::Url;

/// Default user directory base URL.
pub const DEFAULT_USERS_BASE_URL: &str = "https://api.topcoder-dev.com/v3";

/// Default message service base URL.
pub const DEFAULT_MESSAGES_BASE_URL: &str = "https://api.topcoder-dev.com/v5";

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("tc-helper/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Custom user agent.
    pub custom_user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(20),
            custom_user_agent: None,
        }
    }
}

impl HttpConfig {
    /// User agent sent with every request.
    pub fn user_agent(&self) -> &str {
        self.custom_user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Base URLs of the remote services.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// User directory API (`TC_API_V3_BASE_URL`).
    pub users_base_url: String,
    /// Message API (`MESSAGE_API_BASE_URL`).
    pub messages_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            users_base_url: DEFAULT_USERS_BASE_URL.to_owned(),
            messages_base_url: DEFAULT_MESSAGES_BASE_URL.to_owned(),
        }
    }
}

impl ApiConfig {
    /// Read base URLs from `TC_API_V3_BASE_URL` and `MESSAGE_API_BASE_URL`,
    /// falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            users_base_url: lookup("TC_API_V3_BASE_URL").unwrap_or(defaults.users_base_url),
            messages_base_url: lookup("MESSAGE_API_BASE_URL")
                .unwrap_or(defaults.messages_base_url),
        }
    }

    /// `<users_base>/users?fields=...&filter=<filter>`.
    pub fn users_url(&self, fields: &str, filter: &str) -> Result<Url> {
        let mut url = endpoint(&self.users_base_url, &["users"])?;
        url.query_pairs_mut()
            .append_pair("fields", fields)
            .append_pair("filter", filter);
        Ok(url)
    }

    /// `<messages_base>/topics/<topic_id>/read`.
    pub fn topic_read_url(&self, topic_id: &str) -> Result<Url> {
        endpoint(&self.messages_base_url, &["topics", topic_id, "read"])
    }
}

/// Append path segments to a base URL, keeping any path the base already has.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("Base URL cannot carry a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A response as seen by the transport: status and body text.
///
/// Non-2xx responses are returned, not raised; the caller decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP, behind a trait so lookups can run against a test double.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Send a GET request with the given headers.
    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<RawResponse>;

    /// Send a POST request with a JSON body.
    async fn post_json(&self, url: &Url, body: &serde_json::Value) -> Result<RawResponse>;
}

/// Build a reqwest client with the given configuration.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .user_agent(config.user_agent())
        .gzip(true)
        .build()
        .map_err(Error::Network)
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport from configuration.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(request: RequestBuilder) -> Result<RawResponse> {
        let response = request.send().await.map_err(Error::Network)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::Network)?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<RawResponse> {
        let mut request = self.client.get(url.clone());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Self::execute(request).await
    }

    async fn post_json(&self, url: &Url, body: &serde_json::Value) -> Result<RawResponse> {
        let request = self
            .client
            .post(url.clone())
            .header("Accept", "application/json")
            .json(body);
        Self::execute(request).await
    }
}

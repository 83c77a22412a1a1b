//! Machine-to-machine credentials and token providers.

use async_trait::async_trait;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use url::Url;

use super::http::HttpTransport;
use crate::error::{Error, Result};

/// Client credentials presented to the token provider.
#[derive(Clone, Default)]
pub struct ClientCredentials {
    /// Client ID (`AUTH0_CLIENT_ID`).
    pub client_id: String,
    /// Client secret (`AUTH0_CLIENT_SECRET`).
    pub client_secret: String,
}

impl ClientCredentials {
    /// Create new credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Source of bearer tokens.
///
/// Called once per lookup; implementations may fail, and the failure is
/// reported to the caller as a token failure.
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// Obtain a token for the given credentials.
    async fn token(&self, credentials: &ClientCredentials) -> Result<String>;
}

/// Provider that always hands out the same pre-issued token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider for a fixed token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _credentials: &ClientCredentials) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Settings for the Auth0 client-credentials grant.
#[derive(Debug, Clone)]
pub struct M2mConfig {
    /// Token endpoint (`AUTH0_URL`).
    pub auth_url: String,
    /// Audience (`AUTH0_AUDIENCE`).
    pub audience: String,
    /// Optional proxy that issues tokens on Auth0's behalf
    /// (`AUTH0_PROXY_SERVER_URL`).
    pub proxy_url: Option<String>,
    /// Credentials (`AUTH0_CLIENT_ID`, `AUTH0_CLIENT_SECRET`).
    pub credentials: ClientCredentials,
}

impl M2mConfig {
    /// Read settings from the `AUTH0_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::config(format!("{} is not set", key)))
        };

        Ok(Self {
            auth_url: required("AUTH0_URL")?,
            audience: required("AUTH0_AUDIENCE")?,
            proxy_url: lookup("AUTH0_PROXY_SERVER_URL").filter(|v| !v.is_empty()),
            credentials: ClientCredentials::new(
                required("AUTH0_CLIENT_ID")?,
                required("AUTH0_CLIENT_SECRET")?,
            ),
        })
    }

    /// Where the grant request is sent.
    pub fn token_endpoint(&self) -> &str {
        self.proxy_url.as_deref().unwrap_or(&self.auth_url)
    }
}

/// Obtains tokens through the client-credentials grant. Every call performs
/// a fresh grant.
#[derive(Debug, Clone)]
pub struct M2mTokenProvider {
    config: M2mConfig,
    transport: Arc<dyn HttpTransport>,
}

impl M2mTokenProvider {
    /// Create a provider sending grants through `transport`.
    pub fn new(config: &M2mConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: config.clone(),
            transport,
        }
    }
}

#[async_trait]
impl TokenProvider for M2mTokenProvider {
    async fn token(&self, credentials: &ClientCredentials) -> Result<String> {
        let url = Url::parse(self.config.token_endpoint())?;
        let body = json!({
            "grant_type": "client_credentials",
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret,
            "audience": self.config.audience,
            "auth0_url": self.config.auth_url,
        });

        log::debug!("requesting m2m token from {}", url);
        let response = self.transport.post_json(&url, &body).await?;

        let value: serde_json::Value =
            serde_json::from_str(&response.body).unwrap_or(serde_json::Value::Null);

        if !response.is_success() {
            let reason = value
                .get("error_description")
                .or_else(|| value.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("no details");
            return Err(Error::token(format!(
                "token endpoint answered {}: {}",
                response.status, reason
            )));
        }

        value
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| Error::token("response carries no access_token"))
    }
}

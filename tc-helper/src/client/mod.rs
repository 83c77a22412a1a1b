//! HTTP client, credentials and configuration.

mod auth;
mod diagnostics;
mod http;

pub use auth::{ClientCredentials, M2mConfig, M2mTokenProvider, StaticTokenProvider, TokenProvider};
pub use diagnostics::{DiagnosticLogger, LogDiagnostics};
pub use http::{
    ApiConfig, HttpConfig, HttpTransport, RawResponse, ReqwestTransport,
    DEFAULT_MESSAGES_BASE_URL, DEFAULT_USERS_BASE_URL,
};

use crate::api::{TopicApi, UserApi};
use crate::error::{Error, Result};
use crate::models::Envelope;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builder for creating HelperClient.
pub struct HelperClientBuilder {
    api_config: ApiConfig,
    http_config: HttpConfig,
    credentials: Option<ClientCredentials>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    m2m: Option<M2mConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl std::fmt::Debug for HelperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperClientBuilder")
            .field("api_config", &self.api_config)
            .field("http_config", &self.http_config)
            .field("credentials", &self.credentials)
            .field("token_provider", &self.token_provider)
            .field("m2m", &self.m2m)
            .field("transport", &self.transport.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for HelperClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HelperClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            api_config: ApiConfig::default(),
            http_config: HttpConfig::default(),
            credentials: None,
            token_provider: None,
            m2m: None,
            transport: None,
        }
    }

    /// Set both service base URLs.
    pub fn api_config(mut self, config: ApiConfig) -> Self {
        self.api_config = config;
        self
    }

    /// Set the user directory base URL.
    pub fn users_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_config.users_base_url = url.into();
        self
    }

    /// Set the message service base URL.
    pub fn messages_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_config.messages_base_url = url.into();
        self
    }

    /// Set the credentials handed to the token provider. Takes precedence
    /// over the credentials of an [`M2mConfig`].
    pub fn credentials(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(ClientCredentials::new(id, secret));
        self
    }

    /// Use a custom token provider.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Use the built-in client-credentials provider. `config.credentials`
    /// are used unless [`credentials`](Self::credentials) is also called.
    pub fn m2m(mut self, config: M2mConfig) -> Self {
        self.m2m = Some(config);
        self
    }

    /// Use a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
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

    /// Build HelperClient.
    pub fn build(self) -> Result<HelperClient> {
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(&self.http_config)?),
        };

        let credentials = match (self.credentials, &self.m2m) {
            (Some(explicit), _) => explicit,
            (None, Some(m2m)) => m2m.credentials.clone(),
            (None, None) => ClientCredentials::default(),
        };

        let token_provider: Arc<dyn TokenProvider> = match (self.token_provider, self.m2m) {
            (Some(provider), _) => provider,
            (None, Some(m2m)) => Arc::new(M2mTokenProvider::new(&m2m, transport.clone())),
            (None, None) => return Err(Error::config("no token provider configured")),
        };

        Ok(HelperClient {
            inner: Arc::new(HelperClientInner {
                api: self.api_config,
                credentials,
                tokens: token_provider,
                transport,
            }),
        })
    }
}

/// Internal client state.
pub(crate) struct HelperClientInner {
    pub api: ApiConfig,
    pub credentials: ClientCredentials,
    pub tokens: Arc<dyn TokenProvider>,
    pub transport: Arc<dyn HttpTransport>,
}

impl HelperClientInner {
    /// Obtain a fresh token, GET `url` with it and return `result.content`.
    ///
    /// Any failure after the token is obtained becomes a lookup failure
    /// whose message starts with `context`. Token failures skip the request
    /// and the logger.
    pub async fn get_authed(
        &self,
        url: Url,
        context: &str,
        logger: Option<&dyn DiagnosticLogger>,
    ) -> Result<Value> {
        let token = self
            .tokens
            .token(&self.credentials)
            .await
            .map_err(Error::token)?;

        match self.fetch(&url, &token, context).await {
            Ok(content) => Ok(content),
            Err(err) => {
                log::warn!("{}", err);
                if let Some(logger) = logger {
                    logger.error(&err, &format!("Error while calling {}", url));
                }
                Err(err)
            }
        }
    }

    async fn fetch(&self, url: &Url, token: &str, context: &str) -> Result<Value> {
        let bearer = format!("Bearer {}", token);
        let headers = [("Accept", "application/json"), ("Authorization", bearer.as_str())];

        log::debug!("GET {}", url);
        let response = match self.transport.get(url, &headers).await {
            Ok(response) => response,
            Err(cause) => return Err(Error::lookup(context, None, None).with_source(cause)),
        };

        let envelope = Envelope::parse(&response.body);
        let server_message = envelope.as_ref().and_then(Envelope::server_message);

        match envelope {
            Some(envelope) if response.is_success() && envelope.is_success() => {
                Ok(envelope.into_content())
            }
            _ => Err(Error::lookup(context, Some(response.status), server_message)),
        }
    }
}

/// Client for the user directory and message services.
#[derive(Clone)]
pub struct HelperClient {
    pub(crate) inner: Arc<HelperClientInner>,
}

impl HelperClient {
    /// Create a new client builder.
    pub fn builder() -> HelperClientBuilder {
        HelperClientBuilder::new()
    }

    /// Build a client from `TC_API_V3_BASE_URL`, `MESSAGE_API_BASE_URL`
    /// and the `AUTH0_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::builder()
            .api_config(ApiConfig::from_env())
            .m2m(M2mConfig::from_env()?)
            .build()
    }

    /// Get the user API.
    pub fn users(&self) -> UserApi {
        UserApi::new(self.inner.clone())
    }

    /// Get the topic API.
    pub fn topics(&self) -> TopicApi {
        TopicApi::new(self.inner.clone())
    }

    /// Authenticated GET against any endpoint answering with the standard
    /// envelope.
    pub async fn get_content(
        &self,
        url: Url,
        context: &str,
        logger: Option<&dyn DiagnosticLogger>,
    ) -> Result<Value> {
        self.inner.get_authed(url, context, logger).await
    }

    /// Service base URLs in use.
    pub fn api_config(&self) -> &ApiConfig {
        &self.inner.api
    }
}

impl std::fmt::Debug for HelperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperClient")
            .field("users_base_url", &self.inner.api.users_base_url)
            .field("messages_base_url", &self.inner.api.messages_base_url)
            .finish()
    }
}

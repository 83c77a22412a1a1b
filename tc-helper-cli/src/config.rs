//! Configuration management for the CLI.
//!
//! Settings come from `tc-helper.toml` next to the executable (or the path
//! given with `--config`); the service environment variables override it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tc_helper::{ApiConfig, ClientCredentials, HelperClient, M2mConfig};

/// CLI configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service base URLs.
    #[serde(default)]
    pub api: ApiSection,
    /// Client-credentials settings.
    #[serde(default)]
    pub auth0: Auth0Section,
}

/// Service base URLs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub users_base_url: Option<String>,
    pub messages_base_url: Option<String>,
}

/// Client-credentials settings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Auth0Section {
    pub url: Option<String>,
    pub audience: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub proxy_server_url: Option<String>,
}

/// Get the default configuration file path.
pub fn config_path() -> Result<PathBuf> {
    let exe_path = env::current_exe().context("Could not determine executable path")?;
    let exe_dir = exe_path
        .parent()
        .context("Could not determine executable directory")?;

    Ok(exe_dir.join("tc-helper.toml"))
}

/// Load configuration from file; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).context("Failed to read config file")?;

    toml::from_str(&content).context("Failed to parse config file")
}

impl Config {
    /// Apply environment overrides.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        };

        set(&mut self.api.users_base_url, "TC_API_V3_BASE_URL");
        set(&mut self.api.messages_base_url, "MESSAGE_API_BASE_URL");
        set(&mut self.auth0.url, "AUTH0_URL");
        set(&mut self.auth0.audience, "AUTH0_AUDIENCE");
        set(&mut self.auth0.client_id, "AUTH0_CLIENT_ID");
        set(&mut self.auth0.client_secret, "AUTH0_CLIENT_SECRET");
        set(&mut self.auth0.proxy_server_url, "AUTH0_PROXY_SERVER_URL");
        self
    }

    /// Resolved service base URLs.
    pub fn api_config(&self) -> ApiConfig {
        let defaults = ApiConfig::default();
        ApiConfig {
            users_base_url: self
                .api
                .users_base_url
                .clone()
                .unwrap_or(defaults.users_base_url),
            messages_base_url: self
                .api
                .messages_base_url
                .clone()
                .unwrap_or(defaults.messages_base_url),
        }
    }

    /// Resolved client-credentials settings.
    pub fn m2m_config(&self) -> Result<M2mConfig> {
        let auth = &self.auth0;
        Ok(M2mConfig {
            auth_url: auth.url.clone().context("AUTH0_URL is not configured")?,
            audience: auth
                .audience
                .clone()
                .context("AUTH0_AUDIENCE is not configured")?,
            proxy_url: auth.proxy_server_url.clone(),
            credentials: ClientCredentials::new(
                auth.client_id
                    .clone()
                    .context("AUTH0_CLIENT_ID is not configured")?,
                auth.client_secret
                    .clone()
                    .context("AUTH0_CLIENT_SECRET is not configured")?,
            ),
        })
    }

    /// Copy with the client secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.auth0.client_secret.is_some() {
            copy.auth0.client_secret = Some("***".to_owned());
        }
        copy
    }
}

/// Build a client from the configuration.
pub fn build_client(config: &Config) -> Result<HelperClient> {
    HelperClient::builder()
        .api_config(config.api_config())
        .m2m(config.m2m_config()?)
        .build()
        .context("Failed to build client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[api]
users_base_url = "https://api.example.com/v3"

[auth0]
url = "https://auth.example.com/oauth/token"
audience = "https://m2m.example.com/"
client_id = "file-id"
client_secret = "file-secret"
"#;

    #[test]
    fn test_parse_and_resolve() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let api = config.api_config();
        assert_eq!(api.users_base_url, "https://api.example.com/v3");
        assert_eq!(api.messages_base_url, ApiConfig::default().messages_base_url);

        let m2m = config.m2m_config().unwrap();
        assert_eq!(m2m.credentials.client_id, "file-id");
        assert_eq!(m2m.proxy_url, None);
    }

    #[test]
    fn test_env_overrides_file() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let config = config.with_overrides(|key| match key {
            "AUTH0_CLIENT_ID" => Some("env-id".to_owned()),
            _ => None,
        });
        assert_eq!(config.auth0.client_id.as_deref(), Some("env-id"));
        assert_eq!(config.auth0.client_secret.as_deref(), Some("file-secret"));
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::default().m2m_config().unwrap_err();
        assert!(err.to_string().contains("AUTH0_URL"));
    }

    #[test]
    fn test_redacted() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let shown = toml::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("file-secret"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = load_config(Path::new("/nonexistent/tc-helper.toml")).unwrap();
        assert!(config.api.users_base_url.is_none());
    }
}

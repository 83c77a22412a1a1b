//! Error types.

use thiserror::Error;

/// Prefix carried by every token acquisition failure.
pub const TOKEN_FAILURE_PREFIX: &str = "Error generating m2m token: ";

/// Fieldless category of an [`Error`], for callers that branch on the
/// kind of failure rather than on its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The token provider failed.
    Token,
    /// A remote lookup completed but signaled failure.
    Lookup,
    /// Transport-level failure outside of a lookup.
    Transport,
    /// Malformed data outside of a lookup.
    Parse,
    /// Missing or invalid configuration.
    Config,
}

/// The main error type for tc-helper operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Obtaining a machine token failed. No request was sent.
    #[error("Error generating m2m token: {message}")]
    TokenFailure { message: String },

    /// The remote call failed, answered non-2xx or returned an envelope
    /// without `result.success == true`.
    #[error("{message}")]
    LookupFailure {
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Diagnostic text found at `result.content.message`.
        server_message: Option<String>,
        /// Underlying transport failure, if any.
        source: Option<Box<Error>>,
    },

    /// Network-related error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any failure raised while obtaining a token.
    ///
    /// Re-wrapping an existing token failure keeps a single prefix.
    pub fn token(cause: impl std::fmt::Display) -> Self {
        let message = cause.to_string();
        let message = message
            .strip_prefix(TOKEN_FAILURE_PREFIX)
            .map(str::to_owned)
            .unwrap_or(message);
        Error::TokenFailure { message }
    }

    /// Create a lookup failure.
    ///
    /// `context` names the operation and its input; the server message, if
    /// any, is appended as ` Server response: <msg>`.
    pub fn lookup(
        context: impl std::fmt::Display,
        status: Option<u16>,
        server_message: Option<String>,
    ) -> Self {
        let mut message = format!("{}.", context);
        if let Some(ref details) = server_message {
            message.push_str(" Server response: ");
            message.push_str(details);
        }
        Error::LookupFailure {
            message,
            status,
            server_message,
            source: None,
        }
    }

    /// Attach the underlying cause to a lookup failure.
    pub fn with_source(self, cause: Error) -> Self {
        match self {
            Error::LookupFailure {
                message,
                status,
                server_message,
                ..
            } => Error::LookupFailure {
                message,
                status,
                server_message,
                source: Some(Box::new(cause)),
            },
            other => other,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TokenFailure { .. } => ErrorKind::Token,
            Error::LookupFailure { .. } => ErrorKind::Lookup,
            Error::Network(_) | Error::Url(_) => ErrorKind::Transport,
            Error::Json(_) => ErrorKind::Parse,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Check if this error came from the token provider.
    pub fn is_token_failure(&self) -> bool {
        self.kind() == ErrorKind::Token
    }

    /// Check if this error came from a remote lookup.
    pub fn is_lookup_failure(&self) -> bool {
        self.kind() == ErrorKind::Lookup
    }

    /// Diagnostic text supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::LookupFailure { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for tc-helper operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_display() {
        let e = Error::token("invalid_client");
        assert_eq!(e.to_string(), "Error generating m2m token: invalid_client");
        assert_eq!(e.kind(), ErrorKind::Token);
    }

    #[test]
    fn test_token_single_prefix() {
        let inner = Error::token("boom");
        let outer = Error::token(&inner);
        assert_eq!(outer.to_string(), "Error generating m2m token: boom");
    }

    #[test]
    fn test_lookup_without_details() {
        let e = Error::lookup("Failed to get topic details of topic id: 7", Some(200), None);
        assert_eq!(e.to_string(), "Failed to get topic details of topic id: 7.");
        assert!(e.is_lookup_failure());
        assert_eq!(e.server_message(), None);
    }

    #[test]
    fn test_lookup_with_details() {
        let e = Error::lookup(
            "Failed to get users by ids: 1,2",
            Some(404),
            Some("not found".into()),
        );
        assert_eq!(
            e.to_string(),
            "Failed to get users by ids: 1,2. Server response: not found"
        );
        assert_eq!(e.server_message(), Some("not found"));
    }

    #[test]
    fn test_lookup_keeps_source() {
        use std::error::Error as _;

        let e = Error::lookup("Failed to get topic details of topic id: 7", None, None)
            .with_source(Error::config("unreachable"));
        let source = e.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Configuration error: unreachable"));
    }

    #[test]
    fn test_kind_of_ambient_errors() {
        assert_eq!(Error::config("x").kind(), ErrorKind::Config);
        assert!(!Error::config("x").is_token_failure());
        let url_err = url::Url::parse("not a url").unwrap_err();
        assert_eq!(Error::from(url_err).kind(), ErrorKind::Transport);
    }
}

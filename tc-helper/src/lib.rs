//! Client for the Topcoder user directory and message services, plus the
//! markdown renderer used for topic and post bodies.

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod parser;

// Re-export main types
pub use client::{
    ApiConfig, ClientCredentials, DiagnosticLogger, HelperClient, HelperClientBuilder,
    HttpConfig, HttpTransport, LogDiagnostics, M2mConfig, M2mTokenProvider, RawResponse,
    ReqwestTransport, StaticTokenProvider, TokenProvider,
};
pub use error::{Error, ErrorKind, Result};

// Re-export commonly used models
pub use models::{Envelope, TopicId, User, UserId};

// Re-export API types
pub use api::{TopicApi, TopicReadBuilder, UserApi};

pub use parser::markdown_to_html;

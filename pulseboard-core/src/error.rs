//! Error types for pulseboard-core

use thiserror::Error;

/// Main error type for the pulseboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure (connect, timeout, body decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from Jira or Tempo
    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload did not have the expected overall shape
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No configured project matches the requested name or key
    #[error("project not found: {0}")]
    ProjectNotFound(String),
}

impl Error {
    /// Whether retrying the same request may succeed.
    ///
    /// Server errors, rate limiting, timeouts and connection failures are
    /// transient; everything else fails immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for pulseboard-core
pub type Result<T> = std::result::Result<T, Error>;

//! HTTP client error types.

use std::sync::Arc;

/// Connection-level errors from the HTTP clients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Base URL or endpoint path could not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport timeout elapsed.
    #[error("request timeout")]
    Timeout,

    /// Network error (DNS, refused, TLS, body read).
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// HTTP client could not be constructed.
    #[error("client build failed: {0}")]
    Build(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ClientError::Timeout } else { ClientError::Network(Arc::new(err)) }
    }
}

impl ClientError {
    /// Convert into the core transport error for `url`.
    pub fn into_transport(self, url: impl Into<String>) -> cachecheck_core::Error {
        match self {
            ClientError::InvalidUrl(msg) => cachecheck_core::Error::InvalidInput(msg),
            other => cachecheck_core::Error::Transport { url: url.into(), message: other.to_string() },
        }
    }
}

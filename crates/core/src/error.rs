//! Unified error types for cachecheck.
//!
//! Verification failures are carried as `Failure` values; this enum covers
//! everything that stops an operation before a verdict can be formed.

/// Unified error types for cachecheck.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an unknown domain name).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Connection-level failure: DNS, refused connection, transport timeout.
    #[error("TRANSPORT_ERROR: {url}: {message}")]
    Transport { url: String, message: String },

    /// Registry could not be loaded or violates its invariants.
    #[error("REGISTRY_ERROR: {0}")]
    Registry(String),
}

impl Error {
    /// Whether this error came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

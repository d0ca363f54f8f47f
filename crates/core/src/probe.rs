//! Network seams used by the verification engine.
//!
//! The HTTP-backed implementations live in `cachecheck-client`; tests drive
//! the engine through in-memory implementations instead.

use crate::{Error, InvalidationResult, Snapshot};

/// Issues a single GET against a functional endpoint.
///
/// Only connection-level failures are errors. A non-2xx status is reported in
/// the returned snapshot. Implementations never retry.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, endpoint: &str) -> Result<Snapshot, Error>;
}

/// Calls the invalidation endpoint with a comma-joined tag expression.
///
/// The expression is passed through verbatim (percent-encoded only); empty and
/// malformed values are sent as-is. Non-200 responses are results, not errors.
#[async_trait::async_trait]
pub trait Invalidator: Send + Sync {
    async fn invalidate(&self, tags: &str) -> Result<InvalidationResult, Error>;
}

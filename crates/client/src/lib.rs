//! HTTP clients for cachecheck.
//!
//! This crate provides the reqwest-backed [`HttpProbe`] for functional
//! endpoints and the [`InvalidationClient`] for the invalidation endpoint.
//! Both implement the seams defined in `cachecheck-core`.

pub mod error;
pub mod invalidate;
pub mod probe;

pub use error::ClientError;
pub use invalidate::InvalidationClient;
pub use probe::{ClientConfig, HttpProbe, resolve_endpoint};

#[cfg(test)]
pub(crate) mod test_server;

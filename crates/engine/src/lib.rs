//! Cache-invalidation verification engine and suite runner.
//!
//! The engine only talks to the network through the [`Probe`] and
//! [`Invalidator`] seams from `cachecheck-core`.
//!
//! [`Probe`]: cachecheck_core::Probe
//! [`Invalidator`]: cachecheck_core::Invalidator

pub mod engine;
mod run;
pub mod settings;
pub mod suite;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{HOSTILE_TAGS, VerificationEngine};
pub use settings::EngineSettings;
pub use suite::{Suite, SuiteCase, SuiteSummary, UNKNOWN_TAG, lifecycle_cases, negative_cases};

//! Core types and shared functionality for cachecheck.
//!
//! This crate provides:
//! - The snapshot data model and structural body comparison
//! - The tag registry and spot-check selection
//! - Verification outcomes and the recorder seam
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod invalidation;
pub mod outcome;
pub mod probe;
pub mod recorder;
pub mod registry;
pub mod snapshot;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use invalidation::{InvalidationBody, InvalidationResult};
pub use outcome::{Failure, FailureKind, Phase, Scenario, Verdict, VerificationOutcome};
pub use probe::{Invalidator, Probe};
pub use recorder::{MemoryRecorder, OutcomeRecorder, TracingRecorder};
pub use registry::{Domain, SpotCheck, TagConfig, TagRegistry};
pub use snapshot::{Body, Snapshot};

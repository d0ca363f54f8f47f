//! Per-run bookkeeping.
//!
//! A [`VerificationRun`] lives for exactly one scenario invocation and is
//! dropped once its outcome has been produced.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use cachecheck_core::{
    Failure, FailureKind, InvalidationResult, Phase, Scenario, Snapshot, SpotCheck, Verdict, VerificationOutcome,
};

/// Snapshots and results gathered during one run.
#[derive(Debug, Default)]
pub(crate) struct VerificationRun {
    pub warm: Vec<Snapshot>,
    /// Pre-invalidation ground truth, index-aligned with the endpoints.
    pub cached: Vec<Snapshot>,
    pub invalidations: Vec<InvalidationResult>,
    pub rebuilt: Vec<Snapshot>,
    /// Unrelated endpoints captured before invalidation.
    pub spot_baseline: Vec<(SpotCheck, Snapshot)>,
    pub spot_after: Vec<Snapshot>,
}

/// Phases entered by the run in flight, readable after it was cancelled.
#[derive(Debug, Clone, Default)]
pub(crate) struct PhaseLog(Arc<Mutex<Vec<Phase>>>);

impl PhaseLog {
    fn reset(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, phase: Phase) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(phase);
    }

    pub fn snapshot(&self) -> Vec<Phase> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Tracks phases and warnings and turns them into an outcome.
pub(crate) struct RunState {
    scenario: Scenario,
    label: String,
    pub tag: String,
    phases: Vec<Phase>,
    log: PhaseLog,
    warnings: Vec<String>,
    started_at: DateTime<Utc>,
    start: Instant,
    pub record: VerificationRun,
}

impl RunState {
    pub fn new(scenario: Scenario, label: impl Into<String>, tag: impl Into<String>, log: PhaseLog) -> Self {
        log.reset();
        let label = label.into();
        let tag = tag.into();
        tracing::info!(scenario = ?scenario, tag = %tag, "starting {}", label);
        Self {
            scenario,
            label,
            tag,
            phases: Vec::new(),
            log,
            warnings: Vec::new(),
            started_at: Utc::now(),
            start: Instant::now(),
            record: VerificationRun::default(),
        }
    }

    pub fn enter(&mut self, phase: Phase) {
        tracing::info!(tag = %self.tag, "{} -> {}", self.label, phase);
        self.phases.push(phase);
        self.log.push(phase);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(tag = %self.tag, "{}", message);
        self.warnings.push(message);
    }

    /// Failure attributed to this run's tag.
    pub fn fail(&self, kind: FailureKind, phase: Phase) -> Failure {
        Failure::new(kind, phase, self.tag.clone())
    }

    pub fn finish(mut self, result: Result<(), Failure>) -> VerificationOutcome {
        let verdict = match result {
            Ok(()) => {
                self.phases.push(Phase::Verified);
                Verdict::Verified
            }
            Err(failure) => {
                self.phases.push(Phase::Failed);
                Verdict::Failed(failure)
            }
        };

        let record = &self.record;
        tracing::debug!(
            warm = record.warm.len(),
            cached = record.cached.len(),
            invalidations = record.invalidations.len(),
            rebuilt = record.rebuilt.len(),
            spot_baseline = record.spot_baseline.len(),
            spot_after = record.spot_after.len(),
            "run {} finished",
            self.label
        );

        VerificationOutcome {
            scenario: self.scenario,
            label: self.label,
            tag: self.tag,
            phases: self.phases,
            verdict,
            warnings: self.warnings,
            started_at: self.started_at,
            duration_ms: self.start.elapsed().as_millis() as u64,
        }
    }
}

//! Outcome recording.
//!
//! The engine never writes to a global sink; whoever drives it passes a
//! recorder in and decides what to do with each verdict.

use crate::outcome::{Verdict, VerificationOutcome};

/// Receives exactly one outcome per run.
pub trait OutcomeRecorder: Send {
    fn record(&mut self, outcome: &VerificationOutcome);
}

/// Logs each outcome through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl OutcomeRecorder for TracingRecorder {
    fn record(&mut self, outcome: &VerificationOutcome) {
        match &outcome.verdict {
            Verdict::Verified => tracing::info!(
                scenario = ?outcome.scenario,
                tag = %outcome.tag,
                duration_ms = outcome.duration_ms,
                warnings = outcome.warnings.len(),
                "{} verified",
                outcome.label
            ),
            Verdict::Failed(failure) => tracing::error!(
                scenario = ?outcome.scenario,
                tag = %outcome.tag,
                phase = %failure.phase,
                endpoint = failure.endpoint.as_deref().unwrap_or("-"),
                duration_ms = outcome.duration_ms,
                "{} failed: {}",
                outcome.label,
                failure
            ),
        }
    }
}

/// Collects outcomes in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecorder {
    outcomes: Vec<VerificationOutcome>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> &[VerificationOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_verified())
    }
}

impl OutcomeRecorder for MemoryRecorder {
    fn record(&mut self, outcome: &VerificationOutcome) {
        self.outcomes.push(outcome.clone());
    }
}

impl<R: OutcomeRecorder + ?Sized> OutcomeRecorder for &mut R {
    fn record(&mut self, outcome: &VerificationOutcome) {
        (**self).record(outcome);
    }
}

impl<R: OutcomeRecorder + ?Sized> OutcomeRecorder for Box<R> {
    fn record(&mut self, outcome: &VerificationOutcome) {
        (**self).record(outcome);
    }
}

/// Fan an outcome out to two recorders.
impl<A: OutcomeRecorder, B: OutcomeRecorder> OutcomeRecorder for (A, B) {
    fn record(&mut self, outcome: &VerificationOutcome) {
        self.0.record(outcome);
        self.1.record(outcome);
    }
}

//! JSON-lines verdict output.

use std::io::Write;

use cachecheck_core::{OutcomeRecorder, VerificationOutcome};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("OUTPUT_FAILED: encode: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("OUTPUT_FAILED: write: {0}")]
    Write(#[from] std::io::Error),
}

/// Writes one JSON object per outcome, newline-terminated.
pub struct JsonLinesRecorder<W> {
    out: W,
}

impl<W: Write> JsonLinesRecorder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_outcome(&mut self, outcome: &VerificationOutcome) -> Result<(), OutputError> {
        serde_json::to_writer(&mut self.out, outcome)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> OutcomeRecorder for JsonLinesRecorder<W> {
    fn record(&mut self, outcome: &VerificationOutcome) {
        if let Err(e) = self.write_outcome(outcome) {
            tracing::error!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachecheck_core::{Failure, FailureKind, Phase, Scenario, Verdict};
    use chrono::Utc;
    use serde_json::Value;

    fn outcome(verdict: Verdict) -> VerificationOutcome {
        VerificationOutcome {
            scenario: Scenario::Lifecycle,
            label: "Bank - full list".into(),
            tag: "bank".into(),
            phases: vec![Phase::Cold, Phase::Warm],
            verdict,
            warnings: vec![],
            started_at: Utc::now(),
            duration_ms: 42,
        }
    }

    #[test]
    fn test_one_line_per_outcome() {
        let mut recorder = JsonLinesRecorder::new(Vec::new());
        recorder.record(&outcome(Verdict::Verified));
        let failure = Failure::new(FailureKind::DataMismatch, Phase::Rebuilt, "bank")
            .with_endpoint("/v1/bank")
            .expected("same body")
            .actual("differs at /0/name");
        recorder.record(&outcome(Verdict::Failed(failure)));

        let text = String::from_utf8(recorder.into_inner()).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["verdict"], "verified");
        assert_eq!(lines[0]["tag"], "bank");
        assert_eq!(lines[1]["verdict"], "failed");
        assert_eq!(lines[1]["failure"]["phase"], "REBUILT");
    }
}

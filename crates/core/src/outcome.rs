//! Verification phases, failures and per-run outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the verification state machine.
///
/// `COLD -> WARM -> SNAPSHOTTED -> INVALIDATED -> REBUILT`, with
/// `ISOLATION_CHECKED` entered independently after `INVALIDATED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Cold,
    Warm,
    Snapshotted,
    Invalidated,
    Rebuilt,
    IsolationChecked,
    Verified,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Cold => "COLD",
            Phase::Warm => "WARM",
            Phase::Snapshotted => "SNAPSHOTTED",
            Phase::Invalidated => "INVALIDATED",
            Phase::Rebuilt => "REBUILT",
            Phase::IsolationChecked => "ISOLATION_CHECKED",
            Phase::Verified => "VERIFIED",
            Phase::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Which scenario produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Warm, snapshot, double invalidation, rebuild, isolation.
    Lifecycle,
    /// Tag that matches no cache entries.
    UnknownTag,
    /// Empty tag expression.
    EmptyTag,
    /// Several tags joined by commas in one call.
    MultiTag,
    /// Markup, SQL-like and path-traversal payloads.
    HostileTags,
    /// Repeated reads right after a rebuild.
    StaleReads,
}

/// Failure classes surfaced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    UnexpectedStatus,
    DataMismatch,
    InvalidationContractViolation,
    Timeout,
}

impl FailureKind {
    /// Stable code used in `Display` output.
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::Transport => "TRANSPORT_ERROR",
            FailureKind::UnexpectedStatus => "UNEXPECTED_STATUS",
            FailureKind::DataMismatch => "DATA_MISMATCH",
            FailureKind::InvalidationContractViolation => "INVALIDATION_CONTRACT",
            FailureKind::Timeout => "RUN_TIMEOUT",
        }
    }
}

/// An assertion violation, with enough context to diagnose without re-running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub phase: Phase,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub expected: String,
    pub actual: String,
}

impl Failure {
    pub fn new(kind: FailureKind, phase: Phase, tag: impl Into<String>) -> Self {
        Self { kind, phase, tag: tag.into(), endpoint: None, expected: String::new(), actual: String::new() }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = actual.into();
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: phase={} tag={:?}", self.kind.code(), self.phase, self.tag)?;
        if let Some(endpoint) = &self.endpoint {
            write!(f, " endpoint={endpoint}")?;
        }
        write!(f, " expected {}, got {}", self.expected, self.actual)
    }
}

impl std::error::Error for Failure {}

/// Verdict of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "failure", rename_all = "snake_case")]
pub enum Verdict {
    Verified,
    Failed(Failure),
}

/// Exactly one of these is emitted per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub scenario: Scenario,
    pub label: String,
    pub tag: String,
    /// Phases entered, in order.
    pub phases: Vec<Phase>,
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Soft conditions, e.g. a response without `deletedKeys`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self.verdict, Verdict::Verified)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.verdict {
            Verdict::Verified => None,
            Verdict::Failed(failure) => Some(failure),
        }
    }

    /// Outcome for a run that exceeded its ceiling.
    ///
    /// `reached` holds the phases entered before the ceiling; the failure is
    /// attributed to the last of them.
    pub fn timed_out(
        scenario: Scenario, label: impl Into<String>, tag: impl Into<String>, mut reached: Vec<Phase>,
        ceiling_ms: u64, started_at: DateTime<Utc>,
    ) -> Self {
        let tag = tag.into();
        let stuck_in = reached.last().copied().unwrap_or(Phase::Cold);
        let failure = Failure::new(FailureKind::Timeout, stuck_in, tag.clone())
            .expected(format!("run completes within {ceiling_ms}ms"))
            .actual(format!("ceiling exceeded after {stuck_in}"));
        reached.push(Phase::Failed);
        Self {
            scenario,
            label: label.into(),
            tag,
            phases: reached,
            verdict: Verdict::Failed(failure),
            warnings: Vec::new(),
            started_at,
            duration_ms: ceiling_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_display() {
        let failure = Failure::new(FailureKind::UnexpectedStatus, Phase::Warm, "bank")
            .with_endpoint("/v1/bank/index")
            .expected("status 200")
            .actual("status 502");
        let text = failure.to_string();
        assert!(text.starts_with("UNEXPECTED_STATUS: phase=WARM"));
        assert!(text.contains("endpoint=/v1/bank/index"));
        assert!(text.contains("expected status 200, got status 502"));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = VerificationOutcome {
            scenario: Scenario::Lifecycle,
            label: "Bank - full list".into(),
            tag: "bank".into(),
            phases: vec![Phase::Cold, Phase::Warm],
            verdict: Verdict::Failed(
                Failure::new(FailureKind::DataMismatch, Phase::Rebuilt, "bank").expected("a").actual("b"),
            ),
            warnings: Vec::new(),
            started_at: DateTime::from_timestamp(0, 0).unwrap(),
            duration_ms: 5,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["verdict"], json!("failed"));
        assert_eq!(value["failure"]["kind"], json!("data_mismatch"));
        assert_eq!(value["failure"]["phase"], json!("REBUILT"));
        assert_eq!(value["phases"], json!(["COLD", "WARM"]));
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn test_timed_out_outcome() {
        let reached = vec![Phase::Cold, Phase::Warm, Phase::Snapshotted];
        let outcome = VerificationOutcome::timed_out(Scenario::Lifecycle, "x", "bank", reached, 1_000, Utc::now());
        assert!(!outcome.is_verified());
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.phase, Phase::Snapshotted);
        assert_eq!(failure.actual, "ceiling exceeded after SNAPSHOTTED");
        assert_eq!(outcome.phases, vec![Phase::Cold, Phase::Warm, Phase::Snapshotted, Phase::Failed]);

        let outcome = VerificationOutcome::timed_out(Scenario::EmptyTag, "y", "", Vec::new(), 1_000, Utc::now());
        assert_eq!(outcome.failure().map(|f| f.phase), Some(Phase::Cold));
    }
}

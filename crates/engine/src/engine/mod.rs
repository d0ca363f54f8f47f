//! Cache-invalidation verification engine.
//!
//! ### Protocol
//! `COLD -> WARM -> SNAPSHOTTED -> INVALIDATED -> REBUILT`, with
//! `ISOLATION_CHECKED` entered independently after `INVALIDATED`. Both
//! `REBUILT` and `ISOLATION_CHECKED` must pass for `VERIFIED`.
//!
//! ### Rules
//! - Every network call is awaited before the next one starts.
//! - The first violated assertion ends the run; nothing is retried.
//! - A missing `deletedKeys` downgrades the count check to a warning.

mod lifecycle;
mod negative;

pub use negative::HOSTILE_TAGS;

use cachecheck_core::registry::{select, select_excluding};
use cachecheck_core::snapshot::{describe_pointer, first_difference};
use cachecheck_core::{
    Failure, FailureKind, InvalidationResult, Invalidator, Phase, Probe, Scenario, Snapshot, SpotCheck,
};

use crate::run::{PhaseLog, RunState};
use crate::settings::EngineSettings;

/// Endpoint name used in failures raised by invalidation calls.
const INVALIDATE_ENDPOINT: &str = "invalidate";

/// Drives the verification protocol against a probe and an invalidator.
pub struct VerificationEngine<P, I> {
    probe: P,
    invalidator: I,
    spot_checks: Vec<SpotCheck>,
    settings: EngineSettings,
    progress: PhaseLog,
}

impl<P: Probe, I: Invalidator> VerificationEngine<P, I> {
    /// Create an engine; `spot_checks` is the ordered candidate table.
    pub fn new(probe: P, invalidator: I, spot_checks: Vec<SpotCheck>, settings: EngineSettings) -> Self {
        Self { probe, invalidator, spot_checks, settings, progress: PhaseLog::default() }
    }

    /// Phases entered so far by the current (or last) run.
    pub fn phases_reached(&self) -> Vec<Phase> {
        self.progress.snapshot()
    }

    fn start_run(&self, scenario: Scenario, label: impl Into<String>, tag: impl Into<String>) -> RunState {
        RunState::new(scenario, label, tag, self.progress.clone())
    }

    /// Spot checks for a run on `domain`.
    fn spot_checks_for(&self, domain: &str) -> Vec<SpotCheck> {
        select(domain, &self.spot_checks, self.settings.spot_check_limit)
    }

    /// Spot checks for a run that touches all of `domains`.
    fn spot_checks_excluding(&self, domains: &[&str]) -> Vec<SpotCheck> {
        select_excluding(domains, &self.spot_checks, self.settings.spot_check_limit)
    }

    /// Single GET; only transport failures fail here.
    async fn read(&self, run: &RunState, phase: Phase, endpoint: &str) -> Result<Snapshot, Failure> {
        self.probe.probe(endpoint).await.map_err(|e| {
            run.fail(FailureKind::Transport, phase)
                .with_endpoint(endpoint)
                .expected("a response")
                .actual(e.to_string())
        })
    }

    /// Single GET that must answer 200.
    async fn read_ok(&self, run: &RunState, phase: Phase, endpoint: &str) -> Result<Snapshot, Failure> {
        let snap = self.read(run, phase, endpoint).await?;
        if !snap.is_ok() {
            return Err(run
                .fail(FailureKind::UnexpectedStatus, phase)
                .with_endpoint(endpoint)
                .expected("status 200")
                .actual(format!("status {}", snap.status)));
        }
        tracing::debug!(duration_ms = snap.duration_ms, fingerprint = %short(&snap.fingerprint()), "{} ok: {}", phase, endpoint);
        Ok(snap)
    }

    /// GET every endpoint in order, each must answer 200.
    async fn read_all_ok(&self, run: &RunState, phase: Phase, endpoints: &[String]) -> Result<Vec<Snapshot>, Failure> {
        let mut snapshots = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            snapshots.push(self.read_ok(run, phase, endpoint).await?);
        }
        Ok(snapshots)
    }

    /// Re-read `endpoint` and require its body to match `reference`.
    async fn read_matching(
        &self, run: &RunState, phase: Phase, endpoint: &str, reference: &Snapshot,
    ) -> Result<Snapshot, Failure> {
        let snap = self.read_ok(run, phase, endpoint).await?;
        require_same(run, phase, endpoint, reference, &snap)?;
        Ok(snap)
    }

    /// Capture the isolation baseline: every spot check must answer 200.
    async fn capture_spot_checks(&self, run: &mut RunState, checks: Vec<SpotCheck>) -> Result<(), Failure> {
        for check in checks {
            let snap = self.read_ok(run, Phase::Snapshotted, &check.path).await?;
            tracing::debug!("spot-check baseline: {}", check.label);
            run.record.spot_baseline.push((check, snap));
        }
        Ok(())
    }

    /// Re-read every spot check and require it unchanged since the baseline.
    async fn verify_isolation(&self, run: &mut RunState) -> Result<(), Failure> {
        let baseline = std::mem::take(&mut run.record.spot_baseline);
        for (check, reference) in &baseline {
            let snap = self
                .read_matching(run, Phase::IsolationChecked, &check.path, reference)
                .await?;
            tracing::debug!("spot-check intact: {}", check.label);
            run.record.spot_after.push(snap);
        }
        run.record.spot_baseline = baseline;
        run.enter(Phase::IsolationChecked);
        Ok(())
    }

    /// One invalidation call; only transport failures fail here.
    async fn invalidate_once(&self, tags: &str) -> Result<InvalidationResult, Failure> {
        self.invalidator.invalidate(tags).await.map_err(|e| {
            Failure::new(FailureKind::Transport, Phase::Invalidated, tags)
                .with_endpoint(INVALIDATE_ENDPOINT)
                .expected("a response")
                .actual(e.to_string())
        })
    }

    /// The double-call protocol.
    ///
    /// The first call must report success and, when `deletedKeys` is present,
    /// a positive count. The immediate second call with the same expression
    /// must report success and zero deleted keys.
    async fn invalidate_twice(&self, run: &mut RunState, tags: &str) -> Result<(), Failure> {
        let first = self.invalidate_once(tags).await?;
        check_invalidation(run, tags, &first, "first", |n| n > 0, "deletedKeys > 0")?;
        run.record.invalidations.push(first);

        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        let second = self.invalidate_once(tags).await?;
        check_invalidation(run, tags, &second, "second", |n| n == 0, "deletedKeys == 0")?;
        run.record.invalidations.push(second);

        run.enter(Phase::Invalidated);
        Ok(())
    }

    /// A call that must not crash the service and must not delete anything.
    async fn invalidate_without_effect(&self, run: &mut RunState, tags: &str) -> Result<(), Failure> {
        let result = self.invalidate_once(tags).await?;
        require_no_crash(tags, &result)?;
        match result.deleted_keys() {
            Some(0) => {}
            Some(n) => {
                return Err(Failure::new(FailureKind::InvalidationContractViolation, Phase::Invalidated, tags)
                    .with_endpoint(INVALIDATE_ENDPOINT)
                    .expected("deletedKeys == 0")
                    .actual(format!("deletedKeys == {n}")));
            }
            None => run.warn(format!("deletedKeys absent for tags={tags:?}; relying on spot checks")),
        }
        run.record.invalidations.push(result);
        run.enter(Phase::Invalidated);
        Ok(())
    }
}

/// Judge one call of the double-call protocol.
fn check_invalidation(
    run: &mut RunState, tags: &str, result: &InvalidationResult, which: &str, count_ok: impl Fn(i64) -> bool,
    expectation: &str,
) -> Result<(), Failure> {
    let violation = |kind: FailureKind| {
        Failure::new(kind, Phase::Invalidated, tags).with_endpoint(INVALIDATE_ENDPOINT)
    };

    if result.status != 200 {
        return Err(violation(FailureKind::UnexpectedStatus)
            .expected(format!("{which} call status 200"))
            .actual(format!("status {}", result.status)));
    }

    if !result.success() {
        return Err(violation(FailureKind::InvalidationContractViolation)
            .expected(format!("{which} call success == true"))
            .actual(format!("success == {:?}", result.body.success)));
    }

    match result.deleted_keys() {
        Some(n) if count_ok(n) => {
            tracing::info!(deleted_keys = n, "{} invalidation of {:?} ok ({})", which, tags, expectation);
        }
        Some(n) => {
            return Err(violation(FailureKind::InvalidationContractViolation)
                .expected(format!("{which} call {expectation}"))
                .actual(format!("deletedKeys == {n}")));
        }
        None => run.warn(format!(
            "{which} invalidation of {tags:?}: deletedKeys not present, skipping count assertion"
        )),
    }

    Ok(())
}

/// Status 500 means the service crashed on the input.
fn require_no_crash(tags: &str, result: &InvalidationResult) -> Result<(), Failure> {
    if result.is_server_crash() {
        return Err(Failure::new(FailureKind::UnexpectedStatus, Phase::Invalidated, tags)
            .with_endpoint(INVALIDATE_ENDPOINT)
            .expected("status other than 500")
            .actual(format!("status {}", result.status)));
    }
    Ok(())
}

/// Body of `actual` must be structurally equal to `reference`.
fn require_same(run: &RunState, phase: Phase, endpoint: &str, reference: &Snapshot, actual: &Snapshot) -> Result<(), Failure> {
    match first_difference(reference, actual) {
        None => Ok(()),
        Some(pointer) => Err(run
            .fail(FailureKind::DataMismatch, phase)
            .with_endpoint(endpoint)
            .expected(format!("body equal to reference {}", short(&reference.fingerprint())))
            .actual(format!("body {} differs at {}", short(&actual.fingerprint()), describe_pointer(&pointer)))),
    }
}

fn short(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(12)]
}

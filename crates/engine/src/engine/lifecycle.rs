//! Positive scenarios: the full lifecycle, multi-tag and stale reads.

use cachecheck_core::{Error, Failure, FailureKind, Invalidator, Phase, Probe, Scenario, Snapshot, TagConfig, VerificationOutcome};

use super::{VerificationEngine, require_same};
use crate::run::RunState;

impl<P: Probe, I: Invalidator> VerificationEngine<P, I> {
    /// Run the lifecycle for one registry row.
    pub async fn verify_tag(&self, domain: &str, config: &TagConfig) -> VerificationOutcome {
        let mut run = self.start_run(Scenario::Lifecycle, config.label.clone(), config.tag.clone());
        let result = self.lifecycle(&mut run, domain, config).await;
        run.finish(result)
    }

    async fn lifecycle(&self, run: &mut RunState, domain: &str, config: &TagConfig) -> Result<(), Failure> {
        run.enter(Phase::Cold);
        if config.endpoints.is_empty() {
            run.warn(format!(
                "{}: no endpoints mapped to tag {:?}; rebuild fidelity is not verified",
                config.label, config.tag
            ));
        }

        self.warm_and_snapshot(run, &config.endpoints).await?;
        self.capture_spot_checks(run, self.spot_checks_for(domain)).await?;
        run.enter(Phase::Snapshotted);

        self.invalidate_twice(run, &config.tag).await?;

        let cached = std::mem::take(&mut run.record.cached);
        run.record.rebuilt = self.rebuild(run, &config.endpoints, &cached).await?;
        run.record.cached = cached;
        run.enter(Phase::Rebuilt);

        self.verify_isolation(run).await
    }

    /// Run one combined invalidation for several rows at once.
    ///
    /// Tags are joined with `,` into a single expression. Spot checks skip
    /// every involved domain.
    pub async fn verify_multi_tag(&self, targets: &[(&str, &TagConfig)]) -> Result<VerificationOutcome, Error> {
        if targets.is_empty() {
            return Err(Error::InvalidInput("multi-tag run needs at least one tag".into()));
        }

        let expression = targets.iter().map(|(_, c)| c.tag.as_str()).collect::<Vec<_>>().join(",");
        let label = targets.iter().map(|(_, c)| c.label.as_str()).collect::<Vec<_>>().join(" + ");
        let mut run = self.start_run(Scenario::MultiTag, label, expression.clone());
        let result = self.multi_tag(&mut run, targets, &expression).await;
        Ok(run.finish(result))
    }

    async fn multi_tag(&self, run: &mut RunState, targets: &[(&str, &TagConfig)], expression: &str) -> Result<(), Failure> {
        run.enter(Phase::Cold);
        let endpoints: Vec<String> = targets.iter().flat_map(|(_, c)| c.endpoints.iter().cloned()).collect();
        if targets.iter().any(|(_, c)| c.endpoints.is_empty()) {
            run.warn(format!("some of {expression:?} have no endpoints; rebuild coverage is partial"));
        }

        self.warm_and_snapshot(run, &endpoints).await?;
        let domains: Vec<&str> = targets.iter().map(|(d, _)| *d).collect();
        self.capture_spot_checks(run, self.spot_checks_excluding(&domains)).await?;
        run.enter(Phase::Snapshotted);

        self.invalidate_twice(run, expression).await?;

        let cached = std::mem::take(&mut run.record.cached);
        run.record.rebuilt = self.rebuild(run, &endpoints, &cached).await?;
        run.record.cached = cached;
        run.enter(Phase::Rebuilt);

        self.verify_isolation(run).await
    }

    /// Check that reads right after a rebuild never serve stale or blank data.
    ///
    /// After the regular rebuild, each endpoint is read `rapid_read_count`
    /// times back to back, then once more after `final_read_pause`.
    pub async fn verify_no_stale_reads(&self, domain: &str, config: &TagConfig) -> Result<VerificationOutcome, Error> {
        if config.endpoints.is_empty() {
            return Err(Error::InvalidInput(format!(
                "stale-read check needs endpoints, tag {:?} has none",
                config.tag
            )));
        }

        let mut run = self.start_run(Scenario::StaleReads, format!("{} (stale reads)", config.label), config.tag.clone());
        let result = self.stale_reads(&mut run, domain, config).await;
        Ok(run.finish(result))
    }

    async fn stale_reads(&self, run: &mut RunState, domain: &str, config: &TagConfig) -> Result<(), Failure> {
        run.enter(Phase::Cold);
        self.warm_and_snapshot(run, &config.endpoints).await?;
        self.capture_spot_checks(run, self.spot_checks_for(domain)).await?;
        run.enter(Phase::Snapshotted);

        self.invalidate_twice(run, &config.tag).await?;

        let cached = std::mem::take(&mut run.record.cached);
        let rebuilt = self.rebuild(run, &config.endpoints, &cached).await?;
        run.record.cached = cached;

        for (endpoint, reference) in config.endpoints.iter().zip(&rebuilt) {
            for _ in 0..self.settings.rapid_read_count {
                self.fresh_read(run, endpoint, reference).await?;
            }
        }

        tokio::time::sleep(self.settings.final_read_pause).await;
        for (endpoint, reference) in config.endpoints.iter().zip(&rebuilt) {
            self.fresh_read(run, endpoint, reference).await?;
        }

        run.record.rebuilt = rebuilt;
        run.enter(Phase::Rebuilt);
        self.verify_isolation(run).await
    }

    /// WARM then SNAPSHOTTED reads; the second pass is the ground truth.
    async fn warm_and_snapshot(&self, run: &mut RunState, endpoints: &[String]) -> Result<(), Failure> {
        run.record.warm = self.read_all_ok(run, Phase::Warm, endpoints).await?;
        run.enter(Phase::Warm);
        run.record.cached = self.read_all_ok(run, Phase::Snapshotted, endpoints).await?;
        Ok(())
    }

    /// Post-invalidation reads, each equal to its cached counterpart.
    async fn rebuild(&self, run: &RunState, endpoints: &[String], cached: &[Snapshot]) -> Result<Vec<Snapshot>, Failure> {
        let mut rebuilt = Vec::with_capacity(endpoints.len());
        for (endpoint, reference) in endpoints.iter().zip(cached) {
            rebuilt.push(self.read_matching(run, Phase::Rebuilt, endpoint, reference).await?);
        }
        Ok(rebuilt)
    }

    async fn fresh_read(&self, run: &RunState, endpoint: &str, reference: &Snapshot) -> Result<(), Failure> {
        let snap = self.read_ok(run, Phase::Rebuilt, endpoint).await?;
        if snap.body.is_blank() {
            return Err(run
                .fail(FailureKind::DataMismatch, Phase::Rebuilt)
                .with_endpoint(endpoint)
                .expected("non-empty body")
                .actual("empty body"));
        }
        require_same(run, Phase::Rebuilt, endpoint, reference, &snap)
    }
}

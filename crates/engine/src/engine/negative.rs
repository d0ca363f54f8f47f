//! Adversarial scenarios: tags that must not delete, crash or leak.

use cachecheck_core::{Failure, Invalidator, Phase, Probe, Scenario, VerificationOutcome};

use super::{VerificationEngine, require_no_crash};
use crate::run::RunState;

/// Payloads sent by the hostile-tags scenario.
pub const HOSTILE_TAGS: [&str; 4] = [
    "<script>alert(1)</script>",
    "tag;DROP TABLE",
    "../../../etc/passwd",
    "tag with spaces",
];

impl<P: Probe, I: Invalidator> VerificationEngine<P, I> {
    /// A tag matching no entries: no crash, zero deletions, nothing else touched.
    pub async fn verify_unknown_tag(&self, tag: &str) -> VerificationOutcome {
        let mut run = self.start_run(Scenario::UnknownTag, format!("unknown tag {tag:?}"), tag);
        let result = self.no_effect(&mut run, tag).await;
        run.finish(result)
    }

    /// The empty expression `tags=`: same expectations as an unknown tag.
    pub async fn verify_empty_tag(&self) -> VerificationOutcome {
        let mut run = self.start_run(Scenario::EmptyTag, "empty tag", "");
        let result = self.no_effect(&mut run, "").await;
        run.finish(result)
    }

    async fn no_effect(&self, run: &mut RunState, tag: &str) -> Result<(), Failure> {
        run.enter(Phase::Cold);
        self.capture_spot_checks(run, self.spot_checks_excluding(&[])).await?;
        run.enter(Phase::Snapshotted);
        self.invalidate_without_effect(run, tag).await?;
        self.verify_isolation(run).await
    }

    /// Each payload is sent once; any 500 fails the run.
    pub async fn verify_hostile_tags(&self, payloads: &[&str]) -> VerificationOutcome {
        let mut run = self.start_run(Scenario::HostileTags, "hostile tags", payloads.join(" | "));
        let result = self.hostile(&mut run, payloads).await;
        run.finish(result)
    }

    async fn hostile(&self, run: &mut RunState, payloads: &[&str]) -> Result<(), Failure> {
        run.enter(Phase::Cold);
        for payload in payloads {
            let result = self.invalidate_once(payload).await?;
            require_no_crash(payload, &result)?;
            tracing::debug!(status = result.status, "hostile tag {:?} handled", payload);
            run.record.invalidations.push(result);
        }
        run.enter(Phase::Invalidated);
        Ok(())
    }
}

//! Sequential suite runner.
//!
//! Cases run one after another. Each case is bounded by the run ceiling and
//! yields exactly one recorded outcome.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use cachecheck_core::{
    Error, Invalidator, OutcomeRecorder, Probe, Scenario, TagConfig, TagRegistry, VerificationOutcome,
};

use crate::engine::{HOSTILE_TAGS, VerificationEngine};

/// Tag that must match nothing in the cache.
pub const UNKNOWN_TAG: &str = "random123";

/// One scheduled verification run.
#[derive(Debug, Clone)]
pub enum SuiteCase {
    Tag { domain: String, config: TagConfig },
    UnknownTag(String),
    EmptyTag,
    MultiTag(Vec<(String, TagConfig)>),
    HostileTags(Vec<String>),
    StaleReads { domain: String, config: TagConfig },
}

impl SuiteCase {
    pub fn scenario(&self) -> Scenario {
        match self {
            SuiteCase::Tag { .. } => Scenario::Lifecycle,
            SuiteCase::UnknownTag(_) => Scenario::UnknownTag,
            SuiteCase::EmptyTag => Scenario::EmptyTag,
            SuiteCase::MultiTag(_) => Scenario::MultiTag,
            SuiteCase::HostileTags(_) => Scenario::HostileTags,
            SuiteCase::StaleReads { .. } => Scenario::StaleReads,
        }
    }

    /// Label and tag expression used when the run never produced its own.
    fn identity(&self) -> (String, String) {
        match self {
            SuiteCase::Tag { config, .. } => (config.label.clone(), config.tag.clone()),
            SuiteCase::StaleReads { config, .. } => (format!("{} (stale reads)", config.label), config.tag.clone()),
            SuiteCase::UnknownTag(tag) => (format!("unknown tag {tag:?}"), tag.clone()),
            SuiteCase::EmptyTag => ("empty tag".into(), String::new()),
            SuiteCase::MultiTag(targets) => (
                targets.iter().map(|(_, c)| c.label.as_str()).collect::<Vec<_>>().join(" + "),
                targets.iter().map(|(_, c)| c.tag.as_str()).collect::<Vec<_>>().join(","),
            ),
            SuiteCase::HostileTags(payloads) => ("hostile tags".into(), payloads.join(" | ")),
        }
    }
}

/// Lifecycle cases for every registry row, or only those of `domain`.
pub fn lifecycle_cases(registry: &TagRegistry, domain: Option<&str>) -> Result<Vec<SuiteCase>, Error> {
    let domains = match domain {
        Some(name) => vec![
            registry
                .domain(name)
                .ok_or_else(|| Error::InvalidInput(format!("unknown domain {name:?}")))?,
        ],
        None => registry.domains().iter().collect(),
    };

    Ok(domains
        .into_iter()
        .flat_map(|d| {
            d.tags.iter().map(move |config| SuiteCase::Tag { domain: d.name.clone(), config: config.clone() })
        })
        .collect())
}

/// The adversarial scenarios.
///
/// Multi-tag combines the first rows of `bank` and `category`, stale reads
/// use the first `bank` row. Either is skipped when the registry lacks it.
pub fn negative_cases(registry: &TagRegistry) -> Vec<SuiteCase> {
    let first_row = |name: &str| {
        registry
            .domain(name)
            .and_then(|d| d.tags.first())
            .map(|config| (name.to_string(), config.clone()))
    };

    let mut cases = vec![SuiteCase::UnknownTag(UNKNOWN_TAG.into()), SuiteCase::EmptyTag];
    match (first_row("bank"), first_row("category")) {
        (Some(bank), Some(category)) => cases.push(SuiteCase::MultiTag(vec![bank, category])),
        _ => tracing::warn!("registry lacks bank or category rows, skipping multi-tag case"),
    }
    cases.push(SuiteCase::HostileTags(HOSTILE_TAGS.iter().map(|s| s.to_string()).collect()));
    match first_row("bank") {
        Some((domain, config)) if !config.endpoints.is_empty() => cases.push(SuiteCase::StaleReads { domain, config }),
        _ => tracing::warn!("registry lacks a bank row with endpoints, skipping stale-read case"),
    }
    cases
}

/// Tally of a suite run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub verified: usize,
    pub failed: usize,
}

impl SuiteSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn add(&mut self, outcome: &VerificationOutcome) {
        self.total += 1;
        if outcome.is_verified() {
            self.verified += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Runs cases through an engine and hands each outcome to a recorder.
pub struct Suite<P, I, R> {
    engine: VerificationEngine<P, I>,
    recorder: R,
    ceiling: Duration,
}

impl<P: Probe, I: Invalidator, R: OutcomeRecorder> Suite<P, I, R> {
    pub fn new(engine: VerificationEngine<P, I>, recorder: R, ceiling: Duration) -> Self {
        Self { engine, recorder, ceiling }
    }

    /// Run one case under the ceiling and record its outcome.
    pub async fn run_case(&mut self, case: &SuiteCase) -> Result<VerificationOutcome, Error> {
        let started_at = Utc::now();
        let outcome = match tokio::time::timeout(self.ceiling, self.dispatch(case)).await {
            Ok(result) => result?,
            Err(_) => {
                let (label, tag) = case.identity();
                let reached = self.engine.phases_reached();
                let ceiling_ms = self.ceiling.as_millis() as u64;
                tracing::error!(ceiling_ms, last_phase = ?reached.last(), "{} exceeded run ceiling", label);
                VerificationOutcome::timed_out(case.scenario(), label, tag, reached, ceiling_ms, started_at)
            }
        };
        self.recorder.record(&outcome);
        Ok(outcome)
    }

    /// Run every case in order. Input errors abort the suite.
    pub async fn run_all(&mut self, cases: &[SuiteCase]) -> Result<SuiteSummary, Error> {
        let mut summary = SuiteSummary::default();
        for case in cases {
            let outcome = self.run_case(case).await?;
            summary.add(&outcome);
        }
        tracing::info!(total = summary.total, verified = summary.verified, failed = summary.failed, "suite finished");
        Ok(summary)
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }

    async fn dispatch(&self, case: &SuiteCase) -> Result<VerificationOutcome, Error> {
        let engine = &self.engine;
        match case {
            SuiteCase::Tag { domain, config } => Ok(engine.verify_tag(domain, config).await),
            SuiteCase::UnknownTag(tag) => Ok(engine.verify_unknown_tag(tag).await),
            SuiteCase::EmptyTag => Ok(engine.verify_empty_tag().await),
            SuiteCase::MultiTag(targets) => {
                let targets: Vec<(&str, &TagConfig)> = targets.iter().map(|(d, c)| (d.as_str(), c)).collect();
                engine.verify_multi_tag(&targets).await
            }
            SuiteCase::HostileTags(payloads) => {
                let payloads: Vec<&str> = payloads.iter().map(String::as_str).collect();
                Ok(engine.verify_hostile_tags(&payloads).await)
            }
            SuiteCase::StaleReads { domain, config } => engine.verify_no_stale_reads(domain, config).await,
        }
    }
}

//! Spot-check selection.
//!
//! Picks a small, fixed sample of endpoints from domains outside the one under
//! test. Selection follows the candidate table order so runs are repeatable.

use super::SpotCheck;

/// Default number of spot checks per run.
pub const DEFAULT_SPOT_CHECK_LIMIT: usize = 3;

/// Up to `limit` candidates whose domain is not `exclude_domain`.
pub fn select(exclude_domain: &str, candidates: &[SpotCheck], limit: usize) -> Vec<SpotCheck> {
    select_excluding(&[exclude_domain], candidates, limit)
}

/// Up to `limit` candidates whose domain is in none of `excluded`.
pub fn select_excluding(excluded: &[&str], candidates: &[SpotCheck], limit: usize) -> Vec<SpotCheck> {
    candidates
        .iter()
        .filter(|c| !excluded.contains(&c.domain.as_str()))
        .take(limit)
        .cloned()
        .collect()
}

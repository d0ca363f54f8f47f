//! Engine tuning knobs.

use std::time::Duration;

use cachecheck_core::AppConfig;
use cachecheck_core::registry::DEFAULT_SPOT_CHECK_LIMIT;

/// Settings that shape a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Unrelated endpoints sampled for the isolation check.
    pub spot_check_limit: usize,
    /// Pause between the two invalidation calls. Zero means none.
    pub settle_delay: Duration,
    /// Reads issued by the stale-read scenario.
    pub rapid_read_count: usize,
    /// Pause before the last stale-read check.
    pub final_read_pause: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            spot_check_limit: DEFAULT_SPOT_CHECK_LIMIT,
            settle_delay: Duration::ZERO,
            rapid_read_count: 5,
            final_read_pause: Duration::from_secs(2),
        }
    }
}

impl EngineSettings {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            spot_check_limit: config.spot_check_limit,
            settle_delay: config.settle_delay(),
            rapid_read_count: config.rapid_read_count,
            final_read_pause: config.final_read_pause(),
        }
    }
}

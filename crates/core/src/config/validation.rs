//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `base_url` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `base_url` is not an absolute http(s) URL
    /// - `invalidate_path` does not start with `/`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `run_ceiling_ms` is shorter than `timeout_ms`
    /// - `spot_check_limit` or `rapid_read_count` is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Missing {
                field: "base_url".into(),
                hint: "Set CACHECHECK_BASE_URL environment variable".into(),
            });
        }
        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    field: "base_url".into(),
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
            Err(e) => return Err(ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() }),
        }

        if !self.invalidate_path.starts_with('/') {
            return Err(ConfigError::Invalid { field: "invalidate_path".into(), reason: "must start with '/'".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.run_ceiling_ms < self.timeout_ms {
            return Err(ConfigError::Invalid {
                field: "run_ceiling_ms".into(),
                reason: "must be at least timeout_ms".into(),
            });
        }

        if self.spot_check_limit == 0 {
            return Err(ConfigError::Invalid { field: "spot_check_limit".into(), reason: "must be greater than 0".into() });
        }

        if self.rapid_read_count == 0 {
            return Err(ConfigError::Invalid { field: "rapid_read_count".into(), reason: "must be greater than 0".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.settle_delay_ms > 0 {
            tracing::warn!(
                settle_delay_ms = self.settle_delay_ms,
                "settle delay between invalidation calls is enabled; \
                 concurrent writers may still repopulate the tag"
            );
        }

        Ok(())
    }
}

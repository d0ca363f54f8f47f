//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CACHECHECK_*)
//! 2. TOML config file (if CACHECHECK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, TagRegistry};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CACHECHECK_*)
/// 2. TOML config file (if CACHECHECK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host serving both the functional and the invalidation endpoints.
    ///
    /// Set via CACHECHECK_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the invalidation endpoint.
    ///
    /// Set via CACHECHECK_INVALIDATE_PATH environment variable.
    #[serde(default = "default_invalidate_path")]
    pub invalidate_path: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CACHECHECK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header sent with every request.
    ///
    /// Set via CACHECHECK_ACCEPT environment variable.
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Transport connect/response timeout in milliseconds.
    ///
    /// Set via CACHECHECK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Ceiling for a whole verification run in milliseconds.
    ///
    /// Set via CACHECHECK_RUN_CEILING_MS environment variable.
    #[serde(default = "default_run_ceiling_ms")]
    pub run_ceiling_ms: u64,

    /// Number of unrelated endpoints read to check isolation.
    ///
    /// Set via CACHECHECK_SPOT_CHECK_LIMIT environment variable.
    #[serde(default = "default_spot_check_limit")]
    pub spot_check_limit: usize,

    /// Pause between the two invalidation calls, in milliseconds.
    ///
    /// Set via CACHECHECK_SETTLE_DELAY_MS environment variable.
    #[serde(default)]
    pub settle_delay_ms: u64,

    /// Reads issued by the stale-read scenario.
    ///
    /// Set via CACHECHECK_RAPID_READ_COUNT environment variable.
    #[serde(default = "default_rapid_read_count")]
    pub rapid_read_count: usize,

    /// Pause before the final stale-read check, in milliseconds.
    ///
    /// Set via CACHECHECK_FINAL_READ_PAUSE_MS environment variable.
    #[serde(default = "default_final_read_pause_ms")]
    pub final_read_pause_ms: u64,

    /// TOML file replacing the built-in tag registry.
    ///
    /// Set via CACHECHECK_REGISTRY_FILE environment variable.
    #[serde(default)]
    pub registry_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://devtez.91trucks.com".into()
}

fn default_invalidate_path() -> String {
    "/v1/internal/cache/invalidate".into()
}

fn default_user_agent() -> String {
    "cachecheck/0.1".into()
}

fn default_accept() -> String {
    "application/json".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_run_ceiling_ms() -> u64 {
    120_000
}

fn default_spot_check_limit() -> usize {
    crate::registry::DEFAULT_SPOT_CHECK_LIMIT
}

fn default_rapid_read_count() -> usize {
    5
}

fn default_final_read_pause_ms() -> u64 {
    2_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            invalidate_path: default_invalidate_path(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            timeout_ms: default_timeout_ms(),
            run_ceiling_ms: default_run_ceiling_ms(),
            spot_check_limit: default_spot_check_limit(),
            settle_delay_ms: 0,
            rapid_read_count: default_rapid_read_count(),
            final_read_pause_ms: default_final_read_pause_ms(),
            registry_file: None,
        }
    }
}

impl AppConfig {
    /// Transport timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Per-run ceiling as Duration for use with tokio.
    pub fn run_ceiling(&self) -> Duration {
        Duration::from_millis(self.run_ceiling_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn final_read_pause(&self) -> Duration {
        Duration::from_millis(self.final_read_pause_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CACHECHECK_`
    /// 2. TOML file from `CACHECHECK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CACHECHECK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CACHECHECK_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the tag registry named by `registry_file`, or the built-in one.
    pub fn load_registry(&self) -> Result<TagRegistry, Error> {
        TagRegistry::load(self.registry_file.as_deref())
    }
}

//! Runtime configuration for the lifecycle engine and the auto-archive sweep.

use crate::task::domain::TaskLifecycleEngine;
use std::time::Duration as StdDuration;
use thiserror::Error;

/// Environment variable holding the auto-archive age in whole days.
pub const AUTO_ARCHIVE_DAYS_VAR: &str = "POLARIS_AUTO_ARCHIVE_DAYS";
/// Environment variable holding the sweep interval in whole seconds.
pub const SWEEP_INTERVAL_SECS_VAR: &str = "POLARIS_SWEEP_INTERVAL_SECS";

/// Errors returned while reading configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be parsed or is not positive.
    #[error("invalid value '{value}' for {key}, expected a positive integer")]
    InvalidValue {
        /// Configuration key.
        key: &'static str,
        /// Rejected raw value.
        value: String,
    },
}

/// Lifecycle configuration.
///
/// # Examples
///
/// ```
/// use polaris::task::config::LifecycleConfig;
///
/// let config = LifecycleConfig::default();
/// assert_eq!(config.auto_archive_after().num_days(), 30);
///
/// let eager = LifecycleConfig::default().with_auto_archive_after_days(7);
/// assert_eq!(eager.auto_archive_after().num_days(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    auto_archive_after: chrono::Duration,
    sweep_interval: StdDuration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            auto_archive_after: TaskLifecycleEngine::DEFAULT_AUTO_ARCHIVE_AFTER,
            sweep_interval: StdDuration::from_secs(60 * 60),
        }
    }
}

impl LifecycleConfig {
    /// Sets the age after which completed tasks are archived.
    #[must_use]
    pub const fn with_auto_archive_after_days(mut self, days: u32) -> Self {
        self.auto_archive_after = chrono::Duration::days(days as i64);
        self
    }

    /// Sets the pause between auto-archive sweeps.
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: StdDuration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Returns the auto-archive age.
    #[must_use]
    pub const fn auto_archive_after(&self) -> chrono::Duration {
        self.auto_archive_after
    }

    /// Returns the sweep interval.
    #[must_use]
    pub const fn sweep_interval(&self) -> StdDuration {
        self.sweep_interval
    }

    /// Builds the engine configured by this value.
    #[must_use]
    pub const fn engine(&self) -> TaskLifecycleEngine {
        TaskLifecycleEngine::new(self.auto_archive_after)
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable or non-positive
    /// values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable or non-positive
    /// values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(days) = parse_positive(&lookup, AUTO_ARCHIVE_DAYS_VAR)? {
            config = config.with_auto_archive_after_days(days);
        }
        if let Some(secs) = parse_positive(&lookup, SWEEP_INTERVAL_SECS_VAR)? {
            config = config.with_sweep_interval(StdDuration::from_secs(u64::from(secs)));
        }
        Ok(config)
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u32>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

//! # Configuration
//!
//! Immutable configuration for the data access core, loaded once at
//! initialization. Defaults are compiled in; the environment can override any
//! field through `CRM_DATA__`-prefixed variables
//! (e.g. `CRM_DATA__EXECUTOR__MAX_ATTEMPTS=5`).

use crate::error::{DataError, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry/backoff parameters for the resilient executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Total attempts per call, first try included. Unlimited retries are
    /// forbidden; this must be at least 1.
    pub max_attempts: u32,

    /// Initial backoff delay in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub max_delay_ms: u64,

    /// Exponential growth factor between attempts.
    pub backoff_multiplier: f64,

    /// Bounded random jitter as a fraction of the computed delay (0.0 - 1.0).
    pub jitter_factor: f64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl ExecutorConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Reject configurations the retry state machine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(DataError::Configuration(
                "executor.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(DataError::Configuration(format!(
                "executor.backoff_multiplier must be >= 1.0 (got {})",
                self.backoff_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(DataError::Configuration(format!(
                "executor.jitter_factor must be within 0.0..=1.0 (got {})",
                self.jitter_factor
            )));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(DataError::Configuration(format!(
                "executor.max_delay_ms ({}) must be >= base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        Ok(())
    }
}

/// Root configuration for the data access core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCoreConfig {
    pub executor: ExecutorConfig,
}

impl DataCoreConfig {
    /// Load configuration: compiled defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| DataError::Configuration(format!("invalid defaults: {e}")))?;

        let merged = Config::builder()
            .add_source(defaults)
            .add_source(Environment::with_prefix("CRM_DATA").separator("__"))
            .build()
            .map_err(|e| DataError::Configuration(format!("failed to read environment: {e}")))?;

        let parsed: Self = merged
            .try_deserialize()
            .map_err(|e| DataError::Configuration(format!("invalid configuration: {e}")))?;

        parsed.executor.validate()?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ExecutorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = ExecutorConfig {
            max_attempts: 0,
            ..ExecutorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DataError::Configuration(_))
        ));
    }

    #[test]
    fn jitter_outside_unit_interval_is_rejected() {
        let config = ExecutorConfig {
            jitter_factor: 1.5,
            ..ExecutorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn delay_ceiling_below_base_is_rejected() {
        let config = ExecutorConfig {
            base_delay_ms: 5000,
            max_delay_ms: 1000,
            ..ExecutorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

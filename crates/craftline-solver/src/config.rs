//! Solver configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A capacity was zero
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),
    /// Eviction fraction outside (0, 1]
    #[error("eviction_fraction must be in (0, 1], got {0}")]
    EvictionFraction(f64),
}

/// Long-lived solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Cached records before eviction kicks in
    pub cache_capacity: usize,
    /// Share of the cache evicted on overflow
    pub eviction_fraction: f64,
    /// Seconds after which every cached record is stale
    pub cache_max_age_secs: u64,
    /// Recipe count at which evaluation fans out
    pub parallel_threshold: usize,
    /// Items kept in the producing-recipe index
    pub producer_index_capacity: usize,
    /// Solves kept for the rolling average
    pub metrics_window: usize,
    /// Pending notifications kept before dropping
    pub event_capacity: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 10_000,
            eviction_fraction: 0.25,
            cache_max_age_secs: 300, // 5 minutes
            parallel_threshold: 100,
            producer_index_capacity: 4_096,
            metrics_window: 10,
            event_capacity: 256,
        }
    }
}

impl SolverConfig {
    /// Maximum cache entry age as a duration.
    #[must_use]
    pub const fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("cache_capacity"));
        }
        if self.producer_index_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("producer_index_capacity"));
        }
        if self.metrics_window == 0 {
            return Err(ConfigError::ZeroCapacity("metrics_window"));
        }
        if !(self.eviction_fraction > 0.0 && self.eviction_fraction <= 1.0) {
            return Err(ConfigError::EvictionFraction(self.eviction_fraction));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_max_age(), Duration::from_secs(300));
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero = SolverConfig {
            cache_capacity: 0,
            ..SolverConfig::default()
        };
        assert_eq!(
            zero.validate(),
            Err(ConfigError::ZeroCapacity("cache_capacity"))
        );

        let fraction = SolverConfig {
            eviction_fraction: 1.5,
            ..SolverConfig::default()
        };
        assert!(matches!(
            fraction.validate(),
            Err(ConfigError::EvictionFraction(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SolverConfig =
            serde_json::from_str(r#"{ "cache_capacity": 50 }"#).expect("parse");
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.parallel_threshold, 100);
    }
}

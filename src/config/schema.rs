//! Configuration schema
//!
//! All fields have defaults, so an empty document (or no file at all) yields
//! the stock 4-6 second cycle with latest-wins delivery.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::queue::DeliveryPolicy;

/// Default lower bound of the cycle duration, in milliseconds.
pub const DEFAULT_MIN_CYCLE_MS: u64 = 4000;

/// Default upper bound of the cycle duration, in milliseconds.
pub const DEFAULT_MAX_CYCLE_MS: u64 = 6000;

// ============================================================================
// Root Config
// ============================================================================

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalConfig {
    /// Cycle timing.
    pub cycle: CycleConfig,

    /// How the handoff queue delivers phase updates to waiters.
    pub delivery: DeliveryPolicy,

    /// Fixed RNG seed for reproducible cycle durations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SignalConfig {
    /// Returns a config with the given inclusive cycle range and otherwise
    /// default settings.
    #[must_use]
    pub fn with_cycle_ms(min_ms: u64, max_ms: u64) -> Self {
        Self {
            cycle: CycleConfig {
                min_ms,
                max_ms,
                ..CycleConfig::default()
            },
            ..Self::default()
        }
    }

    /// Sets the RNG seed.
    #[must_use]
    pub const fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the delivery policy.
    #[must_use]
    pub const fn delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }

    /// Sets the cycle draw policy.
    #[must_use]
    pub const fn draw(mut self, draw: CycleDraw) -> Self {
        self.cycle.draw = draw;
        self
    }

    /// Checks that the configuration describes a usable cycle.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero lower bound or an
    /// inverted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cycle.validate()
    }
}

// ============================================================================
// Cycle Config
// ============================================================================

/// When a fresh cycle duration is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDraw {
    /// Draw a new duration after every toggle.
    #[default]
    PerCycle,
    /// Draw once when the toggling activity starts and reuse it.
    Once,
}

/// Cycle timing bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    /// Inclusive lower bound in milliseconds.
    pub min_ms: u64,
    /// Inclusive upper bound in milliseconds.
    pub max_ms: u64,
    /// Draw policy.
    pub draw: CycleDraw,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min_ms: DEFAULT_MIN_CYCLE_MS,
            max_ms: DEFAULT_MAX_CYCLE_MS,
            draw: CycleDraw::default(),
        }
    }
}

impl CycleConfig {
    /// The inclusive range cycle durations are drawn from.
    #[must_use]
    pub const fn range_ms(&self) -> RangeInclusive<u64> {
        self.min_ms..=self.max_ms
    }

    /// Longest possible cycle.
    #[must_use]
    pub const fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cycle.min_ms".to_string(),
                value: self.min_ms.to_string(),
                expected: "a positive number of milliseconds".to_string(),
            });
        }
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvalidValue {
                field: "cycle.max_ms".to_string(),
                value: self.max_ms.to_string(),
                expected: format!("at least cycle.min_ms ({})", self.min_ms),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SignalConfig::default();
        assert_eq!(config.cycle.range_ms(), 4000..=6000);
        assert_eq!(config.cycle.draw, CycleDraw::PerCycle);
        assert_eq!(config.delivery, DeliveryPolicy::LatestWins);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config: SignalConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SignalConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r"
cycle:
  min_ms: 10
  max_ms: 20
  draw: once
delivery: fifo
seed: 7
";
        let config: SignalConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cycle.range_ms(), 10..=20);
        assert_eq!(config.cycle.draw, CycleDraw::Once);
        assert_eq!(config.delivery, DeliveryPolicy::Fifo);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_partial_cycle_keeps_defaults() {
        let config: SignalConfig = serde_yaml::from_str("cycle:\n  max_ms: 9000\n").unwrap();
        assert_eq!(config.cycle.min_ms, DEFAULT_MIN_CYCLE_MS);
        assert_eq!(config.cycle.max_ms, 9000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SignalConfig, _> = serde_yaml::from_str("colour: amber\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_min_rejected() {
        let err = SignalConfig::with_cycle_ms(0, 10).validate().unwrap_err();
        assert!(err.to_string().contains("cycle.min_ms"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = SignalConfig::with_cycle_ms(20, 10).validate().unwrap_err();
        assert!(err.to_string().contains("cycle.max_ms"));
    }

    #[test]
    fn test_degenerate_range_allowed() {
        assert!(SignalConfig::with_cycle_ms(15, 15).validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = SignalConfig::with_cycle_ms(1, 2)
            .seeded(3)
            .delivery(DeliveryPolicy::Fifo)
            .draw(CycleDraw::Once);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.delivery, DeliveryPolicy::Fifo);
        assert_eq!(config.cycle.draw, CycleDraw::Once);
        assert_eq!(config.cycle.max_duration(), Duration::from_millis(2));
    }
}

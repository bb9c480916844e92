//! Signal phase value
//!
//! A [`Phase`] is an immutable two-valued state. Toggling produces a new
//! value; nothing mutates a phase in place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The two-valued signal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Stop. Every controller starts here.
    #[default]
    Red,
    /// Go.
    Green,
}

impl Phase {
    /// Returns the opposite phase.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red,
        }
    }

    /// Returns `true` for [`Phase::Green`].
    #[must_use]
    pub const fn is_green(self) -> bool {
        matches!(self, Self::Green)
    }

    /// Lowercase name, also used as a metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
        }
    }

    /// Numeric encoding for the current-phase gauge (red = 0, green = 1).
    #[must_use]
    pub const fn as_gauge(self) -> f64 {
        match self {
            Self::Red => 0.0,
            Self::Green => 1.0,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            _ => Err(ConfigError::InvalidValue {
                field: "phase".to_string(),
                value: s.to_string(),
                expected: "'red' or 'green'".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_red() {
        assert_eq!(Phase::default(), Phase::Red);
    }

    #[test]
    fn test_toggle_alternates() {
        let mut phase = Phase::Red;
        let mut seen = Vec::new();
        for _ in 0..4 {
            phase = phase.toggled();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![Phase::Green, Phase::Red, Phase::Green, Phase::Red]
        );
    }

    #[test]
    fn test_double_toggle_is_identity() {
        assert_eq!(Phase::Red.toggled().toggled(), Phase::Red);
        assert_eq!(Phase::Green.toggled().toggled(), Phase::Green);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Phase::Green.to_string(), "green");
        assert_eq!("RED".parse::<Phase>().unwrap(), Phase::Red);
        assert_eq!(" green ".parse::<Phase>().unwrap(), Phase::Green);
        assert!("amber".parse::<Phase>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Phase::Green).unwrap();
        assert_eq!(json, "\"green\"");
        let back: Phase = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(back, Phase::Red);
    }

    #[test]
    fn test_gauge_encoding() {
        assert!(Phase::Red.as_gauge() < 0.5);
        assert!(Phase::Green.as_gauge() > 0.5);
        assert!(Phase::Green.is_green());
        assert!(!Phase::Red.is_green());
    }
}

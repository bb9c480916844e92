//! Error types for `signalbox`
//!
//! The core primitive has almost no failure modes. Errors here cover the
//! controller lifecycle, configuration loading, and the CLI driver.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `signalbox` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Controller lifecycle error (double start, closed queue)
    pub const SIGNAL_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `signalbox` operations.
#[derive(Debug, Error)]
pub enum SignalError {
    /// `simulate()` was called on a controller that already started its
    /// toggling activity.
    #[error("toggling activity already started for this controller")]
    AlreadyStarted,

    /// The queue was closed while (or before) a receiver waited on it.
    #[error("handoff queue closed")]
    Closed,

    /// A toggler or consumer thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A run was stopped early by SIGINT (Ctrl+C)
    #[error("interrupted")]
    Interrupted,

    /// A run was stopped early by SIGTERM
    #[error("terminated")]
    Terminated,

    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Metrics recorder installation failed
    #[error("metrics error: {0}")]
    Metrics(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SignalError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::AlreadyStarted | Self::Closed => ExitCode::SIGNAL_ERROR,
            Self::Spawn(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Metrics(_) => ExitCode::ERROR,
            Self::Interrupted => ExitCode::INTERRUPTED,
            Self::Terminated => ExitCode::TERMINATED,
        }
    }

    /// Whether this error only records that a shutdown signal ended the run.
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        matches!(self, Self::Interrupted | Self::Terminated)
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `signalbox` operations.
pub type Result<T> = std::result::Result<T, SignalError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::SIGNAL_ERROR, 5);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_lifecycle_errors_exit_code() {
        assert_eq!(
            SignalError::AlreadyStarted.exit_code(),
            ExitCode::SIGNAL_ERROR
        );
        assert_eq!(SignalError::Closed.exit_code(), ExitCode::SIGNAL_ERROR);
    }

    #[test]
    fn test_shutdown_errors_exit_code() {
        assert_eq!(SignalError::Interrupted.exit_code(), ExitCode::INTERRUPTED);
        assert_eq!(SignalError::Terminated.exit_code(), ExitCode::TERMINATED);
        assert!(SignalError::Terminated.is_shutdown());
        assert!(!SignalError::Closed.is_shutdown());
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: SignalError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: SignalError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("signal.yaml"),
            message: "unexpected token".to_string(),
        };
        assert!(err.to_string().contains("signal.yaml"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "cycle.min_ms".to_string(),
            value: "0".to_string(),
            expected: "a positive number of milliseconds".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for 'cycle.min_ms': got '0', expected a positive number of milliseconds"
        );
    }
}

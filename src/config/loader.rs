//! Configuration loader
//!
//! Reads a YAML file, deserializes it into [`SignalConfig`], and validates
//! the result.

use std::path::Path;

use crate::config::schema::SignalConfig;
use crate::error::ConfigError;

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns `ConfigError::MissingFile` if the file does not exist,
/// `ConfigError::ParseError` for unreadable or malformed YAML, and
/// `ConfigError::InvalidValue` if validation fails.
pub fn load(path: &Path) -> Result<SignalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;

    let config = parse(&raw, path)?;
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        min_ms = config.cycle.min_ms,
        max_ms = config.cycle.max_ms,
        "configuration loaded"
    );
    Ok(config)
}

fn parse(raw: &str, path: &Path) -> Result<SignalConfig, ConfigError> {
    // An empty file is a valid all-defaults config; serde_yaml rejects it.
    if raw.trim().is_empty() {
        return Ok(SignalConfig::default());
    }
    serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::config::CycleDraw;
    use crate::queue::DeliveryPolicy;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_config("cycle:\n  min_ms: 5\n  max_ms: 8\n  draw: once\ndelivery: fifo\n");
        let config = load(file.path()).unwrap();
        assert_eq!(config.cycle.range_ms(), 5..=8);
        assert_eq!(config.cycle.draw, CycleDraw::Once);
        assert_eq!(config.delivery, DeliveryPolicy::Fifo);
    }

    #[test]
    fn test_load_empty_file_is_default() {
        let file = write_config("");
        assert_eq!(load(file.path()).unwrap(), SignalConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/signal.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let file = write_config("cycle: [1, 2\n");
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_runs_validation() {
        let file = write_config("cycle:\n  min_ms: 9\n  max_ms: 3\n");
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}

//! `validate` command
//!
//! Loads each configuration file and reports whether it is usable.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config;
use crate::error::{ConfigError, SignalError};

#[derive(Debug, Serialize)]
struct Report<'a> {
    path: &'a Path,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate configuration files.
///
/// Every file is checked and reported before returning.
///
/// # Errors
///
/// Returns the last configuration error encountered, or a JSON error if
/// the report cannot be serialized.
pub fn run(args: &ValidateArgs) -> Result<(), SignalError> {
    let mut reports = Vec::with_capacity(args.files.len());
    let mut failure: Option<ConfigError> = None;

    for path in args.files.iter().map(PathBuf::as_path) {
        match config::load(path) {
            Ok(_) => reports.push(Report {
                path,
                valid: true,
                error: None,
            }),
            Err(e) => {
                reports.push(Report {
                    path,
                    valid: false,
                    error: Some(e.to_string()),
                });
                failure = Some(e);
            }
        }
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                match &report.error {
                    None => println!("ok: {}", report.path.display()),
                    Some(e) => println!("invalid: {}: {e}", report.path.display()),
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    failure.map_or(Ok(()), |e| Err(e.into()))
}

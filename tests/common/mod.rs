//! Shared helpers for CLI end-to-end tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};

/// Runs the `signalbox` binary with `args` and waits for it to exit.
pub fn run_signalbox(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_signalbox"))
        .args(args)
        .env_remove("SIGNALBOX_CONFIG")
        .env_remove("SIGNALBOX_LOG_LEVEL")
        .output()
        .expect("failed to run signalbox binary")
}

/// Starts the `signalbox` binary with `args` and piped output without
/// waiting for it.
pub fn spawn_signalbox(args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_signalbox"))
        .args(args)
        .env_remove("SIGNALBOX_CONFIG")
        .env_remove("SIGNALBOX_LOG_LEVEL")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start signalbox binary")
}

/// Absolute path to a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Fixture path as a `&str`-friendly `String`.
pub fn fixture(name: &str) -> String {
    fixture_path(name)
        .to_str()
        .expect("non-UTF-8 fixture path")
        .to_string()
}

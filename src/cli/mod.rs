//! Command-line interface
//!
//! Argument definitions and command handlers for the `signalbox` binary.

pub mod args;
pub mod commands;

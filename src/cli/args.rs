//! CLI argument definitions
//!
//! All Clap derive structs for `signalbox` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::queue::DeliveryPolicy;

// ============================================================================
// Root CLI
// ============================================================================

/// Simulated traffic signal driven by a blocking handoff queue.
#[derive(Parser, Debug)]
#[command(name = "signalbox", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SIGNALBOX_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: OutputFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a signal with consumer threads waiting for green.
    Run(RunArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run / Validate
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "SIGNALBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of consumer threads calling `wait_for_green`.
    #[arg(long, default_value_t = 2)]
    pub consumers: usize,

    /// Stop after this long (e.g. `30s`, `2m`). Runs until Ctrl+C if unset.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// How long a consumer takes to cross once it sees green.
    #[arg(long, default_value = "500ms", value_parser = humantime::parse_duration)]
    pub crossing: Duration,

    /// Override the lower cycle bound in milliseconds.
    #[arg(long)]
    pub min_cycle_ms: Option<u64>,

    /// Override the upper cycle bound in milliseconds.
    #[arg(long)]
    pub max_cycle_ms: Option<u64>,

    /// Override the RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the handoff queue delivery policy.
    #[arg(long)]
    pub delivery: Option<DeliveryArg>,

    /// Serve Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, env = "SIGNALBOX_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Delivery policy override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeliveryArg {
    /// Coalesce to the newest phase.
    LatestWins,
    /// Deliver every phase in order.
    Fifo,
}

impl From<DeliveryArg> for DeliveryPolicy {
    fn from(arg: DeliveryArg) -> Self {
        match arg {
            DeliveryArg::LatestWins => Self::LatestWins,
            DeliveryArg::Fifo => Self::Fifo,
        }
    }
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

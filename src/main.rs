//! `signalbox` - simulated traffic signal driver

use clap::Parser;

use signalbox::cli::args::{Cli, OutputFormat};
use signalbox::cli::commands;
use signalbox::error::ExitCode;
use signalbox::observability::{LogFormat, LogSettings, init_logging};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // `--help` and `--version` also arrive here and are not failures.
            let code = if e.use_stderr() {
                ExitCode::USAGE_ERROR
            } else {
                ExitCode::SUCCESS
            };
            if let Err(io) = e.print() {
                eprintln!("error: {io}");
            }
            std::process::exit(code);
        }
    };

    if !cli.quiet {
        let format = match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        };
        init_logging(&LogSettings::new(format, cli.verbose, cli.color));
    }

    let result = commands::dispatch(cli).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) if e.is_shutdown() => std::process::exit(e.exit_code()),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

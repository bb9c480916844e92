//! Log output for signal runs.
//!
//! A run has one toggling thread and any number of consumer threads, all
//! logging at once. Threads carry stable names so interleaved lines can be
//! told apart: [`TOGGLER_THREAD`] for the toggler and
//! [`consumer_thread_name`] for each consumer.
//!
//! Verbosity raises this crate's level one step ahead of dependencies, and
//! `SIGNALBOX_LOG_LEVEL` replaces the whole filter when set.

use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::cli::args::ColorChoice;

/// Environment variable that replaces the verbosity-derived filter.
pub const LOG_LEVEL_ENV: &str = "SIGNALBOX_LOG_LEVEL";

/// Name of the thread that flips the phase.
pub const TOGGLER_THREAD: &str = "signal-toggler";

/// Name of the thread driving consumer `id`.
#[must_use]
pub fn consumer_thread_name(id: usize) -> String {
    format!("consumer-{id}")
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Resolved subscriber settings for one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Output format
    pub format: LogFormat,
    /// Number of `-v` flags
    pub verbosity: u8,
    /// Whether to emit ANSI colors (human format only)
    pub ansi: bool,
}

impl LogSettings {
    /// Resolves settings from the CLI flags, checking the terminal and
    /// `NO_COLOR` for [`ColorChoice::Auto`].
    #[must_use]
    pub fn new(format: LogFormat, verbosity: u8, color: ColorChoice) -> Self {
        let ansi = match color {
            ColorChoice::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Self {
            format,
            verbosity,
            ansi,
        }
    }

    /// Filter directive for the verbosity level.
    ///
    /// Phase transitions log at info, so `-v` is enough to watch the signal
    /// without dependency noise.
    #[must_use]
    pub const fn directive(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "warn,signalbox=info",
            2 => "info,signalbox=debug",
            _ => "debug,signalbox=trace",
        }
    }

    /// Whether lines carry the emitting thread's name.
    ///
    /// Always on for JSON. For human output, once transitions are visible
    /// (`-v`), since that is when toggler and consumer lines interleave.
    #[must_use]
    pub const fn thread_names(&self) -> bool {
        matches!(self.format, LogFormat::Json) || self.verbosity >= 1
    }

    /// Whether lines carry the module target.
    #[must_use]
    pub const fn targets(&self) -> bool {
        self.verbosity >= 2
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

/// Builds a subscriber for `settings` writing to `writer`.
pub fn build_subscriber<W>(settings: &LogSettings, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter())
        .with_target(settings.targets())
        .with_thread_names(settings.thread_names())
        .with_writer(writer);

    match settings.format {
        LogFormat::Human => Box::new(builder.with_ansi(settings.ansi).finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// A second call keeps the first subscriber.
pub fn init_logging(settings: &LogSettings) {
    if tracing::subscriber::set_global_default(build_subscriber(settings, std::io::stderr)).is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `emit` on a thread named `thread_name` under a subscriber built
    /// from `settings` and returns what it wrote.
    fn capture_on<F>(settings: LogSettings, thread_name: String, emit: F) -> String
    where
        F: FnOnce() + Send + 'static,
    {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = build_subscriber(&settings, move || writer.clone());

        thread::Builder::new()
            .name(thread_name)
            .spawn(move || tracing::subscriber::with_default(subscriber, emit))
            .unwrap()
            .join()
            .unwrap();

        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn settings(format: LogFormat, verbosity: u8) -> LogSettings {
        LogSettings {
            format,
            verbosity,
            ansi: false,
        }
    }

    #[test]
    fn consumer_names_are_distinct() {
        assert_eq!(consumer_thread_name(0), "consumer-0");
        assert_ne!(consumer_thread_name(1), consumer_thread_name(2));
        assert_ne!(consumer_thread_name(0), TOGGLER_THREAD);
    }

    #[test]
    fn verbosity_scopes_crate_ahead_of_dependencies() {
        assert_eq!(settings(LogFormat::Human, 0).directive(), "warn");
        assert_eq!(settings(LogFormat::Human, 1).directive(), "warn,signalbox=info");
        assert_eq!(settings(LogFormat::Human, 2).directive(), "info,signalbox=debug");
        assert_eq!(settings(LogFormat::Human, 9).directive(), "debug,signalbox=trace");
    }

    #[test]
    fn thread_names_follow_format_and_verbosity() {
        assert!(!settings(LogFormat::Human, 0).thread_names());
        assert!(settings(LogFormat::Human, 1).thread_names());
        assert!(settings(LogFormat::Json, 0).thread_names());
    }

    #[test]
    fn never_disables_ansi() {
        assert!(!LogSettings::new(LogFormat::Human, 0, ColorChoice::Never).ansi);
        assert!(LogSettings::new(LogFormat::Human, 0, ColorChoice::Always).ansi);
    }

    #[test]
    fn human_lines_name_the_toggler() {
        let out = capture_on(settings(LogFormat::Human, 1), TOGGLER_THREAD.to_string(), || {
            tracing::info!(from = "red", to = "green", "phase transition");
        });
        assert!(out.contains(TOGGLER_THREAD), "{out}");
        assert!(out.contains("phase transition"), "{out}");
    }

    #[test]
    fn json_lines_name_the_consumer() {
        let out = capture_on(settings(LogFormat::Json, 0), consumer_thread_name(3), || {
            tracing::warn!(crossings = 1, "consumer lagging");
        });
        let line: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(line["threadName"], "consumer-3");
        assert_eq!(line["fields"]["message"], "consumer lagging");
    }

    #[test]
    fn quiet_verbosity_drops_info() {
        let out = capture_on(settings(LogFormat::Human, 0), consumer_thread_name(0), || {
            tracing::info!("green observed");
        });
        assert!(out.is_empty(), "{out}");
    }

    #[test]
    fn init_logging_twice_does_not_panic() {
        let s = settings(LogFormat::Human, 0);
        init_logging(&s);
        init_logging(&s);
    }
}

//! Observability module
//!
//! Logging and metrics infrastructure for watching signal controllers.

pub mod logging;
pub mod metrics;

pub use logging::{
    LogFormat, LogSettings, TOGGLER_THREAD, consumer_thread_name, init_logging,
};
pub use metrics::init_metrics;

//! Metrics collection for `signalbox`.
//!
//! Prometheus-compatible metrics recorded through the `metrics` facade.
//! Without an installed recorder every call here is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::SignalError;
use crate::phase::Phase;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// The HTTP listener needs a running Tokio runtime.
///
/// # Errors
///
/// Returns `SignalError::Metrics` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SignalError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SignalError::Metrics(e.to_string()))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "signalbox_phase_transitions_total",
        "Total number of phase transitions"
    );
    describe_gauge!(
        "signalbox_current_phase",
        "Current phase of the most recently toggled signal (0 = red, 1 = green)"
    );
    describe_histogram!(
        "signalbox_cycle_duration_ms",
        "Drawn cycle duration in milliseconds"
    );
    describe_histogram!(
        "signalbox_green_wait_ms",
        "Time consumers spent blocked in wait_for_green, in milliseconds"
    );
}

/// Records a completed toggle into `to` after a cycle of `cycle`.
pub fn record_transition(to: Phase, cycle: Duration) {
    counter!("signalbox_phase_transitions_total", "to" => to.as_str()).increment(1);
    gauge!("signalbox_current_phase").set(to.as_gauge());
    histogram!("signalbox_cycle_duration_ms").record(cycle.as_secs_f64() * 1000.0);
}

/// Records how long a consumer waited for green.
pub fn record_green_wait(waited: Duration) {
    histogram!("signalbox_green_wait_ms").record(waited.as_secs_f64() * 1000.0);
}

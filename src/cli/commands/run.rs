//! `run` command
//!
//! Starts one controller, attaches consumer threads that repeatedly wait for
//! green and "cross", and shuts everything down on a deadline or signal.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::cli::args::RunArgs;
use crate::config::{self, SignalConfig};
use crate::controller::PhaseController;
use crate::error::SignalError;
use crate::observability::consumer_thread_name;

/// Run a signal until `--duration` elapses or the process is interrupted.
///
/// # Errors
///
/// Returns a config error if the configuration cannot be loaded or the
/// overrides produce an invalid cycle, or a metrics error if the
/// Prometheus listener cannot be started.
pub async fn run(args: &RunArgs) -> Result<(), SignalError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let config = resolve_config(args)?;
    tracing::info!(
        min_ms = config.cycle.min_ms,
        max_ms = config.cycle.max_ms,
        draw = ?config.cycle.draw,
        delivery = ?config.delivery,
        consumers = args.consumers,
        "starting signal"
    );

    let controller = Arc::new(PhaseController::with_config(config)?);
    controller.simulate()?;

    // Consumers block for the whole run, so they get their own threads
    // rather than holding slots in the runtime's blocking pool.
    let mut consumers = Vec::with_capacity(args.consumers);
    for id in 0..args.consumers {
        let c = Arc::clone(&controller);
        let crossing = args.crossing;
        let spawned = thread::Builder::new()
            .name(consumer_thread_name(id))
            .spawn(move || drive_consumer(id, &c, crossing));
        match spawned {
            Ok(handle) => consumers.push(handle),
            Err(e) => {
                controller.stop();
                join_consumers(consumers);
                return Err(SignalError::Spawn(e));
            }
        }
    }

    let outcome = match args.duration {
        Some(limit) => {
            tokio::select! {
                () = tokio::time::sleep(limit) => {
                    tracing::info!(?limit, "run duration elapsed");
                    Ok(())
                }
                reason = shutdown_signal() => Err(reason),
            }
        }
        None => Err(shutdown_signal().await),
    };

    // `stop` only joins the toggler, which wakes at once on cancel.
    controller.stop();
    let crossings = tokio::task::spawn_blocking(move || join_consumers(consumers))
        .await
        .map_err(|e| SignalError::Io(std::io::Error::other(e)))?;

    tracing::info!(
        transitions = controller.transitions(),
        crossings,
        final_phase = %controller.current_phase(),
        "signal stopped"
    );
    outcome
}

fn join_consumers(consumers: Vec<JoinHandle<u64>>) -> u64 {
    let mut crossings = 0u64;
    for handle in consumers {
        match handle.join() {
            Ok(n) => crossings += n,
            Err(_) => tracing::warn!("consumer thread panicked"),
        }
    }
    crossings
}

/// Builds the effective config: file (or defaults) plus CLI overrides.
fn resolve_config(args: &RunArgs) -> Result<SignalConfig, SignalError> {
    let mut config = match args.config {
        Some(ref path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            config::load(path)?
        }
        None => SignalConfig::default(),
    };

    if let Some(min_ms) = args.min_cycle_ms {
        config.cycle.min_ms = min_ms;
    }
    if let Some(max_ms) = args.max_cycle_ms {
        config.cycle.max_ms = max_ms;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(delivery) = args.delivery {
        config.delivery = delivery.into();
    }

    config.validate()?;
    Ok(config)
}

/// Consumer loop: wait for green, spend `crossing` crossing, repeat until the
/// controller stops. Returns the number of crossings made.
///
/// A consumer crosses at most once per green phase. If the signal is still
/// in the green it already crossed on, it waits for the next one.
fn drive_consumer(id: usize, controller: &PhaseController, crossing: Duration) -> u64 {
    let mut crossings = 0u64;
    let mut crossed_on = None;
    loop {
        let waited = if crossed_on == Some(controller.transitions()) {
            controller.wait_for_next_green()
        } else {
            controller.wait_for_green()
        };
        if waited.is_err() {
            break;
        }
        crossed_on = Some(controller.transitions());
        crossings += 1;
        tracing::debug!(consumer = id, crossings, "green observed, crossing");
        thread::sleep(crossing);
    }
    tracing::debug!(consumer = id, crossings, "consumer finished");
    crossings
}

/// Waits for Ctrl+C, or pends forever if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to register Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM, with the matching error.
async fn shutdown_signal() -> SignalError {
    #[cfg(unix)]
    let reason = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                () = ctrl_c() => SignalError::Interrupted,
                _ = sigterm.recv() => SignalError::Terminated,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            ctrl_c().await;
            SignalError::Interrupted
        }
    };
    #[cfg(not(unix))]
    let reason = {
        ctrl_c().await;
        SignalError::Interrupted
    };
    eprintln!("\nShutting down gracefully...");
    reason
}

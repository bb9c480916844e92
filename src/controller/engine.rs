//! Phase controller orchestration
//!
//! The `PhaseController` coordinates the phase cell, the toggling thread,
//! and the handoff queue consumers block on.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SignalConfig;
use crate::error::{ConfigError, SignalError};
use crate::observability::TOGGLER_THREAD;
use crate::observability::metrics;
use crate::phase::Phase;
use crate::queue::{DeliveryPolicy, HandoffQueue};

use super::cancel::StopSignal;
use super::cycle::CycleClock;

/// State shared between the controller and its toggling thread.
#[derive(Debug)]
struct Shared {
    /// Canonical phase; written only by the toggler
    phase: Mutex<Phase>,
    /// Phase updates for `wait_for_green` callers
    queue: HandoffQueue<Phase>,
    /// Cancellation for the toggler
    stop: StopSignal,
    /// Number of toggles so far
    transitions: AtomicU64,
}

impl Shared {
    fn current(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn toggle(&self) -> (Phase, Phase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *phase;
        let to = from.toggled();
        *phase = to;
        drop(phase);
        self.transitions.fetch_add(1, Ordering::SeqCst);
        (from, to)
    }

    /// Short-circuit for consumers arriving during green.
    ///
    /// Only used with latest-wins delivery, where the backlog is discarded
    /// and a consumer would otherwise wait out the rest of the green phase
    /// and the whole red one. FIFO consumers see the queued green instead.
    fn green_now(&self) -> Option<Phase> {
        if self.queue.policy() != DeliveryPolicy::LatestWins {
            return None;
        }
        self.current().is_green().then_some(Phase::Green)
    }
}

/// Two-phase signal whose phase flips at randomized intervals on a
/// background thread.
///
/// Starts red. Call [`simulate`](Self::simulate) once to start toggling;
/// [`stop`](Self::stop) (or dropping the controller) cancels and joins the
/// toggling thread and wakes any blocked consumers.
pub struct PhaseController {
    shared: Arc<Shared>,
    config: SignalConfig,
    started: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PhaseController {
    /// Creates a red controller with the default 4-6 second cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::build(SignalConfig::default())
    }

    /// Creates a red controller with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the configuration fails
    /// validation.
    pub fn with_config(config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SignalConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Red),
                queue: HandoffQueue::new(config.delivery),
                stop: StopSignal::new(),
                transitions: AtomicU64::new(0),
            }),
            config,
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Returns the controller's configuration.
    #[must_use]
    pub const fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Returns the current phase without blocking beyond a brief lock.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.shared.current()
    }

    /// Number of toggles performed so far.
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.shared.transitions.load(Ordering::SeqCst)
    }

    /// Returns whether the toggling thread has been started and not stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.shared.stop.is_cancelled()
    }

    /// Starts the toggling activity on its own thread and returns at once.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::AlreadyStarted`] on a second call,
    /// [`SignalError::Closed`] after [`stop`](Self::stop), and
    /// [`SignalError::Spawn`] if the OS refuses the thread.
    pub fn simulate(&self) -> Result<(), SignalError> {
        // Held across the spawn so a concurrent `stop` either sees no start
        // or finds the handle to join.
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.stop.is_cancelled() {
            return Err(SignalError::Closed);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SignalError::AlreadyStarted);
        }

        let shared = Arc::clone(&self.shared);
        let clock = CycleClock::new(&self.config.cycle, self.config.seed);
        let spawned = thread::Builder::new()
            .name(TOGGLER_THREAD.to_string())
            .spawn(move || cycle_through_phases(&shared, clock));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                Err(SignalError::Spawn(e))
            }
        }
    }

    /// Blocks until this consumer observes green.
    ///
    /// With latest-wins delivery this returns immediately if the signal is
    /// already green and otherwise waits for the next transition to green.
    /// With FIFO delivery it consumes queued phases in order until a green
    /// one arrives.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the controller is stopped while
    /// waiting.
    pub fn wait_for_green(&self) -> Result<(), SignalError> {
        let started = Instant::now();
        loop {
            let phase = self
                .shared
                .queue
                .receive_or_else(|| self.shared.green_now())?;
            if phase.is_green() {
                metrics::record_green_wait(started.elapsed());
                return Ok(());
            }
        }
    }

    /// Blocks until the next transition to green, ignoring a green phase
    /// already in progress.
    ///
    /// Used by consumers that have already acted on the current green.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the controller is stopped while
    /// waiting.
    pub fn wait_for_next_green(&self) -> Result<(), SignalError> {
        let started = Instant::now();
        while !self.shared.queue.receive()?.is_green() {}
        metrics::record_green_wait(started.elapsed());
        Ok(())
    }

    /// Like [`wait_for_green`](Self::wait_for_green), giving up after
    /// `timeout`. Returns `Ok(false)` on timeout. A `timeout` too large to
    /// express as an `Instant` waits without bound.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the controller is stopped while
    /// waiting.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> Result<bool, SignalError> {
        let started = Instant::now();
        let Some(deadline) = started.checked_add(timeout) else {
            return self.wait_for_green().map(|()| true);
        };
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self
                .shared
                .queue
                .receive_timeout_or_else(remaining, || self.shared.green_now())?
            {
                Some(phase) if phase.is_green() => {
                    metrics::record_green_wait(started.elapsed());
                    return Ok(true);
                }
                Some(_) => {}
                None => return Ok(false),
            }
        }
    }

    /// Cancels the toggling thread, joins it, and closes the handoff queue.
    ///
    /// Consumers blocked in `wait_for_green` return
    /// [`SignalError::Closed`]. Calling `stop` again is a no-op.
    pub fn stop(&self) {
        if self.shared.stop.is_cancelled() {
            return;
        }
        self.shared.stop.cancel();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("toggling thread panicked");
            }
        }

        self.shared.queue.close();
        debug!(transitions = self.transitions(), "controller stopped");
    }
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PhaseController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PhaseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseController")
            .field("current_phase", &self.current_phase())
            .field("transitions", &self.transitions())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Toggling activity body.
///
/// Sleeps until the next deadline (or cancellation), flips the phase,
/// publishes it, and draws the next cycle.
fn cycle_through_phases(shared: &Shared, mut clock: CycleClock) {
    let mut cycle = clock.next_cycle();
    let mut deadline = Instant::now() + cycle;
    debug!(?cycle, "toggling activity started");

    while !shared.stop.sleep_until(deadline) {
        let (from, to) = shared.toggle();
        shared.queue.send(to);
        metrics::record_transition(to, cycle);
        info!(%from, %to, ?cycle, "phase transition");

        cycle = clock.next_cycle();
        deadline = Instant::now() + cycle;
    }

    debug!("toggling activity cancelled");
}

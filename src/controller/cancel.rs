//! Cancellation for the toggling thread.
//!
//! A flag behind a mutex plus a condvar, so the toggler can sleep until its
//! next deadline and still wake immediately on `cancel()`.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Cancellation token shared between the controller and its toggling thread.
#[derive(Debug, Default)]
pub struct StopSignal {
    cancelled: Mutex<bool>,
    changed: Condvar,
}

impl StopSignal {
    /// Creates an uncancelled signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests cancellation and wakes any sleeper.
    pub fn cancel(&self) {
        *self.flag() = true;
        self.changed.notify_all();
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Sleeps until `deadline` or cancellation, whichever comes first.
    ///
    /// Returns `true` if cancelled. Spurious wakeups resume the wait.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        let mut cancelled = self.flag();
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            cancelled = self
                .changed
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

//! Blocking handoff queue
//!
//! A `Mutex<VecDeque<T>>` paired with a `Condvar`. Producers append and
//! wake one waiter; consumers block until a value is available.
//!
//! Two delivery policies are supported:
//!
//! - [`DeliveryPolicy::LatestWins`] discards the backlog when a receive
//!   begins and then returns the newest value sent after the wait started.
//!   Only the most recent state matters to consumers of this policy, so a
//!   receiver may miss intermediate values.
//! - [`DeliveryPolicy::Fifo`] delivers every value in send order.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::SignalError;

/// How [`HandoffQueue::receive`] picks the value it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Clear the backlog, wait for a fresh send, return the newest value.
    #[default]
    LatestWins,
    /// Return the oldest queued value; block only when empty.
    Fifo,
}

#[derive(Debug)]
struct Slots<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Thread-safe blocking handoff queue.
///
/// All mutation of the underlying sequence happens while holding the
/// queue's lock. Receivers release the lock while blocked.
#[derive(Debug)]
pub struct HandoffQueue<T> {
    slots: Mutex<Slots<T>>,
    available: Condvar,
    policy: DeliveryPolicy,
}

impl<T> HandoffQueue<T> {
    /// Creates an empty queue with the given delivery policy.
    #[must_use]
    pub const fn new(policy: DeliveryPolicy) -> Self {
        Self {
            slots: Mutex::new(Slots {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
            policy,
        }
    }

    /// Returns the delivery policy.
    #[must_use]
    pub const fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    // Every critical section leaves `Slots` consistent, so a poisoned
    // guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `value` and wakes one waiting receiver.
    ///
    /// Never blocks beyond the critical section. Values sent after
    /// [`close`](Self::close) are dropped.
    pub fn send(&self, value: T) {
        let mut slots = self.lock();
        if slots.closed {
            trace!("send on closed handoff queue dropped");
            return;
        }
        slots.items.push_back(value);
        drop(slots);
        self.available.notify_one();
    }

    /// Blocks until a value is available and returns it.
    ///
    /// Under [`DeliveryPolicy::LatestWins`] any queued values are discarded
    /// first, so the returned value is always one sent after the call began.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the queue is closed before a value
    /// arrives.
    pub fn receive(&self) -> Result<T, SignalError> {
        self.receive_or_else(|| None)
    }

    /// Like [`receive`](Self::receive), but consults `ready` once, after the
    /// backlog is discarded and before blocking, while the queue lock is
    /// held. If `ready` yields a value it is returned immediately.
    ///
    /// A producer that updates shared state before calling `send` cannot
    /// slip between that check and the wait: its send needs the lock.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the queue is closed before a value
    /// arrives.
    pub fn receive_or_else<F>(&self, ready: F) -> Result<T, SignalError>
    where
        F: FnOnce() -> Option<T>,
    {
        let mut slots = self.begin_receive();
        if slots.closed {
            return Err(SignalError::Closed);
        }
        if let Some(value) = ready() {
            return Ok(value);
        }
        slots = self
            .available
            .wait_while(slots, |s| s.items.is_empty() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        self.take(&mut slots).ok_or(SignalError::Closed)
    }

    /// Like [`receive`](Self::receive), giving up after `timeout`.
    ///
    /// Returns `Ok(None)` when the deadline passes without a value.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the queue is closed before a value
    /// arrives.
    pub fn receive_timeout(&self, timeout: Duration) -> Result<Option<T>, SignalError> {
        self.receive_timeout_or_else(timeout, || None)
    }

    /// Bounded counterpart of [`receive_or_else`](Self::receive_or_else).
    ///
    /// A `timeout` too large to express as an `Instant` waits without bound.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Closed`] if the queue is closed before a value
    /// arrives.
    pub fn receive_timeout_or_else<F>(
        &self,
        timeout: Duration,
        ready: F,
    ) -> Result<Option<T>, SignalError>
    where
        F: FnOnce() -> Option<T>,
    {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.receive_or_else(ready).map(Some);
        };
        let mut slots = self.begin_receive();
        if slots.closed {
            return Err(SignalError::Closed);
        }
        if let Some(value) = ready() {
            return Ok(Some(value));
        }
        loop {
            if let Some(value) = self.take(&mut slots) {
                return Ok(Some(value));
            }
            if slots.closed {
                return Err(SignalError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            slots = self
                .available
                .wait_timeout(slots, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Marks the queue closed and wakes every blocked receiver.
    pub fn close(&self) {
        let mut slots = self.lock();
        slots.closed = true;
        drop(slots);
        self.available.notify_all();
    }

    /// Returns whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of values currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    fn begin_receive(&self) -> MutexGuard<'_, Slots<T>> {
        let mut slots = self.lock();
        if self.policy == DeliveryPolicy::LatestWins && !slots.items.is_empty() {
            trace!(discarded = slots.items.len(), "discarding stale values");
            slots.items.clear();
        }
        slots
    }

    fn take(&self, slots: &mut Slots<T>) -> Option<T> {
        match self.policy {
            DeliveryPolicy::LatestWins => slots.items.pop_back(),
            DeliveryPolicy::Fifo => slots.items.pop_front(),
        }
    }
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new(DeliveryPolicy::default())
    }
}

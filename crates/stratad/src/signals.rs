//! Lifecycle notifications published by a launched engine.
//!
//! A running engine owns an [`EngineSignals`] value and fires three kinds of
//! notification through it: a one-shot readiness signal, a one-shot
//! termination signal, and a stream of asynchronous errors. The bootstrap
//! sequence only ever observes these signals; it never fires them.
//!
//! Every notification is stamped with a monotonically increasing sequence
//! number so observers can tell which of two signals fired first even when
//! both are visible by the time they wake.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use thiserror::Error;

/// Error reported by an engine after a successful launch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Builds an error from a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Shared notification channels between an engine and its observers.
///
/// Cloning produces another handle onto the same channels.
#[derive(Debug, Clone, Default)]
pub struct EngineSignals {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<SignalState>,
    changed: Condvar,
}

#[derive(Debug, Default)]
pub(crate) struct SignalState {
    sequence: u64,
    ready_at: Option<u64>,
    stopped_at: Option<u64>,
    errors: VecDeque<EngineError>,
}

impl SignalState {
    /// Sequence stamp of the readiness notification, if it fired.
    pub(crate) fn ready_at(&self) -> Option<u64> {
        self.ready_at
    }

    /// Sequence stamp of the termination notification, if it fired.
    pub(crate) fn stopped_at(&self) -> Option<u64> {
        self.stopped_at
    }

    /// Removes the oldest pending asynchronous error.
    pub(crate) fn take_error(&mut self) -> Option<EngineError> {
        self.errors.pop_front()
    }

    fn stamp(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

impl EngineSignals {
    /// Creates a fresh set of unfired signals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the readiness notification. Later calls are ignored.
    pub fn notify_ready(&self) {
        self.update(|state| {
            if state.ready_at.is_none() {
                state.ready_at = Some(state.stamp());
            }
        });
    }

    /// Fires the termination notification. Later calls are ignored.
    pub fn notify_stopped(&self) {
        self.update(|state| {
            if state.stopped_at.is_none() {
                state.stopped_at = Some(state.stamp());
            }
        });
    }

    /// Queues an asynchronous engine error.
    pub fn report_error(&self, error: EngineError) {
        self.update(|state| {
            state.stamp();
            state.errors.push_back(error);
        });
    }

    /// Reports whether the readiness notification has fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lock().ready_at.is_some()
    }

    /// Reports whether the termination notification has fired.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped_at.is_some()
    }

    /// Blocks until `probe` yields a value or the deadline passes.
    ///
    /// The probe runs with the state lock held, once up front and again after
    /// every notification. `None` as deadline waits without bound.
    pub(crate) fn wait_for<T>(
        &self,
        deadline: Option<Instant>,
        mut probe: impl FnMut(&mut SignalState) -> Option<T>,
    ) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(value) = probe(&mut state) {
                return Some(value);
            }
            state = match deadline {
                None => self
                    .shared
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    let (guard, _) = self
                        .shared
                        .changed
                        .wait_timeout(state, remaining)
                        .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
            };
        }
    }

    fn update(&self, change: impl FnOnce(&mut SignalState)) {
        let mut state = self.lock();
        change(&mut state);
        drop(state);
        self.shared.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

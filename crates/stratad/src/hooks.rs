//! Registry of cleanup actions executed when the node shuts down.
//!
//! The launcher registers the engine's close action here and both the
//! interrupt listener and the bootstrap thread may ask the registry to run.
//! Whichever asks first executes the hooks, in registration order; every
//! other caller blocks until that run has finished and then returns without
//! executing anything, so each hook runs at most once. A panicking hook is
//! logged and skipped; the remaining hooks still run.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::process::PROCESS_TARGET;

type Hook = Box<dyn FnOnce() + Send>;

/// Ordered, run-once collection of shutdown actions.
#[derive(Default)]
pub struct ShutdownHooks {
    state: Mutex<HookState>,
    finished: Condvar,
}

#[derive(Default)]
enum HookState {
    #[default]
    Idle,
    Pending(Vec<(String, Hook)>),
    Running,
    Finished,
}

impl ShutdownHooks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook to run at shutdown.
    ///
    /// Hooks registered after shutdown has begun run immediately on the
    /// calling thread.
    pub fn register(&self, name: impl Into<String>, hook: impl FnOnce() + Send + 'static) {
        let name = name.into();
        let mut state = self.lock();
        match &mut *state {
            HookState::Idle => {
                *state = HookState::Pending(vec![(name, Box::new(hook))]);
            }
            HookState::Pending(hooks) => hooks.push((name, Box::new(hook))),
            HookState::Running | HookState::Finished => {
                drop(state);
                debug!(target: PROCESS_TARGET, hook = %name, "running late shutdown hook");
                invoke(&name, Box::new(hook));
            }
        }
    }

    /// Runs every registered hook unless another caller already did.
    ///
    /// Returns the number of hooks this call executed.
    pub fn run(&self) -> usize {
        let hooks = {
            let mut state = self.lock();
            loop {
                match std::mem::replace(&mut *state, HookState::Running) {
                    HookState::Idle => break Vec::new(),
                    HookState::Pending(hooks) => break hooks,
                    HookState::Running => {
                        state = self
                            .finished
                            .wait(state)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    HookState::Finished => {
                        *state = HookState::Finished;
                        return 0;
                    }
                }
            }
        };

        let executed = hooks.len();
        for (name, hook) in hooks {
            debug!(target: PROCESS_TARGET, hook = %name, "running shutdown hook");
            invoke(&name, hook);
        }

        *self.lock() = HookState::Finished;
        self.finished.notify_all();
        executed
    }

    /// Reports whether a run has completed.
    #[must_use]
    pub fn has_run(&self) -> bool {
        matches!(*self.lock(), HookState::Finished)
    }

    fn lock(&self) -> MutexGuard<'_, HookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn invoke(name: &str, hook: Hook) {
    if panic::catch_unwind(AssertUnwindSafe(hook)).is_err() {
        warn!(target: PROCESS_TARGET, hook = %name, "shutdown hook panicked");
    }
}

impl fmt::Debug for ShutdownHooks {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = match &*self.lock() {
            HookState::Pending(hooks) => hooks.len(),
            _ => 0,
        };
        formatter
            .debug_struct("ShutdownHooks")
            .field("pending", &pending)
            .field("has_run", &self.has_run())
            .finish()
    }
}

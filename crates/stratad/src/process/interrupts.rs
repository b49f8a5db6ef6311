use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::{debug, warn};

use crate::health::HealthReporter;
use crate::hooks::ShutdownHooks;

use super::PROCESS_TARGET;

/// Delivers external interrupts to the shutdown hooks.
pub trait InterruptListener: Send + Sync {
    /// Starts listening. The first interrupt runs `hooks`; the returned
    /// guard stops listening when dropped.
    fn install(
        &self,
        hooks: Arc<ShutdownHooks>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<InterruptGuard, InterruptError>;
}

/// Errors reported by interrupt listeners.
#[derive(Debug, Error)]
pub enum InterruptError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Spawning the listener thread failed.
    #[error("failed to spawn interrupt listener thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Keeps an interrupt listener alive.
#[derive(Default)]
pub struct InterruptGuard {
    handle: Option<Handle>,
    thread: Option<thread::JoinHandle<()>>,
}

impl InterruptGuard {
    /// Guard for a listener with nothing to tear down.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }
}

impl fmt::Debug for InterruptGuard {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InterruptGuard")
            .field("listening", &self.handle.is_some())
            .finish()
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!(target: PROCESS_TARGET, "interrupt listener thread panicked");
        }
    }
}

/// Listener for SIGTERM, SIGINT, SIGQUIT and SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterruptListener;

impl SystemInterruptListener {
    /// Builds a listener for the standard termination signals.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl InterruptListener for SystemInterruptListener {
    fn install(
        &self,
        hooks: Arc<ShutdownHooks>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<InterruptGuard, InterruptError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| InterruptError::Install { source })?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name("stratad-interrupts".to_owned())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    reporter.interrupt_received(signal);
                    hooks.run();
                }
                debug!(target: PROCESS_TARGET, "interrupt listener finished");
            })
            .map_err(|source| InterruptError::Spawn { source })?;
        Ok(InterruptGuard {
            handle: Some(handle),
            thread: Some(thread),
        })
    }
}

//! Interrupt listener that simulates a termination signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::health::HealthReporter;
use crate::hooks::ShutdownHooks;
use crate::process::{InterruptError, InterruptGuard, InterruptListener};

const SIGTERM: i32 = 15;

/// Delivers one simulated SIGTERM right after installation when armed.
#[derive(Debug, Clone, Default)]
pub struct TestInterruptListener {
    deliver: bool,
    installs: Arc<AtomicUsize>,
}

impl TestInterruptListener {
    /// Listener that interrupts the node as soon as it is installed.
    #[must_use]
    pub fn interrupting() -> Self {
        Self {
            deliver: true,
            installs: Arc::default(),
        }
    }

    /// Listener that never fires.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl InterruptListener for TestInterruptListener {
    fn install(
        &self,
        hooks: Arc<ShutdownHooks>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<InterruptGuard, InterruptError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.deliver {
            thread::spawn(move || {
                reporter.interrupt_received(SIGTERM);
                hooks.run();
            });
        }
        Ok(InterruptGuard::detached())
    }
}

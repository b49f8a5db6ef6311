//! Process-level plumbing around the bootstrap sequence: OS interrupt
//! delivery, service-manager readiness notification, and the production
//! launch wiring.

pub(crate) mod interrupts;
pub(crate) mod launch;
pub(crate) mod notify;

pub use interrupts::{InterruptError, InterruptGuard, InterruptListener, SystemInterruptListener};
pub use launch::run_node;
pub use notify::{NotifyError, ReadyNotifier, SystemdNotifier};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

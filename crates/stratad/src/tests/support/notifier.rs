//! Readiness notifier double.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::process::{NotifyError, ReadyNotifier};

/// Counts readiness notifications and optionally fails them.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn fail_with_invalid_socket(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadyNotifier for RecordingNotifier {
    fn notify_ready(&self) -> Result<bool, NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::InvalidSocket {
                address: "relative.sock".to_owned(),
            });
        }
        Ok(true)
    }
}

//! Test double for [`HealthReporter`] that records lifecycle events for
//! assertions.

use std::sync::Mutex;

use camino::Utf8Path;

use strata_config::Config;

use crate::bootstrap::BootstrapError;
use crate::data_dir::DirectoryState;
use crate::diagnostics::{Diagnostic, DiagnosticCategory};
use crate::health::HealthReporter;
use crate::platform::PlatformDecision;
use crate::process::NotifyError;
use crate::readiness::RaceOutcome;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    ConfigurationLoaded,
    DataDirDefaulted,
    PlatformChecked { override_applied: bool },
    UnexpectedEntry(String),
    DataDirClassified(DirectoryState),
    EngineLaunching(DirectoryState),
    EngineStarted(RaceOutcome),
    ReadinessNotificationFailed,
    LaunchDiagnosed {
        category: DiagnosticCategory,
        hints: usize,
    },
    InterruptReceived(i32),
    BootstrapFailed(String),
    ShutdownCompleted,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    /// Position of the first event equal to `event`.
    #[must_use]
    pub fn position(&self, event: &HealthEvent) -> Option<usize> {
        self.events().iter().position(|recorded| recorded == event)
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn configuration_loaded(&self, _config: &Config) {
        self.record(HealthEvent::ConfigurationLoaded);
    }

    fn data_dir_defaulted(&self, _data_dir: &Utf8Path) {
        self.record(HealthEvent::DataDirDefaulted);
    }

    fn platform_checked(&self, decision: &PlatformDecision) {
        self.record(HealthEvent::PlatformChecked {
            override_applied: decision.override_applied,
        });
    }

    fn unexpected_data_dir_entry(&self, _data_dir: &Utf8Path, entry: &str) {
        self.record(HealthEvent::UnexpectedEntry(entry.to_owned()));
    }

    fn data_dir_classified(&self, _data_dir: &Utf8Path, state: DirectoryState) {
        self.record(HealthEvent::DataDirClassified(state));
    }

    fn engine_launching(&self, state: DirectoryState) {
        self.record(HealthEvent::EngineLaunching(state));
    }

    fn engine_started(&self, outcome: RaceOutcome) {
        self.record(HealthEvent::EngineStarted(outcome));
    }

    fn readiness_notification_failed(&self, _error: &NotifyError) {
        self.record(HealthEvent::ReadinessNotificationFailed);
    }

    fn launch_diagnosed(&self, diagnostic: &Diagnostic, _config: &Config) {
        self.record(HealthEvent::LaunchDiagnosed {
            category: diagnostic.category,
            hints: diagnostic.hints.len(),
        });
    }

    fn interrupt_received(&self, signal: i32) {
        self.record(HealthEvent::InterruptReceived(signal));
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn shutdown_completed(&self) {
        self.record(HealthEvent::ShutdownCompleted);
    }
}

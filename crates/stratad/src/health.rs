//! Structured health reporting for node lifecycle events.

use std::sync::Arc;

use camino::Utf8Path;

use strata_config::Config;

use crate::bootstrap::BootstrapError;
use crate::data_dir::DirectoryState;
use crate::diagnostics::Diagnostic;
use crate::platform::PlatformDecision;
use crate::process::NotifyError;
use crate::readiness::RaceOutcome;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked once the configuration has been resolved.
    fn configuration_loaded(&self, config: &Config);

    /// Invoked when the data directory was derived from the member name.
    fn data_dir_defaulted(&self, data_dir: &Utf8Path);

    /// Invoked after the platform check passed.
    fn platform_checked(&self, decision: &PlatformDecision);

    /// Invoked for every data directory entry that is not a role marker.
    fn unexpected_data_dir_entry(&self, data_dir: &Utf8Path, entry: &str);

    /// Invoked after the data directory has been classified.
    fn data_dir_classified(&self, data_dir: &Utf8Path, state: DirectoryState);

    /// Invoked before the engine is launched.
    fn engine_launching(&self, state: DirectoryState);

    /// Invoked when the engine's first lifecycle signal fires.
    fn engine_started(&self, outcome: RaceOutcome);

    /// Invoked when the service manager could not be told about readiness.
    fn readiness_notification_failed(&self, error: &NotifyError);

    /// Invoked with the diagnosis of an immediate launch failure.
    fn launch_diagnosed(&self, diagnostic: &Diagnostic, config: &Config);

    /// Invoked when an interrupt signal starts the shutdown hooks.
    fn interrupt_received(&self, signal: i32);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after the engine stopped cleanly and hooks have run.
    fn shutdown_completed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn configuration_loaded(&self, config: &Config) {
        (**self).configuration_loaded(config);
    }

    fn data_dir_defaulted(&self, data_dir: &Utf8Path) {
        (**self).data_dir_defaulted(data_dir);
    }

    fn platform_checked(&self, decision: &PlatformDecision) {
        (**self).platform_checked(decision);
    }

    fn unexpected_data_dir_entry(&self, data_dir: &Utf8Path, entry: &str) {
        (**self).unexpected_data_dir_entry(data_dir, entry);
    }

    fn data_dir_classified(&self, data_dir: &Utf8Path, state: DirectoryState) {
        (**self).data_dir_classified(data_dir, state);
    }

    fn engine_launching(&self, state: DirectoryState) {
        (**self).engine_launching(state);
    }

    fn engine_started(&self, outcome: RaceOutcome) {
        (**self).engine_started(outcome);
    }

    fn readiness_notification_failed(&self, error: &NotifyError) {
        (**self).readiness_notification_failed(error);
    }

    fn launch_diagnosed(&self, diagnostic: &Diagnostic, config: &Config) {
        (**self).launch_diagnosed(diagnostic, config);
    }

    fn interrupt_received(&self, signal: i32) {
        (**self).interrupt_received(signal);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn shutdown_completed(&self) {
        (**self).shutdown_completed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting node bootstrap"
        );
    }

    fn configuration_loaded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "configuration_loaded",
            name = %config.name(),
            data_dir = %config.data_dir(),
            initial_cluster = %config.initial_cluster(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "configuration resolved"
        );
    }

    fn data_dir_defaulted(&self, data_dir: &Utf8Path) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "data_dir_defaulted",
            data_dir = %data_dir,
            "'data-dir' was empty; using default"
        );
    }

    fn platform_checked(&self, decision: &PlatformDecision) {
        if decision.override_applied {
            tracing::info!(
                target: HEALTH_TARGET,
                event = "platform_override_applied",
                arch = %decision.arch,
                "running on an unsupported architecture because the override is set"
            );
        } else {
            tracing::debug!(
                target: HEALTH_TARGET,
                event = "platform_checked",
                arch = %decision.arch,
                "architecture supported"
            );
        }
    }

    fn unexpected_data_dir_entry(&self, data_dir: &Utf8Path, entry: &str) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "unexpected_data_dir_entry",
            data_dir = %data_dir,
            filename = entry,
            "found invalid file under data directory"
        );
    }

    fn data_dir_classified(&self, data_dir: &Utf8Path, state: DirectoryState) {
        if matches!(state, DirectoryState::Empty) {
            tracing::info!(
                target: HEALTH_TARGET,
                event = "data_dir_classified",
                data_dir = %data_dir,
                dir_type = %state,
                "data directory is fresh"
            );
        } else {
            tracing::info!(
                target: HEALTH_TARGET,
                event = "data_dir_classified",
                data_dir = %data_dir,
                dir_type = %state,
                "server has already been initialized"
            );
        }
    }

    fn engine_launching(&self, state: DirectoryState) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "engine_launching",
            dir_type = %state,
            "launching server engine"
        );
    }

    fn engine_started(&self, outcome: RaceOutcome) {
        match outcome {
            RaceOutcome::ReadyFirst => tracing::info!(
                target: HEALTH_TARGET,
                event = "engine_ready",
                "server engine joined the cluster and is ready to serve"
            ),
            RaceOutcome::StoppedFirst => tracing::warn!(
                target: HEALTH_TARGET,
                event = "engine_stopped_before_ready",
                "server engine stopped before becoming ready"
            ),
        }
    }

    fn readiness_notification_failed(&self, error: &NotifyError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "readiness_notification_failed",
            error = %error,
            "failed to notify the service manager of readiness"
        );
    }

    fn launch_diagnosed(&self, diagnostic: &Diagnostic, config: &Config) {
        if diagnostic.is_discovery() {
            tracing::warn!(
                target: HEALTH_TARGET,
                event = "launch_diagnosed",
                category = %diagnostic.category,
                name = %config.name(),
                data_dir = %config.data_dir(),
                discovery_token = config.discovery_token().unwrap_or_default(),
                discovery = config.discovery_url().unwrap_or_default(),
                error = %diagnostic.error,
                "failed to bootstrap through discovery"
            );
        } else {
            tracing::warn!(
                target: HEALTH_TARGET,
                event = "launch_diagnosed",
                category = %diagnostic.category,
                error = %diagnostic.error,
                "failed to start server engine"
            );
        }
        for (position, hint) in diagnostic.hints.iter().enumerate() {
            tracing::warn!(
                target: HEALTH_TARGET,
                event = "remediation_hint",
                category = %diagnostic.category,
                position,
                "{hint}"
            );
        }
    }

    fn interrupt_received(&self, signal: i32) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "interrupt_received",
            signal,
            "received interrupt; running shutdown hooks"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            exit_code = error.exit_code(),
            "node bootstrap failed"
        );
    }

    fn shutdown_completed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            "server engine stopped; exiting"
        );
    }
}

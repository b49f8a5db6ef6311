//! Node bootstrap orchestration.
//!
//! [`Bootstrap`] walks a node from pre-flight checks to a stopped engine:
//! the platform gate, data directory classification, the engine launch, the
//! readiness race and finally the wait for termination. Each step returns a
//! typed result; nothing here ends the process. The caller inspects the
//! final [`BootstrapError`], if any, and picks the exit status.

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use strata_config::Config;

use crate::data_dir::{self, DataDirError, DirectoryState, InvalidReason};
use crate::diagnostics::{Diagnostic, DiagnosticClassifier, FATAL_EXIT_CODE};
use crate::engine::{EngineHandle, LaunchRequest, ServerLauncher, StartError};
use crate::health::HealthReporter;
use crate::hooks::ShutdownHooks;
use crate::platform::{self, Environment};
use crate::process::InterruptError;
use crate::readiness::{self, RaceOutcome, Termination};
use crate::signals::EngineError;
use crate::telemetry::TelemetryError;

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the node configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a pre-resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors that end a bootstrap attempt. Every variant is fatal.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to verify flags: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The architecture is unsupported and no matching override was set.
    #[error(
        "running on unsupported architecture '{arch}'; set {} to '{arch}' to override",
        strata_config::UNSUPPORTED_ARCH_ENV_VAR
    )]
    UnsupportedPlatform {
        /// Architecture that was rejected.
        arch: String,
    },
    /// The data directory could not be listed.
    #[error(transparent)]
    DataDir(#[from] DataDirError),
    /// The data directory holds contradictory role markers.
    #[error("invalid data directory '{path}': {reason}")]
    InvalidDataDir {
        /// Offending directory.
        path: Utf8PathBuf,
        /// Why it is invalid.
        reason: InvalidReason,
    },
    /// The data directory belongs to a proxy, a mode that no longer exists.
    #[error("data directory '{path}' was initialised for proxy mode, which has been retired")]
    RetiredProxyMode {
        /// Offending directory.
        path: Utf8PathBuf,
    },
    /// The engine refused to start.
    #[error("failed to start server engine ({}): {source}", .diagnostic.category)]
    Launch {
        /// Classification of the failure.
        diagnostic: Diagnostic,
        /// Raw launch error.
        #[source]
        source: StartError,
    },
    /// The engine signalled neither readiness nor termination in time.
    #[error("server engine did not become ready within {}ms", .timeout.as_millis())]
    ReadinessTimeout {
        /// Configured bound.
        timeout: Duration,
    },
    /// Installing the interrupt listener failed.
    #[error(transparent)]
    Interrupts(#[from] InterruptError),
    /// The engine reported an error after starting.
    #[error("server engine failed: {source}")]
    EngineFailed {
        /// Error surfaced by the engine.
        #[source]
        source: EngineError,
    },
}

impl BootstrapError {
    /// Exit status the process should end with.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Launch { diagnostic, .. } => diagnostic.exit_code(),
            _ => FATAL_EXIT_CODE,
        }
    }

    /// Diagnosis attached to a launch failure.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Launch { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

impl From<TelemetryError> for BootstrapError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

/// One bootstrap attempt over a resolved configuration.
pub struct Bootstrap<'a> {
    config: &'a Config,
    hooks: &'a ShutdownHooks,
    reporter: &'a dyn HealthReporter,
}

impl<'a> Bootstrap<'a> {
    /// Binds the attempt to its configuration and collaborators.
    #[must_use]
    pub fn new(
        config: &'a Config,
        hooks: &'a ShutdownHooks,
        reporter: &'a dyn HealthReporter,
    ) -> Self {
        Self {
            config,
            hooks,
            reporter,
        }
    }

    /// Checks the platform, then classifies the data directory.
    ///
    /// Only a member or fresh directory passes; the platform check runs
    /// before the filesystem is touched.
    pub fn preflight(
        &self,
        arch: &str,
        environment: &dyn Environment,
    ) -> Result<DirectoryState, BootstrapError> {
        let decision = platform::check(arch, environment);
        if !decision.supported {
            return Err(BootstrapError::UnsupportedPlatform {
                arch: decision.arch,
            });
        }
        self.reporter.platform_checked(&decision);

        let path = self.config.data_dir();
        let inspection = data_dir::inspect(&path)?;
        for entry in &inspection.unexpected_entries {
            self.reporter.unexpected_data_dir_entry(&path, entry);
        }
        self.reporter.data_dir_classified(&path, inspection.state);

        match inspection.state {
            DirectoryState::Invalid(reason) => Err(BootstrapError::InvalidDataDir { path, reason }),
            DirectoryState::Proxy => Err(BootstrapError::RetiredProxyMode { path }),
            state @ (DirectoryState::Member | DirectoryState::Empty) => Ok(state),
        }
    }

    /// Starts the engine, diagnosing an immediate failure.
    pub fn launch(
        &self,
        launcher: &dyn ServerLauncher,
        state: DirectoryState,
    ) -> Result<EngineHandle, BootstrapError> {
        self.reporter.engine_launching(state);
        let data_dir = self.config.data_dir();
        let request = LaunchRequest {
            config: self.config,
            data_dir: &data_dir,
            state,
        };
        launcher.start(&request, self.hooks).map_err(|source| {
            let diagnostic = DiagnosticClassifier::new(self.config).classify(&source);
            self.reporter.launch_diagnosed(&diagnostic, self.config);
            BootstrapError::Launch { diagnostic, source }
        })
    }

    /// Waits for the engine's first lifecycle signal.
    ///
    /// Either outcome counts as a completed startup. The wait is unbounded
    /// unless `startup_timeout_ms` is configured.
    pub fn await_startup(&self, engine: &EngineHandle) -> Result<RaceOutcome, BootstrapError> {
        let outcome = match self.config.startup_timeout() {
            None => readiness::race(engine.signals()),
            Some(timeout) => readiness::race_within(engine.signals(), timeout)
                .ok_or(BootstrapError::ReadinessTimeout { timeout })?,
        };
        self.reporter.engine_started(outcome);
        Ok(outcome)
    }

    /// Blocks until the engine stops or fails.
    pub fn await_shutdown(&self, engine: &EngineHandle) -> Result<(), BootstrapError> {
        match readiness::await_termination(engine.signals()) {
            Termination::Stopped => Ok(()),
            Termination::Failed(source) => Err(BootstrapError::EngineFailed { source }),
        }
    }
}

//! BDD test world: owns the collaborators of one node run and its outcome.

use std::cell::RefCell;
use std::fs;
use std::sync::Arc;

use camino::Utf8PathBuf;

use strata_config::Config;

use crate::bootstrap::BootstrapError;
use crate::process::ReadyNotifier;
use crate::process::launch::{LaunchPlan, ProcessControl, ServiceDeps, run_node_with};

use super::config_loader::TestConfigLoader;
use super::environment::MapEnvironment;
use super::interrupts::TestInterruptListener;
use super::launcher::{EngineScript, ScriptedLauncher};
use super::notifier::RecordingNotifier;
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct NodeWorld {
    loader: TestConfigLoader,
    pub arch: String,
    pub environment: MapEnvironment,
    pub interrupts: TestInterruptListener,
    pub launcher: ScriptedLauncher,
    pub notifier: RecordingNotifier,
    pub reporter: Arc<RecordingHealthReporter>,
    result: Option<Result<(), BootstrapError>>,
}

impl NodeWorld {
    /// Builds a world for a supported host with an empty data directory.
    pub fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            arch: "amd64".to_owned(),
            environment: MapEnvironment::default(),
            interrupts: TestInterruptListener::interrupting(),
            launcher: ScriptedLauncher::default(),
            notifier: RecordingNotifier::default(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            result: None,
        }
    }

    /// Data directory the node will inspect.
    pub fn data_dir(&self) -> Utf8PathBuf {
        self.loader.data_dir()
    }

    /// Creates a marker or stray entry inside the data directory.
    pub fn create_entry(&self, name: &str) {
        let path = self.data_dir().join(name);
        fs::create_dir_all(&path).expect("failed to create data directory entry");
    }

    /// Adjusts the configuration the node loads.
    pub fn configure(&mut self, change: impl FnOnce(&mut Config)) {
        self.loader.configure(change);
    }

    pub fn script(&self, script: EngineScript) {
        self.launcher.set_script(script);
    }

    /// Collaborators for one run, with `notifier` standing in for the
    /// service manager.
    pub fn plan_with<N: ReadyNotifier>(
        &self,
        notifier: N,
    ) -> LaunchPlan<TestConfigLoader, ScriptedLauncher, TestInterruptListener, N, MapEnvironment>
    {
        LaunchPlan {
            process: ProcessControl {
                arch: self.arch.clone(),
                environment: self.environment.clone(),
                interrupts: self.interrupts.clone(),
                notifier,
            },
            services: ServiceDeps {
                loader: self.loader.clone(),
                launcher: self.launcher.clone(),
                reporter: self.reporter.clone(),
            },
        }
    }

    /// Runs the node once.
    pub fn run(&mut self) {
        if self.result.is_some() {
            return;
        }
        let plan = self.plan_with(self.notifier.clone());
        self.result = Some(run_node_with(plan));
    }

    /// Outcome of the run; panics when the node has not run.
    pub fn result(&self) -> &Result<(), BootstrapError> {
        self.result.as_ref().expect("node has not run")
    }

    pub fn error(&self) -> Option<&BootstrapError> {
        self.result().as_ref().err()
    }
}

impl Default for NodeWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<NodeWorld> {
    RefCell::new(NodeWorld::new())
}

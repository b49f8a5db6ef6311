//! Sequences the node bootstrap from configuration to process exit.

use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{Bootstrap, BootstrapError, ConfigLoader, SystemConfigLoader};
use crate::engine::{EngineHandle, ServerLauncher};
use crate::health::HealthReporter;
use crate::hooks::ShutdownHooks;
use crate::platform::{self, Environment, ProcessEnvironment};
use crate::readiness::RaceOutcome;
use crate::standalone_engine::StandaloneEngineLauncher;
use crate::telemetry;

use super::PROCESS_TARGET;
use super::interrupts::{InterruptListener, SystemInterruptListener};
use super::notify::{ReadyNotifier, SystemdNotifier};

/// Process-level collaborators: the host platform, signals and the
/// service manager.
pub(crate) struct ProcessControl<I, N, V> {
    pub(crate) arch: String,
    pub(crate) environment: V,
    pub(crate) interrupts: I,
    pub(crate) notifier: N,
}

/// Service dependencies required to start the node.
pub(crate) struct ServiceDeps<L, E> {
    pub(crate) loader: L,
    pub(crate) launcher: E,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to run the node.
pub(crate) struct LaunchPlan<L, E, I, N, V> {
    pub(crate) process: ProcessControl<I, N, V>,
    pub(crate) services: ServiceDeps<L, E>,
}

/// Runs the node using the production collaborators.
///
/// Returns once the engine has stopped and the shutdown hooks have run.
pub fn run_node() -> Result<(), BootstrapError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            arch: platform::current_arch().to_owned(),
            environment: ProcessEnvironment,
            interrupts: SystemInterruptListener::new(),
            notifier: SystemdNotifier::from_env(),
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            launcher: StandaloneEngineLauncher::new(),
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    };
    run_node_with(plan)
}

/// Runs the node with injected collaborators.
pub(crate) fn run_node_with<L, E, I, N, V>(
    plan: LaunchPlan<L, E, I, N, V>,
) -> Result<(), BootstrapError>
where
    L: ConfigLoader,
    E: ServerLauncher,
    I: InterruptListener,
    N: ReadyNotifier,
    V: Environment,
{
    let LaunchPlan { process, services } = plan;
    let ServiceDeps {
        loader,
        launcher,
        reporter,
    } = services;

    reporter.bootstrap_starting();
    let hooks = Arc::new(ShutdownHooks::new());
    let result = bootstrap_node(&loader, &launcher, &process, &hooks, &reporter);
    let ran = hooks.run();
    info!(
        target: PROCESS_TARGET,
        hooks = ran,
        "shutdown hooks finished"
    );

    match result {
        Ok(()) => {
            reporter.shutdown_completed();
            Ok(())
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn bootstrap_node<L, E, I, N, V>(
    loader: &L,
    launcher: &E,
    process: &ProcessControl<I, N, V>,
    hooks: &Arc<ShutdownHooks>,
    reporter: &Arc<dyn HealthReporter>,
) -> Result<(), BootstrapError>
where
    L: ConfigLoader,
    E: ServerLauncher,
    I: InterruptListener,
    N: ReadyNotifier,
    V: Environment,
{
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    telemetry::initialise(&config)?;
    reporter.configuration_loaded(&config);
    if config.data_dir_is_defaulted() {
        reporter.data_dir_defaulted(&config.data_dir());
    }

    let bootstrap = Bootstrap::new(&config, hooks, reporter.as_ref());
    let state = bootstrap.preflight(&process.arch, &process.environment)?;
    let engine = bootstrap.launch(launcher, state)?;
    let _interrupts = process
        .interrupts
        .install(Arc::clone(hooks), Arc::clone(reporter))?;
    supervise(&bootstrap, &engine, &process.notifier, reporter.as_ref())
}

fn supervise(
    bootstrap: &Bootstrap<'_>,
    engine: &EngineHandle,
    notifier: &impl ReadyNotifier,
    reporter: &dyn HealthReporter,
) -> Result<(), BootstrapError> {
    if bootstrap.await_startup(engine)? == RaceOutcome::ReadyFirst
        && let Err(error) = notifier.notify_ready()
    {
        reporter.readiness_notification_failed(&error);
    }
    bootstrap.await_shutdown(engine)
}

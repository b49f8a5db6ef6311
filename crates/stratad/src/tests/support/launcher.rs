//! Scripted [`ServerLauncher`] that plays back a fixed engine lifecycle.

use std::sync::{Arc, Mutex};

use crate::data_dir::DirectoryState;
use crate::engine::{
    ClusterFlag, DiscoveryCause, DiscoveryError, EngineHandle, LaunchRequest, MembershipError,
    ServerLauncher, StartError,
};
use crate::hooks::ShutdownHooks;
use crate::signals::{EngineError, EngineSignals};

/// Lifecycle the scripted engine follows once started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineScript {
    /// Becomes ready and serves until the shutdown hooks stop it.
    ServeUntilStopped,
    /// Stops on its own before becoming ready.
    StopBeforeReady,
    /// Becomes ready, then reports an asynchronous failure.
    FailAfterReady(String),
    /// Fires nothing until the shutdown hooks stop it.
    NeverSignal,
    /// Refuses to start with a discovery failure.
    RejectDiscovery(DiscoveryCause),
    /// Refuses to start because the initial cluster omits this member.
    RejectMembership,
}

/// Launcher recording every start request.
#[derive(Debug, Clone)]
pub struct ScriptedLauncher {
    script: Arc<Mutex<EngineScript>>,
    starts: Arc<Mutex<Vec<DirectoryState>>>,
    engine: Arc<Mutex<Option<EngineSignals>>>,
}

impl ScriptedLauncher {
    #[must_use]
    pub fn new(script: EngineScript) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            starts: Arc::default(),
            engine: Arc::default(),
        }
    }

    pub fn set_script(&self, script: EngineScript) {
        *self.script.lock().expect("launcher mutex poisoned") = script;
    }

    /// Directory states the engine was started with.
    #[must_use]
    pub fn starts(&self) -> Vec<DirectoryState> {
        self.starts.lock().expect("launcher mutex poisoned").clone()
    }

    /// Whether the last launched engine has fired its stop signal.
    #[must_use]
    pub fn engine_stopped(&self) -> bool {
        self.engine
            .lock()
            .expect("launcher mutex poisoned")
            .as_ref()
            .is_some_and(EngineSignals::is_stopped)
    }
}

impl Default for ScriptedLauncher {
    fn default() -> Self {
        Self::new(EngineScript::ServeUntilStopped)
    }
}

impl ServerLauncher for ScriptedLauncher {
    fn start(
        &self,
        request: &LaunchRequest<'_>,
        hooks: &ShutdownHooks,
    ) -> Result<EngineHandle, StartError> {
        self.starts
            .lock()
            .expect("launcher mutex poisoned")
            .push(request.state);
        let script = self.script.lock().expect("launcher mutex poisoned").clone();

        let signals = EngineSignals::new();
        *self.engine.lock().expect("launcher mutex poisoned") = Some(signals.clone());
        match script {
            EngineScript::RejectDiscovery(cause) => {
                return Err(DiscoveryError::new(cause).into());
            }
            EngineScript::RejectMembership => {
                return Err(MembershipError::new(
                    ClusterFlag::InitialCluster,
                    format!(
                        "couldn't find local name \"{}\" in the initial cluster configuration",
                        request.config.name()
                    ),
                )
                .into());
            }
            EngineScript::ServeUntilStopped | EngineScript::NeverSignal => {
                let closer = signals.clone();
                hooks.register("scripted-engine", move || closer.notify_stopped());
                if script == EngineScript::ServeUntilStopped {
                    signals.notify_ready();
                }
            }
            EngineScript::StopBeforeReady => signals.notify_stopped(),
            EngineScript::FailAfterReady(message) => {
                let closer = signals.clone();
                hooks.register("scripted-engine", move || closer.notify_stopped());
                signals.notify_ready();
                signals.report_error(EngineError::new(message));
            }
        }
        Ok(EngineHandle::new(signals))
    }
}

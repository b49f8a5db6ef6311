//! In-process engine used by the shipped binary.
//!
//! The standalone engine validates the membership settings a fresh member
//! bootstraps from, owns the `member` marker in the data directory and then
//! idles until the shutdown hooks close it. It keeps the full launcher
//! contract so the bootstrap sequence behaves the same once a replicated
//! engine is plugged in behind [`ServerLauncher`].

use std::fs;

use tracing::{info, warn};

use strata_config::{Config, PeerUrls};

use crate::data_dir::{DirectoryState, MEMBER_MARKER};
use crate::engine::{
    ClusterFlag, EngineHandle, LaunchRequest, MembershipError, ServerLauncher, StartError,
};
use crate::hooks::ShutdownHooks;
use crate::signals::EngineSignals;

const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::engine");
const ENGINE_HOOK: &str = "standalone-engine";

/// Launcher for the standalone engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandaloneEngineLauncher;

impl StandaloneEngineLauncher {
    /// Builds the launcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ServerLauncher for StandaloneEngineLauncher {
    fn start(
        &self,
        request: &LaunchRequest<'_>,
        hooks: &ShutdownHooks,
    ) -> Result<EngineHandle, StartError> {
        let config = request.config;
        let advertised = config.advertise_peer_urls().map_err(|source| {
            StartError::engine_with_source("invalid advertise peer URLs", source)
        })?;
        // A restarted member recovers its membership from the data directory.
        if matches!(request.state, DirectoryState::Empty) {
            check_membership(config, &advertised)?;
        }
        if config.has_discovery_config() {
            warn!(
                target: ENGINE_TARGET,
                "discovery settings are ignored by the standalone engine"
            );
        }

        let marker = request.data_dir.join(MEMBER_MARKER);
        fs::create_dir_all(&marker).map_err(|source| {
            StartError::engine_with_source(format!("failed to create '{marker}'"), source)
        })?;

        let signals = EngineSignals::new();
        let closer = signals.clone();
        hooks.register(ENGINE_HOOK, move || {
            info!(target: ENGINE_TARGET, "stopping standalone engine");
            closer.notify_stopped();
        });
        info!(
            target: ENGINE_TARGET,
            name = %config.name(),
            data_dir = %request.data_dir,
            peer_urls = %advertised,
            "standalone engine serving"
        );
        signals.notify_ready();
        Ok(EngineHandle::new(signals))
    }
}

/// Checks that the initial cluster names this member at exactly the URLs it
/// advertises.
fn check_membership(config: &Config, advertised: &PeerUrls) -> Result<(), MembershipError> {
    let name = config.name();
    let initial_cluster = config.initial_cluster();
    let local_urls = initial_cluster
        .split(',')
        .filter_map(|entry| entry.trim().split_once('='))
        .filter(|(member, _)| member.trim() == name)
        .map(|(_, url)| url.trim())
        .collect::<Vec<_>>();
    if local_urls.is_empty() {
        return Err(MembershipError::new(
            ClusterFlag::InitialCluster,
            format!("couldn't find local name \"{name}\" in the initial cluster configuration"),
        ));
    }

    let listed = local_urls
        .join(",")
        .parse::<PeerUrls>()
        .map_err(|error| MembershipError::new(ClusterFlag::InitialCluster, error.to_string()))?;
    if &listed != advertised {
        return Err(MembershipError::new(
            ClusterFlag::InitialAdvertisePeerUrls,
            format!("advertised peer URLs {advertised} do not match {listed} for \"{name}\""),
        ));
    }
    Ok(())
}

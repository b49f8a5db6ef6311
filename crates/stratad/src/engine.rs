//! Contract between the bootstrap sequence and the server engine it launches.
//!
//! The engine itself (consensus, storage, transport) lives behind
//! [`ServerLauncher`]. A launch either fails immediately with a typed
//! [`StartError`] or hands back an [`EngineHandle`] whose signals report
//! readiness, termination and asynchronous failures.

use std::fmt;

use camino::Utf8Path;
use thiserror::Error;

use strata_config::Config;

use crate::data_dir::DirectoryState;
use crate::hooks::ShutdownHooks;
use crate::signals::EngineSignals;

/// Everything a launcher needs to start the engine.
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    /// Resolved node configuration.
    pub config: &'a Config,
    /// Data directory the engine must use.
    pub data_dir: &'a Utf8Path,
    /// Role the node resumes into.
    pub state: DirectoryState,
}

/// Starts the server engine.
pub trait ServerLauncher: Send + Sync {
    /// Launches the engine.
    ///
    /// Implementations register the engine's close action with `hooks` so an
    /// interrupt or the end of the bootstrap sequence stops it exactly once.
    fn start(
        &self,
        request: &LaunchRequest<'_>,
        hooks: &ShutdownHooks,
    ) -> Result<EngineHandle, StartError>;
}

/// Handle to a launched engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    signals: EngineSignals,
}

impl EngineHandle {
    /// Wraps the signals the running engine fires.
    #[must_use]
    pub fn new(signals: EngineSignals) -> Self {
        Self { signals }
    }

    /// Lifecycle notifications published by the engine.
    #[must_use]
    pub fn signals(&self) -> &EngineSignals {
        &self.signals
    }
}

/// Errors reported synchronously by [`ServerLauncher::start`].
#[derive(Debug, Error)]
pub enum StartError {
    /// The cluster-discovery subsystem rejected the bootstrap.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The membership flags are inconsistent with this member.
    #[error(transparent)]
    Membership(#[from] MembershipError),
    /// Any other engine failure.
    #[error("{message}")]
    Engine {
        /// Human-readable description.
        message: String,
        /// Underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StartError {
    /// Builds an unclassified engine error.
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an unclassified engine error wrapping `source`.
    #[must_use]
    pub fn engine_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Engine {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Failure raised by the discovery subsystem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("discovery failed: {cause}")]
pub struct DiscoveryError {
    /// What the discovery service reported.
    pub cause: DiscoveryCause,
}

impl DiscoveryError {
    /// Wraps a discovery cause.
    #[must_use]
    pub fn new(cause: DiscoveryCause) -> Self {
        Self { cause }
    }
}

/// Causes reported by the discovery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryCause {
    /// This member's ID is already registered under the token.
    DuplicateId,
    /// Another member registered the same name under the token.
    DuplicateName,
    /// The token already bootstrapped a full cluster.
    TokenReused,
    /// Any other discovery failure.
    Other(String),
}

impl fmt::Display for DiscoveryCause {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId => formatter.write_str("member ID already registered"),
            Self::DuplicateName => formatter.write_str("member name already registered"),
            Self::TokenReused => formatter.write_str("discovery token already used"),
            Self::Other(message) => formatter.write_str(message),
        }
    }
}

/// Membership flag named by a [`MembershipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterFlag {
    /// `--initial-cluster`.
    InitialCluster,
    /// `--initial-advertise-peer-urls`.
    InitialAdvertisePeerUrls,
}

impl fmt::Display for ClusterFlag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialCluster => formatter.write_str("--initial-cluster"),
            Self::InitialAdvertisePeerUrls => formatter.write_str("--initial-advertise-peer-urls"),
        }
    }
}

/// The initial cluster does not include this member as configured.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{flag} does not include this member: {reason}")]
pub struct MembershipError {
    /// Flag whose value is implicated.
    ///
    /// Only rendered in the error text; diagnosis reads the resolved
    /// configuration, not this field.
    pub flag: ClusterFlag,
    /// Description of the mismatch.
    pub reason: String,
}

impl MembershipError {
    /// Builds a membership error.
    #[must_use]
    pub fn new(flag: ClusterFlag, reason: impl Into<String>) -> Self {
        Self {
            flag,
            reason: reason.into(),
        }
    }
}

//! Turns immediate launch failures into operator-facing diagnostics.
//!
//! Classification is pure: it inspects the typed [`StartError`] and the
//! resolved configuration, and never retries or suppresses anything. Every
//! diagnostic produced here is fatal.

use std::fmt;

use strata_config::Config;

use crate::engine::{DiscoveryCause, StartError};

/// Exit status used for every fatal bootstrap condition.
pub const FATAL_EXIT_CODE: u8 = 1;

const HINT_CHECK_DATA_DIR: &str =
    "check the data dir for a prior successful bootstrap of this member";
const HINT_NEW_TOKEN_AFTER_FAILURE: &str =
    "generate a new discovery token if the prior bootstrap failed";
const HINT_INSPECT_ENDPOINT: &str =
    "inspect the discovery endpoint for name collisions under this token";
const HINT_DO_NOT_REUSE_TOKEN: &str =
    "do not reuse the discovery token; generate a new one to bootstrap a cluster";
const HINT_INITIAL_CLUSTER_UNSET: &str =
    "the initial-cluster flag may not have been set explicitly";
const HINT_ADVERTISE_PEER_URLS_UNSET: &str =
    "the advertise-peer-urls flag may not have been set explicitly";
const HINT_DISCOVERY_UNSET: &str = "no discovery was configured: set legacy discovery \
     (--discovery) or token-based discovery (--discovery-token with --discovery-endpoints)";

/// Kind of launch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// The member ID is already registered with discovery.
    DuplicateId,
    /// The member name is already registered with discovery.
    DuplicateName,
    /// The discovery token already bootstrapped a cluster.
    TokenReused,
    /// The initial cluster was left at its name-derived value.
    MissingInitialCluster,
    /// The advertised peer URLs were left at the system default.
    MissingAdvertisePeerUrls,
    /// Neither static membership nor discovery was configured.
    MissingDiscoveryConfig,
    /// Discovery failed for another reason.
    GenericDiscoveryFailure,
    /// No specific classification applies.
    Unclassified,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DuplicateId => "duplicate_id",
            Self::DuplicateName => "duplicate_name",
            Self::TokenReused => "token_reused",
            Self::MissingInitialCluster => "missing_initial_cluster",
            Self::MissingAdvertisePeerUrls => "missing_advertise_peer_urls",
            Self::MissingDiscoveryConfig => "missing_discovery_config",
            Self::GenericDiscoveryFailure => "generic_discovery_failure",
            Self::Unclassified => "unclassified",
        };
        formatter.write_str(label)
    }
}

/// Categorised explanation of one launch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub category: DiagnosticCategory,
    /// Remediation hints, most relevant first.
    pub hints: Vec<String>,
    /// Whether the node must terminate.
    pub fatal: bool,
    /// Text of the raw error this diagnostic explains.
    pub error: String,
}

impl Diagnostic {
    fn fatal(category: DiagnosticCategory, hints: &[&str], error: &StartError) -> Self {
        Self {
            category,
            hints: hints.iter().map(|hint| (*hint).to_owned()).collect(),
            fatal: true,
            error: error.to_string(),
        }
    }

    /// Reports whether this diagnostic came from the discovery subsystem.
    #[must_use]
    pub fn is_discovery(&self) -> bool {
        matches!(
            self.category,
            DiagnosticCategory::DuplicateId
                | DiagnosticCategory::DuplicateName
                | DiagnosticCategory::TokenReused
                | DiagnosticCategory::GenericDiscoveryFailure
        )
    }

    /// Exit status the process should end with.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        FATAL_EXIT_CODE
    }
}

/// Classifies launch errors against the configuration they were raised for.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticClassifier<'a> {
    config: &'a Config,
}

impl<'a> DiagnosticClassifier<'a> {
    /// Builds a classifier over the resolved configuration.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Maps `error` to a diagnostic.
    #[must_use]
    pub fn classify(&self, error: &StartError) -> Diagnostic {
        match error {
            StartError::Discovery(discovery) => classify_discovery(&discovery.cause, error),
            StartError::Membership(_) => self.classify_membership(error),
            StartError::Engine { .. } => {
                Diagnostic::fatal(DiagnosticCategory::Unclassified, &[], error)
            }
        }
    }

    fn classify_membership(&self, error: &StartError) -> Diagnostic {
        let initial_cluster_derived = self.config.initial_cluster_is_derived();
        let peer_urls_default = self.config.advertise_peer_urls_are_default();
        let discovery_missing = initial_cluster_derived && !self.config.has_discovery_config();

        let mut hints = Vec::new();
        if initial_cluster_derived {
            hints.push(HINT_INITIAL_CLUSTER_UNSET);
        }
        if peer_urls_default {
            hints.push(HINT_ADVERTISE_PEER_URLS_UNSET);
        }
        if discovery_missing {
            hints.push(HINT_DISCOVERY_UNSET);
        }

        let category = if discovery_missing {
            DiagnosticCategory::MissingDiscoveryConfig
        } else if initial_cluster_derived {
            DiagnosticCategory::MissingInitialCluster
        } else if peer_urls_default {
            DiagnosticCategory::MissingAdvertisePeerUrls
        } else {
            DiagnosticCategory::Unclassified
        };
        Diagnostic::fatal(category, &hints, error)
    }
}

fn classify_discovery(cause: &DiscoveryCause, error: &StartError) -> Diagnostic {
    match cause {
        DiscoveryCause::DuplicateId => Diagnostic::fatal(
            DiagnosticCategory::DuplicateId,
            &[HINT_CHECK_DATA_DIR, HINT_NEW_TOKEN_AFTER_FAILURE],
            error,
        ),
        DiscoveryCause::DuplicateName => Diagnostic::fatal(
            DiagnosticCategory::DuplicateName,
            &[HINT_INSPECT_ENDPOINT, HINT_DO_NOT_REUSE_TOKEN],
            error,
        ),
        DiscoveryCause::TokenReused => Diagnostic::fatal(
            DiagnosticCategory::TokenReused,
            &[HINT_DO_NOT_REUSE_TOKEN],
            error,
        ),
        DiscoveryCause::Other(_) => Diagnostic::fatal(
            DiagnosticCategory::GenericDiscoveryFailure,
            &[HINT_DO_NOT_REUSE_TOKEN],
            error,
        ),
    }
}

//! Shared configuration for the strata node binaries.
//!
//! Settings are layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file, then `STRATA_*` environment variables, and
//! finally command-line flags. The resolved [`Config`] answers the questions
//! the bootstrap sequence asks of it: where the data directory lives, which
//! initial cluster and peer URLs were requested, whether any discovery
//! mechanism was configured, and how logging should be rendered.

mod cluster;
mod defaults;
mod logging;

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use cluster::{PeerUrls, PeerUrlsError, initial_cluster_from_name};
pub use defaults::{
    DATA_DIR_SUFFIX, DEFAULT_ADVERTISE_PEER_URLS, DEFAULT_LOG_FILTER, DEFAULT_NAME,
    UNSUPPORTED_ARCH_ENV_VAR, default_advertise_peer_urls, default_log_filter,
    default_log_filter_string, default_log_format, default_name,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "STRATA")]
pub struct Config {
    /// Human-readable member name.
    #[ortho_config(default = defaults::default_name())]
    pub name: String,
    /// Directory holding the member's persistent state.
    pub data_dir: Option<Utf8PathBuf>,
    /// Initial cluster configuration for bootstrapping (`name=url,...`).
    pub initial_cluster: Option<String>,
    /// Comma-separated peer URLs advertised to the rest of the cluster.
    #[ortho_config(default = defaults::default_advertise_peer_urls())]
    pub initial_advertise_peer_urls: String,
    /// Legacy discovery URL used to bootstrap the cluster.
    pub discovery: Option<String>,
    /// Token identifying the cluster in the token-based discovery service.
    pub discovery_token: Option<String>,
    /// Comma-separated endpoints of the token-based discovery service.
    pub discovery_endpoints: Option<String>,
    /// Bound on the wait for the engine's first readiness or stop signal.
    pub startup_timeout_ms: Option<u64>,
    /// Tracing filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log events.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: None,
            initial_cluster: None,
            initial_advertise_peer_urls: default_advertise_peer_urls(),
            discovery: None,
            discovery_token: None,
            discovery_endpoints: None,
            startup_timeout_ms: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data directory, falling back to `<name>.strata` when none was set.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.as_str().is_empty() => dir.clone(),
            _ => Utf8PathBuf::from(format!("{}.{DATA_DIR_SUFFIX}", self.name)),
        }
    }

    /// Reports whether [`Config::data_dir`] had to derive a default.
    #[must_use]
    pub fn data_dir_is_defaulted(&self) -> bool {
        self.data_dir
            .as_ref()
            .is_none_or(|dir| dir.as_str().is_empty())
    }

    /// The initial cluster this member would use on its own, derived from
    /// its name and advertised peer URLs.
    #[must_use]
    pub fn initial_cluster_from_name(&self) -> String {
        initial_cluster_from_name(&self.name, &self.initial_advertise_peer_urls)
    }

    /// The effective initial cluster: the configured value, or the
    /// name-derived one when the flag was never supplied.
    #[must_use]
    pub fn initial_cluster(&self) -> String {
        match &self.initial_cluster {
            Some(cluster) if !cluster.trim().is_empty() => cluster.clone(),
            _ => self.initial_cluster_from_name(),
        }
    }

    /// Reports whether the effective initial cluster is the one derived from
    /// the member name alone.
    #[must_use]
    pub fn initial_cluster_is_derived(&self) -> bool {
        self.initial_cluster() == self.initial_cluster_from_name()
    }

    /// Parses the advertised peer URLs.
    pub fn advertise_peer_urls(&self) -> Result<PeerUrls, PeerUrlsError> {
        self.initial_advertise_peer_urls.parse()
    }

    /// Reports whether the advertised peer URLs equal the built-in default.
    #[must_use]
    pub fn advertise_peer_urls_are_default(&self) -> bool {
        match (
            self.advertise_peer_urls(),
            DEFAULT_ADVERTISE_PEER_URLS.parse::<PeerUrls>(),
        ) {
            (Ok(configured), Ok(default)) => configured == default,
            _ => false,
        }
    }

    /// Legacy discovery URL, if any.
    #[must_use]
    pub fn discovery_url(&self) -> Option<&str> {
        non_empty(self.discovery.as_deref())
    }

    /// Token for the token-based discovery service, if any.
    #[must_use]
    pub fn discovery_token(&self) -> Option<&str> {
        non_empty(self.discovery_token.as_deref())
    }

    /// Endpoints of the token-based discovery service.
    #[must_use]
    pub fn discovery_endpoints(&self) -> Vec<&str> {
        self.discovery_endpoints
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reports whether either discovery mechanism was configured.
    #[must_use]
    pub fn has_discovery_config(&self) -> bool {
        self.discovery_url().is_some() || !self.discovery_endpoints().is_empty()
    }

    /// Readiness wait bound, when configured.
    #[must_use]
    pub fn startup_timeout(&self) -> Option<Duration> {
        self.startup_timeout_ms.map(Duration::from_millis)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for log events.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

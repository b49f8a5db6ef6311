//! Default values shared by the node binary and its tests.

/// Member name used when `--name` is not supplied.
pub const DEFAULT_NAME: &str = "default";

/// Peer URL advertised to the rest of the cluster when none is configured.
pub const DEFAULT_ADVERTISE_PEER_URLS: &str = "http://localhost:2380";

/// Suffix appended to the member name to derive a data directory.
pub const DATA_DIR_SUFFIX: &str = "strata";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable permitting a run on an unsupported architecture.
pub const UNSUPPORTED_ARCH_ENV_VAR: &str = "STRATA_UNSUPPORTED_ARCH";

/// Default member name as an owned string.
pub fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

/// Default advertised peer URLs as an owned string.
pub fn default_advertise_peer_urls() -> String {
    DEFAULT_ADVERTISE_PEER_URLS.to_owned()
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

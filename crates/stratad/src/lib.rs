//! Bootstrap orchestration for a strata storage node.
//!
//! `stratad` takes a node from its command line to a running server engine
//! and back to a clean exit. The sequence is deliberately linear: load the
//! layered configuration from [`strata_config`], initialise structured
//! telemetry, refuse unsupported architectures, classify the data directory
//! and launch the engine as a fresh or resuming member. Once the engine is
//! up the process waits for either a termination notification or an
//! asynchronous engine error.
//!
//! A data directory records its role with marker entries (`member` and the
//! retired `proxy`). Directories holding both markers are rejected before
//! anything is launched, and proxy directories are refused outright.
//!
//! Launch failures are classified into a [`Diagnostic`] with remediation
//! hints for operators, such as a duplicate member ID during discovery or a
//! member missing from its own initial cluster. Every fatal condition surfaces
//! as a [`BootstrapError`]; only the binary turns it into an exit status.
//!
//! The engine is reached through the [`ServerLauncher`] trait. The shipped
//! binary uses [`StandaloneEngineLauncher`]; cleanup actions go through the
//! [`ShutdownHooks`] registry, which interrupts and the bootstrap thread
//! share so each hook runs at most once.

mod bootstrap;
mod data_dir;
mod diagnostics;
mod engine;
mod health;
mod hooks;
mod platform;
mod process;
mod readiness;
mod signals;
mod standalone_engine;
mod telemetry;

pub use bootstrap::{
    Bootstrap, BootstrapError, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
};
pub use data_dir::{
    DataDirError, DirectoryState, Inspection, InvalidReason, MEMBER_MARKER, PROXY_MARKER,
    classify, inspect,
};
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticClassifier, FATAL_EXIT_CODE};
pub use engine::{
    ClusterFlag, DiscoveryCause, DiscoveryError, EngineHandle, LaunchRequest, MembershipError,
    ServerLauncher, StartError,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use hooks::ShutdownHooks;
pub use platform::{
    Environment, PlatformDecision, ProcessEnvironment, SUPPORTED_ARCHITECTURES, current_arch,
};
pub use process::{
    InterruptError, InterruptGuard, InterruptListener, NotifyError, ReadyNotifier,
    SystemInterruptListener, SystemdNotifier, run_node,
};
pub use readiness::{RaceOutcome, Termination, await_termination, race, race_within};
pub use signals::{EngineError, EngineSignals};
pub use standalone_engine::StandaloneEngineLauncher;
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;

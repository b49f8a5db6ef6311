//! Test harness utilities for the node bootstrap suites.

mod config_loader;
mod environment;
mod interrupts;
mod launcher;
mod notifier;
mod reporter;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use environment::MapEnvironment;
pub use interrupts::TestInterruptListener;
pub use launcher::{EngineScript, ScriptedLauncher};
pub use notifier::RecordingNotifier;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{NodeWorld, world};

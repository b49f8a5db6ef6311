//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use strata_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader that places the data directory under a temporary directory.
#[derive(Clone)]
pub struct TestConfigLoader {
    _scratch: Arc<TempDir>,
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let scratch = TempDir::new().expect("failed to create temporary directory");
        let data_dir = Utf8PathBuf::from_path_buf(scratch.path().join("node.strata"))
            .expect("temporary path was not valid UTF-8");
        Self {
            _scratch: Arc::new(scratch),
            config: Config {
                name: "node".to_owned(),
                data_dir: Some(data_dir),
                ..Config::default()
            },
        }
    }

    /// Data directory handed to the node.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        self.config.data_dir()
    }

    /// Adjusts the configuration before it is loaded.
    pub fn configure(&mut self, change: impl FnOnce(&mut Config)) {
        change(&mut self.config);
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("stratad"),
            OsString::from("--startup-timeout-ms"),
            OsString::from("soon"),
        ];
        Config::load_from_iter(args)
    }
}

//! In-memory process environment.

use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use crate::platform::Environment;

/// Environment backed by a shared map so tests can inspect what was taken.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    values: Arc<Mutex<HashMap<String, OsString>>>,
}

impl MapEnvironment {
    pub fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("environment mutex poisoned")
            .insert(key.to_owned(), OsString::from(value));
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values
            .lock()
            .expect("environment mutex poisoned")
            .contains_key(key)
    }
}

impl Environment for MapEnvironment {
    fn take(&self, key: &str) -> Option<OsString> {
        self.values
            .lock()
            .expect("environment mutex poisoned")
            .remove(key)
    }
}

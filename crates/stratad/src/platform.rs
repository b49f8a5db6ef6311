//! Pre-flight check that the node runs on a supported architecture.

use std::env;
use std::ffi::OsString;

use strata_config::UNSUPPORTED_ARCH_ENV_VAR;

/// Architectures the node is released for.
pub const SUPPORTED_ARCHITECTURES: [&str; 4] = ["amd64", "arm64", "ppc64le", "s390x"];

/// Outcome of the platform check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDecision {
    /// Architecture that was checked.
    pub arch: String,
    /// Whether the node may proceed.
    pub supported: bool,
    /// Whether support was granted only through the override variable.
    pub override_applied: bool,
}

/// Source of process environment values consumed during bootstrap.
pub trait Environment: Send + Sync {
    /// Reads `key` and removes it so it cannot be observed again.
    fn take(&self, key: &str) -> Option<OsString>;
}

/// [`Environment`] backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn take(&self, key: &str) -> Option<OsString> {
        let value = env::var_os(key);
        // SAFETY: the platform check runs on the bootstrap thread before the
        // engine or the interrupt listener spawn any threads.
        unsafe { env::remove_var(key) };
        value
    }
}

/// Returns the running architecture using the release identifiers
/// (`amd64`, `arm64`, ...) rather than Rust target names.
#[must_use]
pub fn current_arch() -> &'static str {
    canonical_arch(env::consts::ARCH, cfg!(target_endian = "little"))
}

fn canonical_arch(rust_arch: &'static str, little_endian: bool) -> &'static str {
    match rust_arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" if little_endian => "ppc64le",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Decides whether the node may run on `arch`.
///
/// The override variable is consumed by every call, whatever the outcome,
/// so neither later configuration layers nor child processes inherit it.
pub fn check(arch: &str, environment: &dyn Environment) -> PlatformDecision {
    let override_value = environment.take(UNSUPPORTED_ARCH_ENV_VAR);
    if SUPPORTED_ARCHITECTURES.contains(&arch) {
        return PlatformDecision {
            arch: arch.to_owned(),
            supported: true,
            override_applied: false,
        };
    }

    let override_applied = override_value.is_some_and(|value| value == arch);
    PlatformDecision {
        arch: arch.to_owned(),
        supported: override_applied,
        override_applied,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;

    #[derive(Default)]
    struct MapEnvironment {
        values: Mutex<HashMap<String, OsString>>,
    }

    impl MapEnvironment {
        fn with(key: &str, value: &str) -> Self {
            let environment = Self::default();
            environment
                .values
                .lock()
                .expect("environment mutex poisoned")
                .insert(key.to_owned(), OsString::from(value));
            environment
        }

        fn contains(&self, key: &str) -> bool {
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

    #[rstest]
    #[case("amd64")]
    #[case("arm64")]
    #[case("ppc64le")]
    #[case("s390x")]
    fn allow_listed_architectures_pass(#[case] arch: &str) {
        let decision = check(arch, &MapEnvironment::default());
        assert!(decision.supported);
        assert!(!decision.override_applied);
    }

    #[test]
    fn unsupported_architecture_without_override_fails() {
        let decision = check("riscv64", &MapEnvironment::default());
        assert!(!decision.supported);
        assert!(!decision.override_applied);
    }

    #[test]
    fn matching_override_is_applied_and_consumed() {
        let environment = MapEnvironment::with(UNSUPPORTED_ARCH_ENV_VAR, "riscv64");
        let decision = check("riscv64", &environment);
        assert!(decision.supported);
        assert!(decision.override_applied);
        assert!(!environment.contains(UNSUPPORTED_ARCH_ENV_VAR));
    }

    #[test]
    fn mismatched_override_is_consumed_and_rejected() {
        let environment = MapEnvironment::with(UNSUPPORTED_ARCH_ENV_VAR, "mips");
        let decision = check("riscv64", &environment);
        assert!(!decision.supported);
        assert!(!environment.contains(UNSUPPORTED_ARCH_ENV_VAR));
    }

    #[rstest]
    #[case("x86_64", true, "amd64")]
    #[case("aarch64", true, "arm64")]
    #[case("powerpc64", true, "ppc64le")]
    #[case("powerpc64", false, "ppc64")]
    #[case("s390x", false, "s390x")]
    #[case("riscv64", true, "riscv64")]
    fn maps_rust_architectures(
        #[case] rust_arch: &'static str,
        #[case] little_endian: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(canonical_arch(rust_arch, little_endian), expected);
    }
}

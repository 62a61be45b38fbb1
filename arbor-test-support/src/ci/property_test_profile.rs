//! Property-test run profile parsing for CI and local overrides.
//!
//! Tree-distance properties are quadratic in tree size per comparison, so the
//! profile bounds both the number of generated cases and the size of the
//! generated trees. Suites read one shared policy surface instead of each
//! parsing the environment themselves.

use std::env;

/// Environment variable controlling proptest case counts.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable controlling proptest process forking.
pub const ARBOR_PBT_FORK_ENV_KEY: &str = "ARBOR_PBT_FORK";
/// Environment variable bounding the node count of generated trees.
pub const ARBOR_PBT_MAX_NODES_ENV_KEY: &str = "ARBOR_PBT_MAX_NODES";

/// Largest tree size a profile accepts, whatever the environment asks for.
pub const MAX_TREE_NODES_CEILING: usize = 256;

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
    max_tree_nodes: usize,
}

impl ProptestRunProfile {
    /// Load a profile from environment variables with provided defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false, 12);
    /// assert!(profile.cases() > 0);
    /// assert!(profile.max_tree_nodes() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool, default_max_nodes: usize) -> Self {
        let cases = read_env_or_default(PROGTEST_CASES_ENV_KEY, default_cases, parse_cases);
        let fork = read_env_or_default(ARBOR_PBT_FORK_ENV_KEY, default_fork, parse_bool);
        let max_tree_nodes = read_env_or_default(
            ARBOR_PBT_MAX_NODES_ENV_KEY,
            default_max_nodes.clamp(1, MAX_TREE_NODES_CEILING),
            parse_max_nodes,
        );
        Self {
            cases,
            fork,
            max_tree_nodes,
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }

    /// Upper bound on the node count of a generated tree.
    #[must_use]
    pub fn max_tree_nodes(&self) -> usize {
        self.max_tree_nodes
    }
}

fn read_env_or_default<T, F>(key: &'static str, default: T, parser: F) -> T
where
    T: Copy,
    F: Fn(&str) -> Result<T, String>,
{
    match env::var(key) {
        Ok(raw) => match parser(&raw) {
            Ok(value) => value,
            Err(reason) => {
                tracing::warn!(
                    env = key,
                    raw = %raw,
                    reason = %reason,
                    "invalid property-test profile override; using default",
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    let parsed = raw
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("parse error: {error}"))?;
    if parsed == 0 {
        return Err("cases must be > 0".to_owned());
    }
    Ok(parsed)
}

fn parse_max_nodes(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .trim()
        .parse::<usize>()
        .map_err(|error| format!("parse error: {error}"))?;
    if parsed == 0 || parsed > MAX_TREE_NODES_CEILING {
        return Err(format!(
            "max nodes must be within 1..={MAX_TREE_NODES_CEILING}"
        ));
    }
    Ok(parsed)
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected one of: true/false/1/0/yes/no/on/off".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let original = env::var(key).ok();
            // SAFETY: tests serialize access with ENV_LOCK.
            unsafe { env::set_var(key, value) };
            Self { key, original }
        }

        fn unset(key: &'static str) -> Self {
            let original = env::var(key).ok();
            // SAFETY: tests serialize access with ENV_LOCK.
            unsafe { env::remove_var(key) };
            Self { key, original }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.original {
                // SAFETY: tests serialize access with ENV_LOCK.
                unsafe { env::set_var(self.key, value) };
            } else {
                // SAFETY: tests serialize access with ENV_LOCK.
                unsafe { env::remove_var(self.key) };
            }
        }
    }

    fn clear_all() -> [EnvGuard; 3] {
        [
            EnvGuard::unset(PROGTEST_CASES_ENV_KEY),
            EnvGuard::unset(ARBOR_PBT_FORK_ENV_KEY),
            EnvGuard::unset(ARBOR_PBT_MAX_NODES_ENV_KEY),
        ]
    }

    #[test]
    fn load_defaults_when_no_overrides_exist() {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();

        let profile = ProptestRunProfile::load(64, false, 10);
        assert_eq!(profile.cases(), 64);
        assert!(!profile.fork());
        assert_eq!(profile.max_tree_nodes(), 10);
    }

    #[test]
    fn default_max_nodes_is_clamped_to_ceiling() {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();

        let profile = ProptestRunProfile::load(8, false, 10_000);
        assert_eq!(profile.max_tree_nodes(), MAX_TREE_NODES_CEILING);
    }

    #[rstest]
    #[case("1", 1)]
    #[case("250", 250)]
    #[case("25000", 25_000)]
    fn load_accepts_valid_case_overrides(#[case] raw: &str, #[case] expected: u32) {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();
        let _cases = EnvGuard::set(PROGTEST_CASES_ENV_KEY, raw);

        let profile = ProptestRunProfile::load(64, false, 10);
        assert_eq!(profile.cases(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("abc")]
    fn load_rejects_invalid_case_overrides(#[case] raw: &str) {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();
        let _cases = EnvGuard::set(PROGTEST_CASES_ENV_KEY, raw);

        let profile = ProptestRunProfile::load(64, false, 10);
        assert_eq!(profile.cases(), 64);
    }

    #[rstest]
    #[case("true", true)]
    #[case("1", true)]
    #[case("on", true)]
    #[case("FALSE", false)]
    #[case("no", false)]
    fn load_accepts_valid_fork_overrides(#[case] raw: &str, #[case] expected: bool) {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();
        let _fork = EnvGuard::set(ARBOR_PBT_FORK_ENV_KEY, raw);

        let profile = ProptestRunProfile::load(64, !expected, 10);
        assert_eq!(profile.fork(), expected);
    }

    #[rstest]
    #[case("24", 24)]
    #[case(" 256 ", 256)]
    fn load_accepts_valid_max_node_overrides(#[case] raw: &str, #[case] expected: usize) {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();
        let _nodes = EnvGuard::set(ARBOR_PBT_MAX_NODES_ENV_KEY, raw);

        let profile = ProptestRunProfile::load(64, false, 10);
        assert_eq!(profile.max_tree_nodes(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("257")]
    #[case("many")]
    fn load_rejects_invalid_max_node_overrides(#[case] raw: &str) {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _guards = clear_all();
        let _nodes = EnvGuard::set(ARBOR_PBT_MAX_NODES_ENV_KEY, raw);

        let profile = ProptestRunProfile::load(64, false, 10);
        assert_eq!(profile.max_tree_nodes(), 10);
    }
}

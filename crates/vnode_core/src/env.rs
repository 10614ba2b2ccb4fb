use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Immutable snapshot of the variables the toolkit reads.
///
/// Configuration never touches `std::env` directly; it reads from a snapshot
/// so that loading is deterministic and testable without mutating the
/// process environment.
#[derive(Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Load `.env` from the working directory (if present), then snapshot the
    /// process environment. Variables already set in the process win over the
    /// file, matching `dotenv/config` behaviour.
    pub fn from_process() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("ignoring unreadable .env file: {e}"),
        }

        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `key`. Empty values are treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value of `key`, or `""` when unset.
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `true` only for the literal string `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

// Values may hold the mnemonic; only names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Environment").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_unset() {
        let env = Environment::from_pairs([("A", ""), ("B", "x")]);
        assert_eq!(env.get("A"), None);
        assert!(!env.is_set("A"));
        assert_eq!(env.get("B"), Some("x"));
        assert_eq!(env.get_or_empty("missing"), "");
    }

    #[test]
    fn flag_requires_literal_true() {
        let env = Environment::from_pairs([("T1", "true"), ("T2", "1"), ("T3", "TRUE")]);
        assert!(env.flag("T1"));
        assert!(!env.flag("T2"));
        assert!(!env.flag("T3"));
        assert!(!env.flag("T4"));
    }

    #[test]
    fn debug_hides_values() {
        let env = Environment::from_pairs([("MNEMONIC", "test test test junk")]);
        let printed = format!("{env:?}");
        assert!(printed.contains("MNEMONIC"));
        assert!(!printed.contains("junk"));
    }

    #[test]
    fn with_overrides_existing_value() {
        let env = Environment::from_pairs([("DEPLOY_NETWORK", "bsc")]).with("DEPLOY_NETWORK", "holesky");
        assert_eq!(env.get("DEPLOY_NETWORK"), Some("holesky"));
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use vnode_core::{ConfigError, Environment};

use crate::error::ChainError;
use crate::networks::{ChainKey, rpc_url};

/// Configuration for a single RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub chain: ChainKey,
    pub url: String,
    pub is_custom: bool,
    pub timeout_secs: u64,
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-chain RPC endpoints with custom override support.
///
/// Defaults come from [`rpc_url`] with the provider key the store was built
/// with; the key itself is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfigStore {
    configs: BTreeMap<ChainKey, RpcConfig>,
    #[serde(skip)]
    provider_key: String,
}

impl RpcConfigStore {
    /// Create a store populated with the derived URL of every chain.
    pub fn with_defaults(provider_key: &str) -> Self {
        let configs = ChainKey::ALL
            .into_iter()
            .map(|chain| {
                let rpc = RpcConfig {
                    chain,
                    url: rpc_url(chain, provider_key),
                    is_custom: false,
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                };
                (chain, rpc)
            })
            .collect();

        Self {
            configs,
            provider_key: provider_key.to_string(),
        }
    }

    /// Defaults plus any `RPC_URL_<KEY>` overrides found in `env`.
    pub fn from_env(env: &Environment, provider_key: &str) -> Result<Self, ConfigError> {
        let mut store = Self::with_defaults(provider_key);
        for chain in ChainKey::ALL {
            let var = override_var(chain);
            if let Some(url) = env.get(&var) {
                store
                    .set_custom_rpc(chain, url.to_string())
                    .map_err(|_| ConfigError::InvalidRpcOverride {
                        var: var.clone(),
                        url: url.to_string(),
                    })?;
            }
        }
        Ok(store)
    }

    /// Get the RPC configuration for a chain.
    pub fn get_rpc(&self, chain: ChainKey) -> Option<&RpcConfig> {
        self.configs.get(&chain)
    }

    /// Override the RPC URL for a chain with a custom endpoint.
    pub fn set_custom_rpc(&mut self, chain: ChainKey, url: String) -> Result<(), ChainError> {
        if !validate_url(&url) {
            return Err(ChainError::InvalidUrl(url));
        }

        let entry = self.entry(chain);
        entry.url = url;
        entry.is_custom = true;
        info!(chain = %chain, "custom RPC endpoint set");
        Ok(())
    }

    /// Reset a chain's RPC URL back to the derived default.
    pub fn reset_to_default(&mut self, chain: ChainKey) {
        let url = rpc_url(chain, &self.provider_key);
        let entry = self.entry(chain);
        entry.url = url;
        entry.is_custom = false;
    }

    fn entry(&mut self, chain: ChainKey) -> &mut RpcConfig {
        self.configs.entry(chain).or_insert_with(|| RpcConfig {
            chain,
            url: String::new(),
            is_custom: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

/// Name of the variable overriding `chain`'s endpoint, e.g. `RPC_URL_BSC_TESTNET`.
pub fn override_var(chain: ChainKey) -> String {
    format!(
        "RPC_URL_{}",
        chain.as_str().to_ascii_uppercase().replace('-', "_")
    )
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_chains() {
        let store = RpcConfigStore::with_defaults("key");
        for chain in ChainKey::ALL {
            assert!(store.get_rpc(chain).is_some(), "{chain} missing");
        }
    }

    #[test]
    fn defaults_are_not_custom() {
        let store = RpcConfigStore::with_defaults("key");
        for chain in [ChainKey::Mainnet, ChainKey::Bsc, ChainKey::Hardhat] {
            let rpc = store.get_rpc(chain).unwrap();
            assert!(!rpc.is_custom);
            assert_eq!(rpc.timeout_secs, DEFAULT_TIMEOUT_SECS);
        }
    }

    #[test]
    fn set_custom_rpc_marks_as_custom() {
        let mut store = RpcConfigStore::with_defaults("key");
        store
            .set_custom_rpc(ChainKey::Mainnet, "https://my-node.example.com".into())
            .unwrap();

        let rpc = store.get_rpc(ChainKey::Mainnet).unwrap();
        assert!(rpc.is_custom);
        assert_eq!(rpc.url, "https://my-node.example.com");
    }

    #[test]
    fn set_custom_rpc_rejects_invalid_url() {
        let mut store = RpcConfigStore::with_defaults("key");
        assert!(store.set_custom_rpc(ChainKey::Bsc, "not-a-url".into()).is_err());
        assert!(
            store
                .set_custom_rpc(ChainKey::Bsc, "ftp://files.example.com".into())
                .is_err()
        );
    }

    #[test]
    fn reset_to_default_restores_derived_url() {
        let mut store = RpcConfigStore::with_defaults("key");
        store
            .set_custom_rpc(ChainKey::Sepolia, "https://custom.example.com".into())
            .unwrap();

        store.reset_to_default(ChainKey::Sepolia);
        let after_reset = store.get_rpc(ChainKey::Sepolia).unwrap();
        assert_eq!(after_reset.url, "https://sepolia.infura.io/v3/key");
        assert!(!after_reset.is_custom);
    }

    #[test]
    fn override_var_names() {
        assert_eq!(override_var(ChainKey::BscTestnet), "RPC_URL_BSC_TESTNET");
        assert_eq!(override_var(ChainKey::Mainnet), "RPC_URL_MAINNET");
    }

    #[test]
    fn from_env_applies_overrides() {
        let env = Environment::from_pairs([("RPC_URL_BSC_TESTNET", "http://localhost:9545")]);
        let store = RpcConfigStore::from_env(&env, "key").unwrap();
        let rpc = store.get_rpc(ChainKey::BscTestnet).unwrap();
        assert_eq!(rpc.url, "http://localhost:9545");
        assert!(rpc.is_custom);
    }

    #[test]
    fn from_env_rejects_bad_override() {
        let env = Environment::from_pairs([("RPC_URL_HOLESKY", "file:///etc/passwd")]);
        let err = RpcConfigStore::from_env(&env, "key").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRpcOverride { .. }));
    }

    #[test]
    fn provider_key_is_not_serialized() {
        let store = RpcConfigStore::with_defaults("supersecret");
        let json = serde_json::to_value(&store).unwrap();
        assert!(json.get("provider_key").is_none());
    }

    #[test]
    fn validate_url_accepts_http_and_https() {
        assert!(validate_url("https://rpc.example.com"));
        assert!(validate_url("http://localhost:8545"));
    }

    #[test]
    fn validate_url_rejects_garbage() {
        assert!(!validate_url(""));
        assert!(!validate_url("not a url"));
        assert!(!validate_url("ftp://server.com"));
        assert!(!validate_url("file:///etc/passwd"));
    }
}

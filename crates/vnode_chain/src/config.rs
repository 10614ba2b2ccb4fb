use serde::Serialize;
use tracing::{debug, info};
use vnode_core::{
    CompilerSettings, ConfigError, Environment, ExplorerKeys, GasReporter, HdAccounts,
    ProjectConfig, ProjectPaths, Secrets, Typechain,
};

use crate::error::ChainError;
use crate::networks::{
    ChainKey, LOCAL_POLLING_INTERVAL_MS, NETWORK_TABLE, NetworkDescriptor, chain_config,
};
use crate::rpc_config::RpcConfigStore;

/// The fully assembled configuration handed to every command.
///
/// Built once per process by [`DeployConfig::load`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub project: ProjectConfig,
    pub secrets: Secrets,
    pub rpc: RpcConfigStore,
    networks: Vec<NetworkDescriptor>,
}

impl DeployConfig {
    /// Assemble configuration from `env`.
    ///
    /// Fails before anything else when the mnemonic or provider key is
    /// missing, and when the selected default network is not configured.
    pub fn load(env: &Environment) -> Result<Self, ChainError> {
        let secrets = Secrets::from_env(env)?;
        let project = ProjectConfig::from_env(env);
        let rpc = RpcConfigStore::from_env(env, secrets.provider_key.expose())?;

        let networks = NETWORK_TABLE
            .iter()
            .map(|&(name, chain)| build_network(name, chain, &secrets, &rpc))
            .collect();

        let config = Self {
            project,
            secrets,
            rpc,
            networks,
        };

        let default = config.default_network()?;
        info!(
            default_network = %default.name,
            chain_id = default.chain_id,
            networks = config.networks.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// All configured networks, in table order.
    pub fn networks(&self) -> &[NetworkDescriptor] {
        &self.networks
    }

    /// Look a network up by its configured name (`polygonAmoy`) or by the
    /// chain key it targets (`polygon-amoy`).
    pub fn network(&self, name: &str) -> Result<&NetworkDescriptor, ConfigError> {
        self.networks
            .iter()
            .find(|n| n.name == name)
            .or_else(|| self.networks.iter().find(|n| n.chain.as_str() == name))
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_string(),
                known: self
                    .networks
                    .iter()
                    .map(|n| n.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn default_network(&self) -> Result<&NetworkDescriptor, ConfigError> {
        self.network(&self.project.default_network)
    }

    /// `name` when given, otherwise the default network.
    pub fn select(&self, name: Option<&str>) -> Result<&NetworkDescriptor, ConfigError> {
        let network = match name {
            Some(n) => self.network(n)?,
            None => self.default_network()?,
        };
        debug!(network = %network.name, chain = %network.chain, "network selected");
        Ok(network)
    }

    /// Explorer API key for `chain`, if the chain has a verifier slot and the
    /// key is non-empty.
    pub fn explorer_key(&self, chain: ChainKey) -> Option<&str> {
        chain
            .explorer_slot()
            .and_then(|slot| self.project.etherscan.get(slot))
            .filter(|k| !k.is_empty())
    }

    /// Serializable view with every secret masked.
    pub fn redacted(&self) -> RedactedConfig {
        let provider_key = self.secrets.provider_key.expose();
        RedactedConfig {
            default_network: self.project.default_network.clone(),
            sourcify_enabled: self.project.sourcify_enabled,
            networks: self
                .networks
                .iter()
                .map(|n| RedactedNetwork {
                    name: n.name.clone(),
                    chain: n.chain,
                    chain_id: n.chain_id,
                    url: n.display_url(provider_key),
                    hd_path: n.accounts.path.clone(),
                    account_count: n.accounts.count,
                    polling_interval_ms: n.polling_interval_ms,
                })
                .collect(),
            etherscan: self.project.etherscan.masked(),
            gas_reporter: self.project.gas_reporter.clone(),
            paths: self.project.paths.clone(),
            solidity: self.project.solidity.clone(),
            typechain: self.project.typechain.clone(),
        }
    }

    /// The network's endpoint with the provider key masked, for display.
    pub fn display_url(&self, network: &NetworkDescriptor) -> String {
        network.display_url(self.secrets.provider_key.expose())
    }
}

fn build_network(
    name: &str,
    chain: ChainKey,
    secrets: &Secrets,
    rpc: &RpcConfigStore,
) -> NetworkDescriptor {
    let accounts = if chain == ChainKey::Hardhat {
        HdAccounts::local_node(secrets.mnemonic.clone())
    } else {
        HdAccounts::new(secrets.mnemonic.clone())
    };

    let mut descriptor = chain_config(name, chain, accounts, secrets.provider_key.expose());
    if let Some(rpc) = rpc.get_rpc(chain) {
        descriptor.url = rpc.url.clone();
    }
    if chain == ChainKey::Hardhat {
        descriptor.polling_interval_ms = Some(LOCAL_POLLING_INTERVAL_MS);
    }
    descriptor
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedNetwork {
    pub name: String,
    pub chain: ChainKey,
    pub chain_id: u64,
    pub url: String,
    pub hd_path: String,
    pub account_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_interval_ms: Option<u64>,
}

/// Configuration as printed by `vnode config`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedConfig {
    pub default_network: String,
    pub sourcify_enabled: bool,
    pub etherscan: ExplorerKeys,
    pub gas_reporter: GasReporter,
    pub paths: ProjectPaths,
    pub solidity: CompilerSettings,
    pub typechain: Typechain,
    pub networks: Vec<RedactedNetwork>,
}

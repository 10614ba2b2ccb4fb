use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::DeployConfig;
use crate::error::ChainError;
use crate::modules::DeploymentModule;
use crate::networks::{ChainKey, NetworkDescriptor};

/// Deployment id the external deployer journals under, e.g. `chain-97`.
pub fn deployment_id(chain_id: u64) -> String {
    format!("chain-{chain_id}")
}

/// A contract instantiation with its arguments rendered for the deployer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedContract {
    pub future_id: String,
    pub contract: String,
    pub constructor_args: Vec<Value>,
    pub abi_types: Vec<String>,
}

/// Everything the external deployment tool needs to run one module on one
/// network. Carries no secrets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub deployment_id: String,
    pub module: String,
    pub network: String,
    pub chain: ChainKey,
    pub chain_id: u64,
    pub rpc_url: String,
    pub contracts: Vec<PlannedContract>,
    pub generated_at: DateTime<Utc>,
}

impl DeploymentPlan {
    /// `rpc_url` is stored as given; pass an already-masked URL when the plan
    /// is meant for display.
    pub fn new(module: &DeploymentModule, network: &NetworkDescriptor, rpc_url: String) -> Self {
        let contracts = module
            .futures
            .iter()
            .map(|f| PlannedContract {
                future_id: f.id.clone(),
                contract: f.contract.clone(),
                constructor_args: f.args.iter().map(|a| a.to_json()).collect(),
                abi_types: f.args.iter().map(|a| a.abi_type().to_string()).collect(),
            })
            .collect();

        Self {
            deployment_id: deployment_id(network.chain_id),
            module: module.id.clone(),
            network: network.name.clone(),
            chain: network.chain,
            chain_id: network.chain_id,
            rpc_url,
            contracts,
            generated_at: Utc::now(),
        }
    }

    /// Plan for display: the provider key in the RPC URL is masked.
    pub fn for_display(
        config: &DeployConfig,
        module: &DeploymentModule,
        network: &NetworkDescriptor,
    ) -> Self {
        Self::new(module, network, config.display_url(network))
    }

    /// `<dir>/chain-<id>/<module>.plan.json`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.deployment_id)
            .join(format!("{}.plan.json", self.module))
    }

    /// Write the plan as pretty JSON under `dir`, creating directories as
    /// needed. Returns the file path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ChainError> {
        let path = self.path_in(dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!(
            module = %self.module,
            deployment_id = %self.deployment_id,
            path = %path.display(),
            "deployment plan written"
        );
        Ok(path)
    }
}

/// What the external verifier needs to verify a deployment on a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTarget {
    pub deployment_id: String,
    pub network: String,
    pub explorer_slot: Option<&'static str>,
    pub explorer_url: Option<&'static str>,
    pub has_api_key: bool,
}

impl VerifyTarget {
    pub fn new(config: &DeployConfig, network: &NetworkDescriptor) -> Self {
        Self {
            deployment_id: deployment_id(network.chain_id),
            network: network.name.clone(),
            explorer_slot: network.chain.explorer_slot(),
            explorer_url: network.chain.explorer_url(),
            has_api_key: config.explorer_key(network.chain).is_some(),
        }
    }

    /// Whether the verifier can run: the chain has a slot and a key is set.
    pub fn is_verifiable(&self) -> bool {
        self.explorer_slot.is_some() && self.has_api_key
    }
}

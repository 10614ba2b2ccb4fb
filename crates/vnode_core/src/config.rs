use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::Environment;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Environment variable names
// ---------------------------------------------------------------------------

pub const VAR_MNEMONIC: &str = "MNEMONIC";
pub const VAR_PROVIDER_KEY: &str = "INFURA_API_KEY";
pub const VAR_TESTING: &str = "TESTING";
pub const VAR_DEPLOY_NETWORK: &str = "DEPLOY_NETWORK";
pub const VAR_REPORT_GAS: &str = "REPORT_GAS";

const VAR_ARBISCAN: &str = "ARBISCAN_API_KEY";
const VAR_SNOWTRACE: &str = "SNOWTRACE_API_KEY";
const VAR_BSCSCAN: &str = "BSCSCAN_API_KEY";
const VAR_ETHERSCAN: &str = "ETHERSCAN_API_KEY";
const VAR_OPTIMISM: &str = "OPTIMISM_API_KEY";
const VAR_POLYGONSCAN: &str = "POLYGONSCAN_API_KEY";

/// Network used when `TESTING=true`.
pub const TEST_NETWORK: &str = "hardhat";
/// Network used when neither `TESTING` nor `DEPLOY_NETWORK` is set.
pub const FALLBACK_NETWORK: &str = "sepolia";

pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";
pub const DEFAULT_ACCOUNT_COUNT: u32 = 10;
/// Account count the local development node derives when only a mnemonic is given.
pub const LOCAL_NODE_ACCOUNT_COUNT: u32 = 20;

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// A string that never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form used for display.
    pub fn masked(&self) -> String {
        mask_key(&self.0)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Mask a key for display, keeping only the last four characters of long keys.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".into();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}

/// Required secrets. Loading fails before anything else is assembled.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub mnemonic: Secret,
    pub provider_key: Secret,
}

impl Secrets {
    /// Read `MNEMONIC` and `INFURA_API_KEY`, failing on the first one missing.
    pub fn from_env(env: &Environment) -> Result<Self, ConfigError> {
        let mnemonic = env
            .get(VAR_MNEMONIC)
            .ok_or(ConfigError::MissingMnemonic)?;
        let provider_key = env
            .get(VAR_PROVIDER_KEY)
            .ok_or(ConfigError::MissingProviderKey)?;

        Ok(Self {
            mnemonic: Secret::new(mnemonic),
            provider_key: Secret::new(provider_key),
        })
    }
}

/// HD account derivation parameters for a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdAccounts {
    pub mnemonic: Secret,
    pub path: String,
    pub count: u32,
}

impl HdAccounts {
    /// Standard Ethereum derivation path with ten accounts.
    pub fn new(mnemonic: Secret) -> Self {
        Self {
            mnemonic,
            path: DEFAULT_HD_PATH.into(),
            count: DEFAULT_ACCOUNT_COUNT,
        }
    }

    /// Parameters the local development node applies to a bare mnemonic.
    pub fn local_node(mnemonic: Secret) -> Self {
        Self {
            count: LOCAL_NODE_ACCOUNT_COUNT,
            ..Self::new(mnemonic)
        }
    }

    /// Full derivation path of every account, `path/0` through `path/(count-1)`.
    pub fn derivation_paths(&self) -> Vec<String> {
        (0..self.count)
            .map(|i| format!("{}/{i}", self.path))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Explorer verification keys
// ---------------------------------------------------------------------------

/// Block-explorer API keys keyed by the verifier's network slot.
///
/// Most slots default to an empty string; `sepolia` and `holesky` stay absent
/// when `ETHERSCAN_API_KEY` is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerKeys {
    pub arbitrum_one: String,
    pub avalanche: String,
    pub bsc_testnet: String,
    pub bsc: String,
    pub mainnet: String,
    pub optimistic_ethereum: String,
    pub polygon: String,
    pub polygon_amoy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sepolia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holesky: Option<String>,
}

impl ExplorerKeys {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            arbitrum_one: env.get_or_empty(VAR_ARBISCAN),
            avalanche: env.get_or_empty(VAR_SNOWTRACE),
            bsc_testnet: env.get_or_empty(VAR_BSCSCAN),
            bsc: env.get_or_empty(VAR_BSCSCAN),
            mainnet: env.get_or_empty(VAR_ETHERSCAN),
            optimistic_ethereum: env.get_or_empty(VAR_OPTIMISM),
            polygon: env.get_or_empty(VAR_POLYGONSCAN),
            polygon_amoy: env.get_or_empty(VAR_POLYGONSCAN),
            sepolia: env.get(VAR_ETHERSCAN).map(str::to_string),
            holesky: env.get(VAR_ETHERSCAN).map(str::to_string),
        }
    }

    /// Key for a verifier slot name such as `"bscTestnet"`.
    /// `None` for unknown slots and for absent optional keys.
    pub fn get(&self, slot: &str) -> Option<&str> {
        match slot {
            "arbitrumOne" => Some(&self.arbitrum_one),
            "avalanche" => Some(&self.avalanche),
            "bscTestnet" => Some(&self.bsc_testnet),
            "bsc" => Some(&self.bsc),
            "mainnet" => Some(&self.mainnet),
            "optimisticEthereum" => Some(&self.optimistic_ethereum),
            "polygon" => Some(&self.polygon),
            "polygonAmoy" => Some(&self.polygon_amoy),
            "sepolia" => self.sepolia.as_deref(),
            "holesky" => self.holesky.as_deref(),
            _ => None,
        }
    }

    /// Copy with every key masked.
    pub fn masked(&self) -> Self {
        Self {
            arbitrum_one: mask_key(&self.arbitrum_one),
            avalanche: mask_key(&self.avalanche),
            bsc_testnet: mask_key(&self.bsc_testnet),
            bsc: mask_key(&self.bsc),
            mainnet: mask_key(&self.mainnet),
            optimistic_ethereum: mask_key(&self.optimistic_ethereum),
            polygon: mask_key(&self.polygon),
            polygon_amoy: mask_key(&self.polygon_amoy),
            sepolia: self.sepolia.as_deref().map(mask_key),
            holesky: self.holesky.as_deref().map(mask_key),
        }
    }
}

// ---------------------------------------------------------------------------
// Build settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasReporter {
    pub currency: String,
    pub enabled: bool,
    pub exclude_contracts: Vec<String>,
    pub src: String,
    /// Gas price in wei.
    pub gas_price: u64,
}

impl GasReporter {
    /// Enabled whenever `REPORT_GAS` holds any non-empty value.
    pub fn from_env(env: &Environment) -> Self {
        Self {
            enabled: env.is_set(VAR_REPORT_GAS),
            ..Self::default()
        }
    }
}

impl Default for GasReporter {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            enabled: false,
            exclude_contracts: Vec::new(),
            src: "./contracts".into(),
            gas_price: 100_000_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    pub version: String,
    pub bytecode_hash: String,
    pub optimizer_enabled: bool,
    pub optimizer_runs: u32,
    #[serde(rename = "viaIR")]
    pub via_ir: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            version: "0.8.22".into(),
            bytecode_hash: "none".into(),
            optimizer_enabled: true,
            optimizer_runs: 200,
            via_ir: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPaths {
    pub artifacts: PathBuf,
    pub cache: PathBuf,
    pub sources: PathBuf,
    pub tests: PathBuf,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            artifacts: "./artifacts".into(),
            cache: "./cache".into(),
            sources: "./contracts".into(),
            tests: "./test".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typechain {
    pub out_dir: PathBuf,
    pub target: String,
}

impl Default for Typechain {
    fn default() -> Self {
        Self {
            out_dir: "src/types".into(),
            target: "ethers-v5".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

/// Select the default network.
///
/// `TESTING=true` forces the local node; otherwise `DEPLOY_NETWORK` wins,
/// falling back to sepolia.
pub fn default_network(env: &Environment) -> String {
    if env.flag(VAR_TESTING) {
        return TEST_NETWORK.into();
    }
    env.get(VAR_DEPLOY_NETWORK)
        .unwrap_or(FALLBACK_NETWORK)
        .to_string()
}

/// Everything about the project that does not depend on the network table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub default_network: String,
    pub etherscan: ExplorerKeys,
    pub gas_reporter: GasReporter,
    pub paths: ProjectPaths,
    pub solidity: CompilerSettings,
    pub typechain: Typechain,
    pub sourcify_enabled: bool,
}

impl ProjectConfig {
    pub fn from_env(env: &Environment) -> Self {
        let config = Self {
            default_network: default_network(env),
            etherscan: ExplorerKeys::from_env(env),
            gas_reporter: GasReporter::from_env(env),
            paths: ProjectPaths::default(),
            solidity: CompilerSettings::default(),
            typechain: Typechain::default(),
            sourcify_enabled: false,
        };
        debug!(
            default_network = %config.default_network,
            gas_report = config.gas_reporter.enabled,
            "project config assembled"
        );
        config
    }

    /// Returns the base directory for local state: `~/.vnode/`
    pub fn base_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".vnode"))
    }

    /// Returns the log directory: `~/.vnode/logs/`
    pub fn logs_dir() -> Result<PathBuf, ConfigError> {
        Ok(Self::base_dir()?.join("logs"))
    }
}

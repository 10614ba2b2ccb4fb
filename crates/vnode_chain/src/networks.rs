use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vnode_core::HdAccounts;
use vnode_core::config::mask_key;

use crate::error::ChainError;

/// Local development node endpoint.
pub const LOCAL_NODE_URL: &str = "http://127.0.0.1:8545";
/// Block polling interval on the local development network.
pub const LOCAL_POLLING_INTERVAL_MS: u64 = 8000;

/// Supported blockchain networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainKey {
    ArbitrumMainnet,
    Avalanche,
    Bsc,
    Hardhat,
    Mainnet,
    OptimismMainnet,
    PolygonMainnet,
    PolygonAmoy,
    Sepolia,
    Holesky,
    KyotoTestnet,
    AuroraTestnet,
    AuroraMainnet,
    BscTestnet,
}

impl ChainKey {
    pub const ALL: [ChainKey; 14] = [
        ChainKey::ArbitrumMainnet,
        ChainKey::Avalanche,
        ChainKey::Bsc,
        ChainKey::Hardhat,
        ChainKey::Mainnet,
        ChainKey::OptimismMainnet,
        ChainKey::PolygonMainnet,
        ChainKey::PolygonAmoy,
        ChainKey::Sepolia,
        ChainKey::Holesky,
        ChainKey::KyotoTestnet,
        ChainKey::AuroraTestnet,
        ChainKey::AuroraMainnet,
        ChainKey::BscTestnet,
    ];

    /// Canonical key, also the Infura subdomain for Infura-backed chains.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainKey::ArbitrumMainnet => "arbitrum-mainnet",
            ChainKey::Avalanche => "avalanche",
            ChainKey::Bsc => "bsc",
            ChainKey::Hardhat => "hardhat",
            ChainKey::Mainnet => "mainnet",
            ChainKey::OptimismMainnet => "optimism-mainnet",
            ChainKey::PolygonMainnet => "polygon-mainnet",
            ChainKey::PolygonAmoy => "polygon-amoy",
            ChainKey::Sepolia => "sepolia",
            ChainKey::Holesky => "holesky",
            ChainKey::KyotoTestnet => "kyoto-testnet",
            ChainKey::AuroraTestnet => "aurora-testnet",
            ChainKey::AuroraMainnet => "aurora-mainnet",
            ChainKey::BscTestnet => "bsc-testnet",
        }
    }

    /// EIP-155 chain ID.
    pub fn chain_id(&self) -> u64 {
        match self {
            ChainKey::ArbitrumMainnet => 42161,
            ChainKey::Avalanche => 43114,
            ChainKey::Bsc => 56,
            ChainKey::Hardhat => 31337,
            ChainKey::Mainnet => 1,
            ChainKey::OptimismMainnet => 10,
            ChainKey::PolygonMainnet => 137,
            ChainKey::PolygonAmoy => 80002,
            ChainKey::Sepolia => 11155111,
            ChainKey::Holesky => 17000,
            ChainKey::KyotoTestnet => 1998,
            ChainKey::AuroraTestnet => 1313161555,
            ChainKey::AuroraMainnet => 1313161554,
            ChainKey::BscTestnet => 97,
        }
    }

    /// Verifier slot holding this chain's explorer API key, if any.
    pub fn explorer_slot(&self) -> Option<&'static str> {
        match self {
            ChainKey::ArbitrumMainnet => Some("arbitrumOne"),
            ChainKey::Avalanche => Some("avalanche"),
            ChainKey::Bsc => Some("bsc"),
            ChainKey::BscTestnet => Some("bscTestnet"),
            ChainKey::Mainnet => Some("mainnet"),
            ChainKey::OptimismMainnet => Some("optimisticEthereum"),
            ChainKey::PolygonMainnet => Some("polygon"),
            ChainKey::PolygonAmoy => Some("polygonAmoy"),
            ChainKey::Sepolia => Some("sepolia"),
            ChainKey::Holesky => Some("holesky"),
            ChainKey::Hardhat
            | ChainKey::KyotoTestnet
            | ChainKey::AuroraTestnet
            | ChainKey::AuroraMainnet => None,
        }
    }

    /// Block-explorer browser URL, `None` for the local node.
    pub fn explorer_url(&self) -> Option<&'static str> {
        let url = match self {
            ChainKey::ArbitrumMainnet => "https://arbiscan.io",
            ChainKey::Avalanche => "https://snowtrace.io",
            ChainKey::Bsc => "https://bscscan.com",
            ChainKey::BscTestnet => "https://testnet.bscscan.com",
            ChainKey::Mainnet => "https://etherscan.io",
            ChainKey::OptimismMainnet => "https://optimistic.etherscan.io",
            ChainKey::PolygonMainnet => "https://polygonscan.com",
            ChainKey::PolygonAmoy => "https://amoy.polygonscan.com",
            ChainKey::Sepolia => "https://sepolia.etherscan.io",
            ChainKey::Holesky => "https://holesky.etherscan.io",
            ChainKey::KyotoTestnet => "https://testnet.kyotoscan.io",
            ChainKey::AuroraTestnet => "https://explorer.testnet.aurora.dev",
            ChainKey::AuroraMainnet => "https://explorer.aurora.dev",
            ChainKey::Hardhat => return None,
        };
        Some(url)
    }

    /// Whether the chain's endpoint is built from the provider key.
    pub fn uses_provider_key(&self) -> bool {
        fixed_rpc_url(*self).is_none()
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainKey {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainKey::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ChainError::UnknownChain(s.to_string()))
    }
}

fn fixed_rpc_url(chain: ChainKey) -> Option<&'static str> {
    match chain {
        ChainKey::Avalanche => Some("https://api.avax.network/ext/bc/C/rpc"),
        ChainKey::Bsc => Some("https://bsc-dataseed1.binance.org"),
        ChainKey::BscTestnet => Some("https://bsc-testnet-dataseed.bnbchain.org"),
        ChainKey::AuroraTestnet => Some("https://testnet.aurora.dev"),
        ChainKey::AuroraMainnet => Some("https://mainnet.aurora.dev"),
        ChainKey::KyotoTestnet => Some("https://rpc.testnet.kyotoprotocol.io:8545"),
        ChainKey::Hardhat => Some(LOCAL_NODE_URL),
        _ => None,
    }
}

/// JSON-RPC endpoint for a chain. Chains without a public endpoint go
/// through Infura using `provider_key`.
pub fn rpc_url(chain: ChainKey, provider_key: &str) -> String {
    match fixed_rpc_url(chain) {
        Some(url) => url.to_string(),
        None => format!("https://{}.infura.io/v3/{provider_key}", chain.as_str()),
    }
}

/// Connection descriptor for one configured network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub name: String,
    pub chain: ChainKey,
    pub chain_id: u64,
    pub url: String,
    pub accounts: HdAccounts,
    pub polling_interval_ms: Option<u64>,
}

impl NetworkDescriptor {
    pub fn is_local(&self) -> bool {
        self.chain == ChainKey::Hardhat
    }

    /// The endpoint URL with a trailing `/v3/<provider_key>` segment masked.
    ///
    /// Only provider-keyed chains are touched; custom overrides that do not
    /// end in the key are returned unchanged.
    pub fn display_url(&self, provider_key: &str) -> String {
        if provider_key.is_empty() || !self.chain.uses_provider_key() {
            return self.url.clone();
        }
        match self.url.strip_suffix(&format!("/v3/{provider_key}")) {
            Some(base) => format!("{base}/v3/{}", mask_key(provider_key)),
            None => self.url.clone(),
        }
    }
}

/// Derive the connection descriptor for `chain` under the network `name`.
pub fn chain_config(
    name: &str,
    chain: ChainKey,
    accounts: HdAccounts,
    provider_key: &str,
) -> NetworkDescriptor {
    NetworkDescriptor {
        name: name.to_string(),
        chain,
        chain_id: chain.chain_id(),
        url: rpc_url(chain, provider_key),
        accounts,
        polling_interval_ms: None,
    }
}

/// Configured network names and the chain each one targets, in table order.
pub const NETWORK_TABLE: [(&str, ChainKey); 14] = [
    ("hardhat", ChainKey::Hardhat),
    ("arbitrum", ChainKey::ArbitrumMainnet),
    ("avalanche", ChainKey::Avalanche),
    ("bsc", ChainKey::Bsc),
    ("mainnet", ChainKey::Mainnet),
    ("optimism", ChainKey::OptimismMainnet),
    ("polygon-mainnet", ChainKey::PolygonMainnet),
    ("polygonAmoy", ChainKey::PolygonAmoy),
    ("kyoto-testnet", ChainKey::KyotoTestnet),
    ("aurora-testnet", ChainKey::AuroraTestnet),
    ("bsc-testnet", ChainKey::BscTestnet),
    ("aurora-mainnet", ChainKey::AuroraMainnet),
    ("sepolia", ChainKey::Sepolia),
    ("holesky", ChainKey::Holesky),
];

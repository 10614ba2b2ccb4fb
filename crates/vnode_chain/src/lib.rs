// Network table, deployment units and chain checks for the vnode contracts.

pub mod config;
pub mod error;
pub mod modules;
pub mod networks;
pub mod plan;
pub mod rpc;
pub mod rpc_config;

// Re-export primary types for convenient access.
pub use config::{DeployConfig, RedactedConfig};
pub use error::ChainError;
pub use modules::{Address, ConstructorArg, ContractFuture, DeploymentModule, ModuleBuilder};
pub use networks::{ChainKey, NetworkDescriptor, chain_config, rpc_url};
pub use plan::{DeploymentPlan, VerifyTarget};
pub use rpc::{check_network, fetch_chain_id};
pub use rpc_config::{RpcConfig, RpcConfigStore, validate_url};

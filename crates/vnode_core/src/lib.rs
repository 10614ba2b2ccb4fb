pub mod config;
pub mod env;
pub mod error;
pub mod logging;

pub use config::{
    CompilerSettings, ExplorerKeys, GasReporter, HdAccounts, ProjectConfig, ProjectPaths, Secret,
    Secrets, Typechain, default_network,
};
pub use env::Environment;
pub use error::{ConfigError, ErrorCategory, VnodeError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures while assembling configuration from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please set your MNEMONIC in a .env file")]
    MissingMnemonic,

    #[error("Please set your INFURA_API_KEY in a .env file")]
    MissingProviderKey,

    #[error("unknown network '{name}' (known networks: {known})")]
    UnknownNetwork { name: String, known: String },

    #[error("invalid RPC URL in {var}: {url}")]
    InvalidRpcOverride { var: String, url: String },

    #[error("could not determine home directory")]
    NoHomeDir,
}

/// Top-level error type rendered by the command line.
#[derive(Error, Debug)]
pub enum VnodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain error: {0}")]
    Chain(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Deployment error: {0}")]
    Deployment(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of errors for logging and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Invalid or missing configuration.
    ConfigError,
    /// Bad input on the command line (unknown module, unknown chain).
    UserError,
    /// RPC endpoint unreachable or returned something unexpected.
    NetworkError,
    /// Disk or serialization failure.
    SystemError,
}

impl VnodeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::ConfigError,
            Self::Chain(_) | Self::Deployment(_) => ErrorCategory::UserError,
            Self::Rpc(_) => ErrorCategory::NetworkError,
            Self::FileSystem(_) | Self::Internal(_) => ErrorCategory::SystemError,
        }
    }

    /// Message suitable for the terminal.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Chain(msg) => msg.clone(),
            Self::Rpc(msg) => format!("RPC request failed: {msg}"),
            Self::Deployment(msg) => format!("Deployment plan error: {msg}"),
            Self::FileSystem(e) => format!("File error: {e}"),
            Self::Internal(_) => "An unexpected error occurred.".into(),
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::ConfigError => 78,
            ErrorCategory::UserError => 64,
            ErrorCategory::NetworkError => 69,
            ErrorCategory::SystemError => 70,
        }
    }
}

impl From<serde_json::Error> for VnodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_messages_are_descriptive() {
        assert_eq!(
            ConfigError::MissingMnemonic.to_string(),
            "Please set your MNEMONIC in a .env file"
        );
        assert_eq!(
            ConfigError::MissingProviderKey.to_string(),
            "Please set your INFURA_API_KEY in a .env file"
        );
    }

    #[test]
    fn config_errors_map_to_config_category() {
        let err = VnodeError::from(ConfigError::MissingMnemonic);
        assert_eq!(err.category(), ErrorCategory::ConfigError);
        assert_eq!(err.user_message(), "Please set your MNEMONIC in a .env file");
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = VnodeError::Internal("stack trace here".into());
        assert_eq!(err.category(), ErrorCategory::SystemError);
        assert!(!err.user_message().contains("stack trace"));
    }

    #[test]
    fn rpc_errors_are_network_errors() {
        let err = VnodeError::Rpc("connection refused".into());
        assert_eq!(err.category(), ErrorCategory::NetworkError);
        assert!(err.user_message().contains("connection refused"));
    }
}

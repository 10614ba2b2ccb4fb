use thiserror::Error;
use vnode_core::{ConfigError, VnodeError};

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("unknown chain '{0}'")]
    UnknownChain(String),

    #[error("unknown deployment module '{name}' (available: {available})")]
    UnknownModule { name: String, available: String },

    #[error("invalid address '{0}': expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),

    #[error("chain id mismatch: configured {expected}, endpoint reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("RPC request to {url} failed: {reason}")]
    Rpc { url: String, reason: String },

    #[error("failed to write deployment plan: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode deployment plan: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ChainError> for VnodeError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::Config(c) => VnodeError::Config(c),
            ChainError::Io(io) => VnodeError::FileSystem(io),
            ChainError::Rpc { .. } | ChainError::ChainIdMismatch { .. } => {
                VnodeError::Rpc(e.to_string())
            }
            ChainError::UnknownModule { .. } | ChainError::InvalidAddress(_) => {
                VnodeError::Deployment(e.to_string())
            }
            ChainError::Encode(_) => VnodeError::Internal(e.to_string()),
            ChainError::UnknownChain(_) | ChainError::InvalidUrl(_) => {
                VnodeError::Chain(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnode_core::ErrorCategory;

    #[test]
    fn mismatch_maps_to_network_category() {
        let err: VnodeError = ChainError::ChainIdMismatch {
            expected: 97,
            actual: 56,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NetworkError);
        assert!(err.user_message().contains("configured 97"));
    }

    #[test]
    fn config_errors_pass_through() {
        let err: VnodeError = ChainError::Config(ConfigError::MissingProviderKey).into();
        assert_eq!(err.category(), ErrorCategory::ConfigError);
    }

    #[test]
    fn unknown_module_is_user_error() {
        let err: VnodeError = ChainError::UnknownModule {
            name: "Nope".into(),
            available: "VnodeModule".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::UserError);
    }
}

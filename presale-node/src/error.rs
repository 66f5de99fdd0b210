use presale_ledger::EngineError;
use presale_types::error::LedgerError;
use thiserror::Error;

/// Errors that can occur in the node.
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum NodeError {
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("ledger error: {0}")]
    LedgerError(#[from] EngineError),

    #[error("storage error: {0}")]
    StorageError(#[from] presale_storage::error::StorageError),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<LedgerError> for NodeError {
    fn from(e: LedgerError) -> Self {
        NodeError::LedgerError(EngineError::Rejected(e))
    }
}

impl NodeError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        NodeError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// The ledger rule that rejected a command, if that is what failed.
    pub fn rejection(&self) -> Option<&LedgerError> {
        match self {
            NodeError::LedgerError(e) => e.as_rejection(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = NodeError::ConfigError {
            reason: "missing field".to_string(),
        };
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_rejection_passes_through() {
        let err: NodeError = LedgerError::Paused.into();
        assert_eq!(err.rejection(), Some(&LedgerError::Paused));
        assert!(err.to_string().contains("paused"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let node_err: NodeError = io_err.into();
        assert!(matches!(node_err, NodeError::IoError(_)));
        assert!(node_err.rejection().is_none());
    }
}

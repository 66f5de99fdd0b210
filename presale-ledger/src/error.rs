use presale_storage::error::StorageError;
use presale_types::error::LedgerError;
use thiserror::Error;

/// Failures of the engine as a whole, as opposed to rule rejections.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] LedgerError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("persisted state is inconsistent: {reason}")]
    CorruptState { reason: String },
}

impl EngineError {
    /// The rule violation behind this error, if it is one.
    pub fn as_rejection(&self) -> Option<&LedgerError> {
        match self {
            EngineError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

use thiserror::Error;

/// Errors raised by a storage backend or by entity (de)serialization.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read error: {reason}")]
    ReadError { reason: String },

    #[error("Write error: {reason}")]
    WriteError { reason: String },

    #[error("SQLite error: {reason}")]
    SqliteError { reason: String },

    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    #[error("Deserialization error: {reason}")]
    DeserializationError { reason: String },

    #[error("Malformed key under prefix {prefix}: {len} bytes")]
    MalformedKey { prefix: String, len: usize },

    #[error("Schema version mismatch: store is v{stored}, binary expects v{expected}")]
    SchemaMismatch { stored: u32, expected: u32 },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::SqliteError {
            reason: err.to_string(),
        }
    }
}

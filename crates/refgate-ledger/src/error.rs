//! Error types for refgate-ledger.

use thiserror::Error;

use crate::id::UserId;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An inviter tried to credit itself.
    #[error("user {0} cannot refer itself")]
    SelfReferral(UserId),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

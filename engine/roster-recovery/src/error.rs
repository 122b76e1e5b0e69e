//! Error types for snapshot and undo operations

use roster_store::StoreError;
use thiserror::Error;

/// Result type alias for recovery operations
pub type Result<T> = std::result::Result<T, RecoveryError>;

/// Errors that can occur while snapshotting or restoring the dataset
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// I/O errors (snapshot files, undo directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store rejected a restore step
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A snapshot's foreign keys cannot resolve; restoring it would produce
    /// dangling references
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// A snapshot entry that cannot be understood
    #[error("Snapshot corruption: {0}")]
    Corruption(String),
}

impl RecoveryError {
    /// Create a new integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    /// Create a new corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}

//! Error types for the roster store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the store and repository layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input rejected before any write happened
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Row not found
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u32 },

    /// Invalid operation for the row's current lifecycle state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Referential integrity violation
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl StoreError {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found(kind: &'static str, id: u32) -> Self {
        Self::NotFound { kind, id }
    }

    /// Create a new invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create a new integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}

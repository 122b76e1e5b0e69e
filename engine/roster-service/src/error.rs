//! Error type unifying the service's collaborators

use roster_recovery::RecoveryError;
use roster_store::StoreError;
use thiserror::Error;
use valuation_engine::ValuationError;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced by the mutation orchestrator
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store and repository errors
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Snapshot and undo errors
    #[error("{0}")]
    Recovery(#[from] RecoveryError),

    /// Batch valuation failures
    #[error("{0}")]
    Valuation(#[from] ValuationError),
}

//! Error types for the valuation passes

use roster_store::StoreError;
use thiserror::Error;

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// A whole batch pass failed; the store may be left partially updated.
/// The documented recovery path is restoring the undo snapshot taken
/// immediately before the pass.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// `recompute_full` could not run to completion
    #[error("full valuation recompute failed: {source}")]
    FullRecompute {
        #[source]
        source: StoreError,
    },

    /// `recompute_quotes_only` could not run to completion
    #[error("quotes-only recompute failed: {source}")]
    QuotesOnly {
        #[source]
        source: StoreError,
    },
}

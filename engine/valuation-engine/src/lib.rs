//! # Valuation Engine
//!
//! Pure recompute logic over the player collection given an externally
//! observed price map. Two passes exist:
//!
//! - **recompute_full**: accumulates the quotation delta into `dq`, walks
//!   the investment basis through the band table one unit at a time, and
//!   derives the release value
//! - **recompute_quotes_only**: refreshes quotations and the top-division
//!   flag without touching any basis field
//!
//! Callers are expected to take an undo snapshot before either pass; on a
//! batch failure the store may be partially updated and the snapshot is the
//! recovery path.

pub mod bands;
pub mod engine;
pub mod error;

pub use bands::{step_basis, Band, BasisWalk, BANDS, BASIS_FLOOR};
pub use engine::{recompute_full, recompute_quotes_only, PassOutcome, PriceMap};
pub use error::{Result, ValuationError};

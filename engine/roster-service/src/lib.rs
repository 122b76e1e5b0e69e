//! # Roster Service
//!
//! The mutation orchestrator gluing the store, the valuation engine, and
//! the recovery core together. Every mutating entry point snapshots the
//! dataset onto the undo stack before touching it; `undo()` is the single
//! recovery path and restores the whole dataset from the newest snapshot.

pub mod config;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use service::RosterService;

/// Re-export the collaborator surface the CLI needs
pub use roster_recovery::UndoOutcome;
pub use roster_store::{Dataset, EntityId, Player, Record, Store, Team};
pub use valuation_engine::{PassOutcome, PriceMap};

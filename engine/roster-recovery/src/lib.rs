//! # Roster Recovery
//!
//! Whole-dataset state recovery: the snapshot codec and the undo stack.
//!
//! ## Architecture
//!
//! - **SnapshotDocument**: immutable image of every row of both
//!   collections, in the exchange format shared with manual export/import
//! - **codec**: serialize the dataset, and restore it with explicit
//!   foreign-key-aware ordering (wipe players then teams, reinsert teams
//!   then players)
//! - **UndoStack**: LIFO sequence of snapshots on disk; pushing snapshots
//!   the current state, popping restores and consumes the newest entry

pub mod codec;
pub mod error;
pub mod undo;

pub use codec::{
    apply, export_to_path, import_from_path, read_document, snapshot, write_document,
    SnapshotDocument,
};
pub use error::{RecoveryError, Result};
pub use undo::{UndoOutcome, UndoStack};

//! # Roster Store
//!
//! Entity model, storage backends, and the soft-delete repository for the
//! fantasy roster manager.
//!
//! ## Architecture
//!
//! - **Store**: the single handle to the dataset, threaded explicitly
//!   through every component (no ambient session state)
//! - **StorageBackend**: abstract commit target, with file-based and
//!   in-memory implementations
//! - **Repository**: per-entity-type CRUD plus the three-state lifecycle
//!   (active / recoverable / purged), committing on every mutation

pub mod error;
pub mod model;
pub mod repository;
pub mod store;

pub use error::{Result, StoreError};
pub use model::{Dataset, EntityId, Player, Record, Team};
pub use repository::Repository;
pub use store::{LocalStorage, MemoryStorage, StorageBackend, Store};

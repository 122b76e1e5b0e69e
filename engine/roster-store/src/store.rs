//! Store handle and storage backends
//!
//! The `Store` is the single handle to the persistent dataset, threaded
//! explicitly through every component. Backends decide where commits land:
//! `LocalStorage` rewrites one JSON document on disk, `MemoryStorage` keeps
//! the committed image in memory for tests.

use crate::error::{Result, StoreError};
use crate::model::{Dataset, Player, Record, Team};
use crate::repository::Repository;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Abstract storage backend for the dataset
pub trait StorageBackend: Send {
    /// Load the committed dataset, `None` when nothing was ever committed
    fn load(&self) -> Result<Option<Dataset>>;

    /// Durably replace the committed dataset
    fn persist(&self, dataset: &Dataset) -> Result<()>;
}

/// File-based storage: the whole dataset as one JSON document
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a backend writing to the given path, creating parent
    /// directories as needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        Ok(Self { path })
    }

    /// Path of the backing document
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StorageBackend for LocalStorage {
    fn load(&self) -> Result<Option<Dataset>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(StoreError::Io)?;
        let reader = BufReader::new(file);
        let dataset: Dataset = serde_json::from_reader(reader).map_err(StoreError::Serialization)?;

        Ok(Some(dataset))
    }

    fn persist(&self, dataset: &Dataset) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(StoreError::Io)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, dataset).map_err(StoreError::Serialization)?;
        writer.flush().map_err(StoreError::Io)?;

        Ok(())
    }
}

/// In-memory storage backend (for testing)
pub struct MemoryStorage {
    committed: Mutex<Option<Dataset>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self { committed: Mutex::new(None) }
    }

    /// The last committed image, if any
    pub fn committed(&self) -> Option<Dataset> {
        self.committed.lock().expect("storage mutex poisoned").clone()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<Dataset>> {
        Ok(self.committed.lock().expect("storage mutex poisoned").clone())
    }

    fn persist(&self, dataset: &Dataset) -> Result<()> {
        *self.committed.lock().expect("storage mutex poisoned") = Some(dataset.clone());
        Ok(())
    }
}

/// The single handle to the dataset
///
/// All reads and writes go through this handle; mutations are made visible
/// to the backend by `commit`. The repositories commit after every mutation,
/// batch collaborators (valuation, snapshot restore) mutate many rows and
/// commit once at their transactional boundaries.
pub struct Store {
    dataset: Dataset,
    backend: Box<dyn StorageBackend>,
}

impl Store {
    /// Open a store on the given backend, loading the committed dataset
    /// or starting empty
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let dataset = backend.load()?.unwrap_or_default();

        tracing::info!(
            teams = dataset.teams.len(),
            players = dataset.players.len(),
            "store opened"
        );

        Ok(Self { dataset, backend })
    }

    /// Open a file-backed store
    pub fn open_local(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Box::new(LocalStorage::new(path)?))
    }

    /// Fresh store on an in-memory backend
    pub fn in_memory() -> Self {
        Self { dataset: Dataset::default(), backend: Box::new(MemoryStorage::new()) }
    }

    /// The current (possibly uncommitted) dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Mutable access for batch collaborators. The soft-delete partition is
    /// repository-owned: batch code must not toggle `deleted` flags.
    pub fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }

    /// Durably persist the current dataset through the backend
    pub fn commit(&mut self) -> Result<()> {
        self.backend.persist(&self.dataset)
    }

    /// Repository over one entity collection
    pub fn repo<R: Record>(&mut self) -> Repository<'_, R> {
        Repository::new(self)
    }

    /// Repository over the team collection
    pub fn teams(&mut self) -> Repository<'_, Team> {
        self.repo()
    }

    /// Repository over the player collection
    pub fn players(&mut self) -> Repository<'_, Player> {
        self.repo()
    }

    /// Next free id for an entity type (max existing + 1)
    pub(crate) fn next_id<R: Record>(&self) -> u32 {
        R::rows(&self.dataset).iter().map(Record::id).max().unwrap_or(0) + 1
    }
}

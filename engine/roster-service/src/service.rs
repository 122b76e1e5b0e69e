//! Mutation orchestrator
//!
//! Every mutating entry point follows the same discipline: push an undo
//! snapshot, then delegate, then let the delegate commit at its own
//! transactional boundary. The only recovery path after a failed batch is
//! `undo()`, which restores the whole dataset from the snapshot taken just
//! before the batch started.

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use roster_recovery::{self as recovery, UndoOutcome, UndoStack};
use roster_store::{EntityId, Record, Store};
use serde_json::Value;
use std::path::Path;
use valuation_engine::{PassOutcome, PriceMap};

/// Single-writer handle over the store and its undo stack.
///
/// All operations run synchronously to completion; callers must not
/// interleave two snapshot-then-mutate sequences.
pub struct RosterService {
    store: Store,
    undo: UndoStack,
}

impl RosterService {
    /// Wire a service from an already-open store and undo stack
    pub fn new(store: Store, undo: UndoStack) -> Self {
        Self { store, undo }
    }

    /// Open the file-backed service described by the configuration
    pub fn open(config: &ServiceConfig) -> Result<Self> {
        config.validate().map_err(ServiceError::Config)?;

        let store = Store::open_local(config.store_path())?;
        let undo = UndoStack::new(config.undo_dir())?;

        Ok(Self { store, undo })
    }

    // ---- read views -------------------------------------------------------

    /// Rows in the active partition
    pub fn list_active<R: Record>(&mut self) -> Vec<R> {
        self.store.repo::<R>().list_active().into_iter().cloned().collect()
    }

    /// Rows in the recoverable partition
    pub fn list_deleted<R: Record>(&mut self) -> Vec<R> {
        self.store.repo::<R>().list_deleted().into_iter().cloned().collect()
    }

    /// Look up one row in either partition
    pub fn get<R: Record>(&mut self, id: EntityId) -> Result<R> {
        Ok(self.store.repo::<R>().get(id)?.clone())
    }

    /// Entries currently on the undo stack
    pub fn undo_depth(&self) -> Result<usize> {
        Ok(self.undo.depth()?)
    }

    // ---- snapshot-first mutations ----------------------------------------

    /// Insert a new row
    pub fn create<R: Record>(&mut self, row: R) -> Result<R> {
        self.undo.push(&self.store)?;
        Ok(self.store.repo::<R>().create(row)?)
    }

    /// Replace one named field of a row
    pub fn update_field<R: Record>(&mut self, id: EntityId, field: &str, value: Value) -> Result<R> {
        self.undo.push(&self.store)?;
        Ok(self.store.repo::<R>().update_field(id, field, value)?)
    }

    /// Move a row into the recoverable partition
    pub fn soft_delete<R: Record>(&mut self, id: EntityId) -> Result<R> {
        self.undo.push(&self.store)?;
        Ok(self.store.repo::<R>().soft_delete(id)?)
    }

    /// Move a row back into the active partition
    pub fn restore<R: Record>(&mut self, id: EntityId) -> Result<R> {
        self.undo.push(&self.store)?;
        Ok(self.store.repo::<R>().restore(id)?)
    }

    /// Permanently remove a soft-deleted row
    pub fn purge<R: Record>(&mut self, id: EntityId) -> Result<()> {
        self.undo.push(&self.store)?;
        Ok(self.store.repo::<R>().hard_delete(id)?)
    }

    /// Full valuation recompute over the active players
    pub fn recompute_full(&mut self, prices: &PriceMap) -> Result<PassOutcome> {
        self.undo.push(&self.store)?;
        Ok(valuation_engine::recompute_full(&mut self.store, prices)?)
    }

    /// Quotes-only recompute over the active players
    pub fn recompute_quotes_only(&mut self, prices: &PriceMap) -> Result<PassOutcome> {
        self.undo.push(&self.store)?;
        Ok(valuation_engine::recompute_quotes_only(&mut self.store, prices)?)
    }

    /// Replace the dataset from an exported snapshot document
    pub fn import(&mut self, path: &Path) -> Result<()> {
        self.undo.push(&self.store)?;
        Ok(recovery::import_from_path(&mut self.store, path)?)
    }

    // ---- recovery ---------------------------------------------------------

    /// Restore the whole dataset from the most recent snapshot, consuming it
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        Ok(self.undo.pop_and_restore(&mut self.store)?)
    }

    /// Export the dataset to a snapshot document (read-only, no snapshot
    /// pushed)
    pub fn export(&self, path: &Path) -> Result<()> {
        Ok(recovery::export_to_path(&self.store, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_store::{Player, Team};
    use serde_json::json;
    use tempfile::TempDir;

    fn service() -> (TempDir, RosterService) {
        let dir = TempDir::new().unwrap();
        let store = Store::in_memory();
        let undo = UndoStack::new(dir.path().join("undo_stack")).unwrap();
        (dir, RosterService::new(store, undo))
    }

    fn prices(entries: &[(&str, i64)]) -> PriceMap {
        entries.iter().map(|(n, p)| (n.to_string(), *p)).collect()
    }

    #[test]
    fn every_mutation_is_preceded_by_a_snapshot() {
        let (_dir, mut service) = service();

        let team = service.create(Team::named("Longobarda")).unwrap();
        assert_eq!(service.undo_depth().unwrap(), 1);

        service.update_field::<Team>(team.id, "fm", json!(250)).unwrap();
        assert_eq!(service.undo_depth().unwrap(), 2);

        service.soft_delete::<Team>(team.id).unwrap();
        assert_eq!(service.undo_depth().unwrap(), 3);
    }

    #[test]
    fn undo_rolls_back_the_latest_mutation() {
        let (_dir, mut service) = service();

        let team = service.create(Team::named("Longobarda")).unwrap();
        service.update_field::<Team>(team.id, "fm", json!(250)).unwrap();

        assert_eq!(service.get::<Team>(team.id).unwrap().fm, 250);

        service.undo().unwrap();
        assert_eq!(service.get::<Team>(team.id).unwrap().fm, 0);

        service.undo().unwrap();
        assert!(service.list_active::<Team>().is_empty());

        assert_eq!(service.undo().unwrap(), UndoOutcome::NothingToRestore);
    }

    #[test]
    fn recompute_full_can_be_rolled_back_wholesale() {
        let (_dir, mut service) = service();

        let mut player = Player::named("Hernanes");
        player.spesa = 49;
        player.quotazione = 10;
        let player = service.create(player).unwrap();

        service.recompute_full(&prices(&[("Hernanes", 12)])).unwrap();
        assert_eq!(service.get::<Player>(player.id).unwrap().valore_svincolo, 88);

        // The batch pushed its own snapshot: one undo returns every player
        // to the pre-batch state
        service.undo().unwrap();
        let rolled_back = service.get::<Player>(player.id).unwrap();
        assert_eq!(rolled_back.valore_svincolo, 0);
        assert_eq!(rolled_back.quotazione, 10);
        assert_eq!(rolled_back.dq, 0);
    }

    #[test]
    fn import_is_undoable() {
        let (dir, mut service) = service();
        let backup = dir.path().join("backup.json");

        service.create(Team::named("Exported")).unwrap();
        service.export(&backup).unwrap();

        service.create(Team::named("Added After Export")).unwrap();
        service.import(&backup).unwrap();
        assert_eq!(service.list_active::<Team>().len(), 1);

        service.undo().unwrap();
        assert_eq!(service.list_active::<Team>().len(), 2);
    }

    #[test]
    fn purge_respects_referential_integrity() {
        let (_dir, mut service) = service();

        let team = service.create(Team::named("Longobarda")).unwrap();
        let mut player = Player::named("Speroni");
        player.squadra_id = Some(team.id);
        service.create(player).unwrap();

        service.soft_delete::<Team>(team.id).unwrap();
        assert!(service.purge::<Team>(team.id).is_err());
    }

    #[test]
    fn open_wires_the_configured_paths() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig::new(dir.path());

        let mut service = RosterService::open(&config).unwrap();
        service.create(Team::named("Persisted")).unwrap();

        assert!(config.store_path().exists());
        assert!(config.undo_dir().exists());

        let mut reopened = RosterService::open(&config).unwrap();
        assert_eq!(reopened.list_active::<Team>().len(), 1);
    }
}

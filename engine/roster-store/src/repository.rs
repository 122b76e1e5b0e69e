//! Soft-delete repository
//!
//! One repository per entity type, generic over `Record`. Rows live in one
//! of two partitions: active (`deleted == false`) or recoverable
//! (`deleted == true`); hard deletion removes a row for good and is only
//! legal from the recoverable partition. Every mutating call validates,
//! applies, and commits immediately; callers needing atomicity across calls
//! wrap them at a higher level.

use crate::error::{Result, StoreError};
use crate::model::{EntityId, Record};
use crate::store::Store;
use serde_json::Value;
use std::marker::PhantomData;

/// Fields the repository owns and refuses to edit through `update_field`:
/// identity never changes, and the partition moves only through
/// `soft_delete` / `restore` / `hard_delete`.
const LOCKED_FIELDS: [&str; 2] = ["id", "deleted"];

/// CRUD and lifecycle operations over one entity collection
pub struct Repository<'s, R: Record> {
    store: &'s mut Store,
    _entity: PhantomData<R>,
}

impl<'s, R: Record> Repository<'s, R> {
    pub(crate) fn new(store: &'s mut Store) -> Self {
        Self { store, _entity: PhantomData }
    }

    /// Rows in the active partition
    pub fn list_active(&self) -> Vec<&R> {
        R::rows(self.store.dataset()).iter().filter(|r| !r.deleted()).collect()
    }

    /// Rows in the recoverable partition
    pub fn list_deleted(&self) -> Vec<&R> {
        R::rows(self.store.dataset()).iter().filter(|r| r.deleted()).collect()
    }

    /// Look up a row by id in either partition
    pub fn get(&self, id: EntityId) -> Result<&R> {
        R::rows(self.store.dataset())
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(R::KIND, id))
    }

    /// Insert a new row into the active partition. The repository assigns
    /// the id; any id on the incoming row is ignored.
    pub fn create(&mut self, mut row: R) -> Result<R> {
        row.set_id(self.store.next_id::<R>());
        row.set_deleted(false);
        row.validate(self.store.dataset())?;

        tracing::debug!(kind = R::KIND, id = row.id(), nome = row.nome(), "creating row");

        R::rows_mut(self.store.dataset_mut()).push(row.clone());
        self.store.commit()?;

        Ok(row)
    }

    /// Replace one named field of a row with a new value and commit.
    ///
    /// The row round-trips through its JSON object form so the caller can
    /// address fields exactly as they appear in the exchange format. A value
    /// of the wrong shape, an unknown field name, or a post-edit validation
    /// failure aborts before any write.
    pub fn update_field(&mut self, id: EntityId, field: &str, value: Value) -> Result<R> {
        if LOCKED_FIELDS.contains(&field) {
            return Err(StoreError::validation(format!(
                "field '{field}' is not editable"
            )));
        }

        let dataset = self.store.dataset();
        let idx = R::rows(dataset)
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;

        let mut doc = serde_json::to_value(&R::rows(dataset)[idx])?;
        let Value::Object(ref mut fields) = doc else {
            return Err(StoreError::validation(format!("{} row is not a field map", R::KIND)));
        };

        if !fields.contains_key(field) {
            return Err(StoreError::validation(format!(
                "{} has no field named '{field}'",
                R::KIND
            )));
        }
        fields.insert(field.to_string(), value);

        let updated: R = serde_json::from_value(doc).map_err(|e| {
            StoreError::validation(format!("invalid value for {} field '{field}': {e}", R::KIND))
        })?;
        updated.validate(self.store.dataset())?;

        tracing::debug!(kind = R::KIND, id, field, "updating field");

        R::rows_mut(self.store.dataset_mut())[idx] = updated.clone();
        self.store.commit()?;

        Ok(updated)
    }

    /// Move a row from the active to the recoverable partition
    pub fn soft_delete(&mut self, id: EntityId) -> Result<R> {
        let row = self.get(id)?;
        if row.deleted() {
            return Err(StoreError::invalid_operation(format!(
                "{} {id} is already deleted",
                R::KIND
            )));
        }

        self.set_deleted_flag(id, true)
    }

    /// Move a row from the recoverable partition back to the active one
    pub fn restore(&mut self, id: EntityId) -> Result<R> {
        let row = self.get(id)?;
        if !row.deleted() {
            return Err(StoreError::invalid_operation(format!(
                "{} {id} is not deleted",
                R::KIND
            )));
        }

        self.set_deleted_flag(id, false)
    }

    /// Permanently remove a row. Only legal from the recoverable partition;
    /// irreversible.
    pub fn hard_delete(&mut self, id: EntityId) -> Result<()> {
        let row = self.get(id)?;
        if !row.deleted() {
            return Err(StoreError::invalid_operation(format!(
                "{} {id} must be soft-deleted before it can be purged",
                R::KIND
            )));
        }
        row.check_purgeable(self.store.dataset())?;

        tracing::info!(kind = R::KIND, id, "purging row");

        R::rows_mut(self.store.dataset_mut()).retain(|r| r.id() != id);
        self.store.commit()
    }

    /// Mutable iteration over the active partition for batch collaborators.
    /// Does not commit; the batch owner commits at its transactional
    /// boundary.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut R> + '_ {
        R::rows_mut(self.store.dataset_mut()).iter_mut().filter(|r| !r.deleted())
    }

    fn set_deleted_flag(&mut self, id: EntityId, deleted: bool) -> Result<R> {
        tracing::info!(kind = R::KIND, id, deleted, "moving row between partitions");

        let row = R::rows_mut(self.store.dataset_mut())
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
        row.set_deleted(deleted);
        let row = row.clone();

        self.store.commit()?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Player, Team};
    use serde_json::json;

    fn store_with_team(nome: &str) -> (Store, EntityId) {
        let mut store = Store::in_memory();
        let team = store.teams().create(Team::named(nome)).unwrap();
        (store, team.id)
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let mut store = Store::in_memory();
        let a = store.teams().create(Team::named("Alpha")).unwrap();
        let b = store.teams().create(Team::named("Beta")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn create_rejects_duplicate_name_without_writing() {
        let (mut store, _) = store_with_team("Alpha");

        let err = store.teams().create(Team::named("Alpha")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.dataset().teams.len(), 1);
    }

    #[test]
    fn every_row_is_in_exactly_one_partition() {
        let (mut store, id) = store_with_team("Alpha");

        let mut teams = store.teams();
        assert_eq!(teams.list_active().len(), 1);
        assert_eq!(teams.list_deleted().len(), 0);

        teams.soft_delete(id).unwrap();
        let mut teams = store.teams();
        assert_eq!(teams.list_active().len(), 0);
        assert_eq!(teams.list_deleted().len(), 1);

        teams.restore(id).unwrap();
        let teams = store.teams();
        assert_eq!(teams.list_active().len(), 1);
        assert_eq!(teams.list_deleted().len(), 0);
    }

    #[test]
    fn soft_delete_twice_is_an_invalid_operation() {
        let (mut store, id) = store_with_team("Alpha");

        store.teams().soft_delete(id).unwrap();
        let err = store.teams().soft_delete(id).unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
    }

    #[test]
    fn hard_delete_requires_the_recoverable_partition() {
        let (mut store, id) = store_with_team("Alpha");

        let err = store.teams().hard_delete(id).unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));

        store.teams().soft_delete(id).unwrap();
        store.teams().hard_delete(id).unwrap();
        assert!(store.dataset().teams.is_empty());
    }

    #[test]
    fn purging_a_referenced_team_is_an_integrity_error() {
        let (mut store, team_id) = store_with_team("Alpha");

        let mut player = Player::named("Osimhen");
        player.squadra_id = Some(team_id);
        store.players().create(player).unwrap();

        store.teams().soft_delete(team_id).unwrap();
        let err = store.teams().hard_delete(team_id).unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));

        // Still present and still recoverable
        assert_eq!(store.teams().list_deleted().len(), 1);
    }

    #[test]
    fn update_field_edits_by_exchange_format_name() {
        let (mut store, _) = store_with_team("Alpha");

        let mut player = Player::named("Kvaratskhelia");
        player.quotazione = 30;
        let player = store.players().create(player).unwrap();

        let updated = store
            .players()
            .update_field(player.id, "fascia", json!("Top"))
            .unwrap();
        assert_eq!(updated.fascia, "Top");

        let updated = store.players().update_field(player.id, "spesa", json!(120)).unwrap();
        assert_eq!(updated.spesa, 120);
    }

    #[test]
    fn update_field_rejects_unknown_and_locked_fields() {
        let (mut store, id) = store_with_team("Alpha");

        let err = store.teams().update_field(id, "prezzo", json!(5)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        for locked in ["id", "deleted"] {
            let err = store.teams().update_field(id, locked, json!(9)).unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
        }
    }

    #[test]
    fn update_field_rejects_ill_typed_values_before_writing() {
        let (mut store, id) = store_with_team("Alpha");

        let err = store.teams().update_field(id, "fm", json!("plenty")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.teams().get(id).unwrap().fm, 0);
    }

    #[test]
    fn update_field_enforces_spesa_floor() {
        let (mut store, _) = store_with_team("Alpha");
        let player = store.players().create(Player::named("Leao")).unwrap();

        let err = store.players().update_field(player.id, "spesa", json!(0)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.players().get(player.id).unwrap().spesa, 1);
    }

    #[test]
    fn update_field_can_clear_a_loan_with_null() {
        let (mut store, team_id) = store_with_team("Alpha");
        let loan_team = store.teams().create(Team::named("Beta")).unwrap();

        let mut player = Player::named("Pulisic");
        player.squadra_id = Some(team_id);
        player.in_prestito_a = Some(loan_team.id);
        let player = store.players().create(player).unwrap();

        let updated = store
            .players()
            .update_field(player.id, "in_prestito_a", Value::Null)
            .unwrap();
        assert_eq!(updated.in_prestito_a, None);
    }
}

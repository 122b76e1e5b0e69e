//! Snapshot codec: whole-dataset serialize and restore
//!
//! A snapshot is an immutable image of every row of both collections at the
//! moment it was taken. Restore replaces the entire dataset: wipe players
//! then teams, commit, reinsert teams then players, commit. The ordering is
//! load-bearing — players reference teams by foreign key, and nothing below
//! the codec enforces it.

use crate::error::{Result, RecoveryError};
use chrono::{DateTime, Utc};
use roster_store::{EntityId, Player, Store, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// An immutable whole-dataset image in the exchange format: two named
/// collections whose field names match the entity attributes exactly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Unique identifier for this snapshot
    pub id: Uuid,

    /// Timestamp when the snapshot was taken
    pub created_at: DateTime<Utc>,

    /// Every team row, soft-deleted included, in insertion order
    pub teams: Vec<Team>,

    /// Every player row, soft-deleted included, in insertion order
    pub players: Vec<Player>,
}

impl SnapshotDocument {
    /// Check the document's internal referential integrity: every player
    /// foreign key must resolve to a team row inside the same document.
    pub fn validate(&self) -> Result<()> {
        let team_ids: HashSet<EntityId> = self.teams.iter().map(|t| t.id).collect();

        for player in &self.players {
            for (field, target) in
                [("squadra_id", player.squadra_id), ("in_prestito_a", player.in_prestito_a)]
            {
                if let Some(team_id) = target {
                    if !team_ids.contains(&team_id) {
                        return Err(RecoveryError::integrity(format!(
                            "player {} '{}': {field} references team {team_id}, \
                             which is not part of the snapshot",
                            player.id, player.nome
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Serialize the current dataset into a snapshot
pub fn snapshot(store: &Store) -> SnapshotDocument {
    let dataset = store.dataset();

    SnapshotDocument {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        teams: dataset.teams.clone(),
        players: dataset.players.clone(),
    }
}

/// Replace the entire dataset with the snapshot's contents.
///
/// The document is validated before anything is written; an unresolvable
/// foreign key fails the restore and leaves the store untouched. The wipe
/// commits as its own transactional step before reinsertion begins.
pub fn apply(store: &mut Store, doc: &SnapshotDocument) -> Result<()> {
    doc.validate()?;

    // Delete players before teams
    let dataset = store.dataset_mut();
    dataset.players.clear();
    dataset.teams.clear();
    store.commit()?;

    // Reinsert teams before players so the foreign keys resolve
    let dataset = store.dataset_mut();
    dataset.teams = doc.teams.clone();
    dataset.players = doc.players.clone();
    store.commit()?;

    tracing::info!(
        snapshot = %doc.id,
        teams = doc.teams.len(),
        players = doc.players.len(),
        "dataset restored from snapshot"
    );

    Ok(())
}

/// Write a snapshot document to a file
pub fn write_document(doc: &SnapshotDocument, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(RecoveryError::Io)?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, doc).map_err(RecoveryError::Serialization)?;
    writer.flush().map_err(RecoveryError::Io)?;

    Ok(())
}

/// Read a snapshot document from a file
pub fn read_document(path: &Path) -> Result<SnapshotDocument> {
    let file = File::open(path).map_err(RecoveryError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(RecoveryError::Serialization)
}

/// Manual whole-dataset export
pub fn export_to_path(store: &Store, path: &Path) -> Result<()> {
    let doc = snapshot(store);
    write_document(&doc, path)?;

    tracing::info!(?path, teams = doc.teams.len(), players = doc.players.len(), "dataset exported");

    Ok(())
}

/// Manual whole-dataset import; goes through the same integrity gate as any
/// other restore
pub fn import_from_path(store: &mut Store, path: &Path) -> Result<()> {
    let doc = read_document(path)?;
    apply(store, &doc)
}

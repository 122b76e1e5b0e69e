//! Undo stack: an ordered, persistent sequence of snapshots
//!
//! One JSON document per entry, named by a zero-padded sequence number so
//! that the most recent entry is the numerically greatest. The stack treats
//! every snapshot as an opaque whole-dataset image; it never looks at
//! individual fields. Entries are written once and never edited; popping an
//! entry consumes it.

use crate::codec;
use crate::error::{Result, RecoveryError};
use roster_store::Store;
use std::path::{Path, PathBuf};

/// Outcome of an undo request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The entry with this sequence number was applied and consumed
    Restored(u64),

    /// The stack was empty; the dataset was left untouched. A normal
    /// result, not a fault.
    NothingToRestore,
}

/// LIFO stack of snapshots on persistent storage
pub struct UndoStack {
    dir: PathBuf,
}

impl UndoStack {
    /// Open (creating if needed) a stack rooted at the given directory.
    /// The sequence numbering resumes from whatever entries already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(RecoveryError::Io)?;

        Ok(Self { dir })
    }

    /// The stack's backing directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot the current state and append it as the newest entry,
    /// returning its sequence number
    pub fn push(&self, store: &Store) -> Result<u64> {
        let sequence = match self.entries()?.last() {
            Some((last, _)) => last + 1,
            None => 1,
        };

        let doc = codec::snapshot(store);
        codec::write_document(&doc, &self.entry_path(sequence))?;

        tracing::info!(sequence, snapshot = %doc.id, "undo snapshot pushed");

        Ok(sequence)
    }

    /// Apply the newest entry to the store and consume it.
    ///
    /// Repeated calls walk further back in history one step at a time. The
    /// entry is removed only after the restore succeeded, so a failed
    /// restore leaves the stack (and the chance to retry) intact.
    pub fn pop_and_restore(&self, store: &mut Store) -> Result<UndoOutcome> {
        let Some((sequence, path)) = self.entries()?.pop() else {
            tracing::info!("undo stack is empty, nothing to restore");
            return Ok(UndoOutcome::NothingToRestore);
        };

        let doc = codec::read_document(&path)?;
        codec::apply(store, &doc)?;

        std::fs::remove_file(&path).map_err(RecoveryError::Io)?;

        tracing::info!(sequence, "undo entry consumed");

        Ok(UndoOutcome::Restored(sequence))
    }

    /// Number of entries currently on the stack
    pub fn depth(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    /// All entries, ordered oldest to newest by parsed sequence number (not
    /// lexicographically, so the zero-pad width never matters)
    fn entries(&self) -> Result<Vec<(u64, PathBuf)>> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(&self.dir).map_err(RecoveryError::Io)? {
            let path = entry.map_err(RecoveryError::Io)?.path();

            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let sequence: u64 = stem.parse().map_err(|_| {
                RecoveryError::corruption(format!(
                    "undo entry {} has a non-numeric sequence name",
                    path.display()
                ))
            })?;

            entries.push((sequence, path));
        }

        entries.sort_by_key(|(sequence, _)| *sequence);

        Ok(entries)
    }

    fn entry_path(&self, sequence: u64) -> PathBuf {
        self.dir.join(format!("{sequence:05}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_store::{Player, Team};
    use serde_json::json;
    use tempfile::TempDir;

    fn stack() -> (TempDir, UndoStack) {
        let dir = TempDir::new().unwrap();
        let stack = UndoStack::new(dir.path().join("undo_stack")).unwrap();
        (dir, stack)
    }

    fn seeded_store() -> Store {
        let mut store = Store::in_memory();
        let team = store.teams().create(Team::named("Longobarda")).unwrap();

        let mut player = Player::named("Speroni");
        player.squadra_id = Some(team.id);
        store.players().create(player).unwrap();

        store
    }

    #[test]
    fn push_then_pop_round_trips_arbitrary_mutations() {
        let (_dir, stack) = stack();
        let mut store = seeded_store();
        let image = store.dataset().clone();

        stack.push(&store).unwrap();

        store.teams().create(Team::named("Upstart")).unwrap();
        let player_id = store.dataset().players[0].id;
        store.players().update_field(player_id, "dq", json!(-7)).unwrap();
        store.players().soft_delete(player_id).unwrap();

        let outcome = stack.pop_and_restore(&mut store).unwrap();
        assert_eq!(outcome, UndoOutcome::Restored(1));
        assert_eq!(*store.dataset(), image);
        assert_eq!(stack.depth().unwrap(), 0);
    }

    #[test]
    fn empty_stack_is_a_benign_result() {
        let (_dir, stack) = stack();
        let mut store = seeded_store();
        let image = store.dataset().clone();

        let outcome = stack.pop_and_restore(&mut store).unwrap();
        assert_eq!(outcome, UndoOutcome::NothingToRestore);
        assert_eq!(*store.dataset(), image);
    }

    #[test]
    fn repeated_undo_walks_back_one_level_at_a_time() {
        let (_dir, stack) = stack();
        let mut store = seeded_store();
        let first = store.dataset().clone();

        stack.push(&store).unwrap();
        store.teams().create(Team::named("Second")).unwrap();
        let second = store.dataset().clone();

        stack.push(&store).unwrap();
        store.teams().create(Team::named("Third")).unwrap();

        assert_eq!(stack.pop_and_restore(&mut store).unwrap(), UndoOutcome::Restored(2));
        assert_eq!(*store.dataset(), second);

        assert_eq!(stack.pop_and_restore(&mut store).unwrap(), UndoOutcome::Restored(1));
        assert_eq!(*store.dataset(), first);

        assert_eq!(stack.pop_and_restore(&mut store).unwrap(), UndoOutcome::NothingToRestore);
    }

    #[test]
    fn sequence_numbering_survives_reopening_the_stack() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store();

        let stack = UndoStack::new(dir.path()).unwrap();
        assert_eq!(stack.push(&store).unwrap(), 1);
        assert_eq!(stack.push(&store).unwrap(), 2);

        let reopened = UndoStack::new(dir.path()).unwrap();
        assert_eq!(reopened.push(&store).unwrap(), 3);
        assert_eq!(reopened.depth().unwrap(), 3);
    }

    #[test]
    fn popping_consumes_the_newest_entry_file() {
        let (_dir, stack) = stack();
        let mut store = seeded_store();

        stack.push(&store).unwrap();
        stack.push(&store).unwrap();

        stack.pop_and_restore(&mut store).unwrap();
        assert_eq!(stack.depth().unwrap(), 1);
        assert!(stack.dir().join("00001.json").exists());
        assert!(!stack.dir().join("00002.json").exists());
    }

    #[test]
    fn foreign_sequence_names_are_reported_as_corruption() {
        let (_dir, stack) = stack();
        std::fs::write(stack.dir().join("not-a-number.json"), "{}").unwrap();

        let err = stack.depth().unwrap_err();
        assert!(matches!(err, RecoveryError::Corruption(_)));
    }
}

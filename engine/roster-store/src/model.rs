//! Entity model for the fantasy roster dataset
//!
//! Two collections make up the dataset: fantasy teams and the players they
//! own. Field names keep the Italian domain terms of the league rules
//! (spesa, fascia, quotazione, ...) because the snapshot exchange format
//! addresses fields by exactly these names.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Stable row identifier, unique per entity type
pub type EntityId = u32;

/// A fantasy team (fantasquadra)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable identifier
    pub id: EntityId,

    /// Team name, unique among non-purged teams
    pub nome: String,

    /// FantaMilioni budget counter
    pub fm: i64,

    /// League titles won
    pub campionati: u32,

    /// Cups won
    pub coppe: u32,

    /// Super cups won
    pub supercoppe: u32,

    /// Soft-delete flag
    pub deleted: bool,
}

impl Team {
    /// Create a new team with zeroed counters
    pub fn named(nome: impl Into<String>) -> Self {
        Self {
            id: 0,
            nome: nome.into(),
            fm: 0,
            campionati: 0,
            coppe: 0,
            supercoppe: 0,
            deleted: false,
        }
    }
}

/// A rostered player (giocatore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier
    pub id: EntityId,

    /// Display name, unique among non-purged players; also the key the
    /// external price feed uses (exact, case-sensitive match)
    pub nome: String,

    /// Owning team, if any
    pub squadra_id: Option<EntityId>,

    /// Investment basis at acquisition, always at least 1
    pub spesa: i64,

    /// Acquisition date, opaque string
    pub data_acquisto: String,

    /// Price tier, opaque string
    pub fascia: String,

    /// Current market quotation
    pub quotazione: i64,

    /// Cumulative quotation delta accumulated across valuation passes
    pub dq: i64,

    /// Computed release (buyout) value
    pub valore_svincolo: i64,

    /// Contract expiry, opaque string
    pub scadenza_contratto: String,

    /// Loan target team; when set, valuation only moves the quotation
    pub in_prestito_a: Option<EntityId>,

    /// Loan start, opaque string
    pub inizio_prestito: String,

    /// Loan end, opaque string
    pub fine_prestito: String,

    /// Called up for the next matchday
    pub convocato: bool,

    /// Still active in the top division (maintained by the valuation passes)
    pub in_serie_a: bool,

    /// Soft-delete flag
    pub deleted: bool,
}

impl Player {
    /// Create a new player with the minimum legal basis
    pub fn named(nome: impl Into<String>) -> Self {
        Self {
            id: 0,
            nome: nome.into(),
            squadra_id: None,
            spesa: 1,
            data_acquisto: String::new(),
            fascia: String::new(),
            quotazione: 0,
            dq: 0,
            valore_svincolo: 0,
            scadenza_contratto: String::new(),
            in_prestito_a: None,
            inizio_prestito: String::new(),
            fine_prestito: String::new(),
            convocato: false,
            in_serie_a: true,
            deleted: false,
        }
    }
}

/// The whole dataset: every row of both collections, soft-deleted included
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
}

impl Dataset {
    /// Look up a team by id, soft-deleted rows included
    pub fn team(&self, id: EntityId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Look up a player by id, soft-deleted rows included
    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// True when both collections are empty
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.players.is_empty()
    }
}

/// Common surface of the two entity types, used by the generic repository
/// and the snapshot codec
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Entity kind name used in errors and log lines
    const KIND: &'static str;

    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn nome(&self) -> &str;
    fn deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);

    /// This entity type's rows within the dataset
    fn rows(dataset: &Dataset) -> &[Self];
    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self>;

    /// Validate the row against the dataset it is about to live in.
    /// Called before any write; a failure aborts the mutation.
    fn validate(&self, dataset: &Dataset) -> Result<()>;

    /// Extra check before permanent removal
    fn check_purgeable(&self, _dataset: &Dataset) -> Result<()> {
        Ok(())
    }
}

/// Uniqueness check shared by both entity types: the name must not collide
/// with any other non-purged row of the same type
fn assert_unique_nome<R: Record>(row: &R, dataset: &Dataset) -> Result<()> {
    if row.nome().is_empty() {
        return Err(StoreError::validation(format!("{} name must not be empty", R::KIND)));
    }

    let clash = R::rows(dataset).iter().any(|r| r.id() != row.id() && r.nome() == row.nome());

    if clash {
        return Err(StoreError::validation(format!(
            "{} name '{}' is already in use",
            R::KIND,
            row.nome()
        )));
    }

    Ok(())
}

impl Record for Team {
    const KIND: &'static str = "team";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn nome(&self) -> &str {
        &self.nome
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn rows(dataset: &Dataset) -> &[Self] {
        &dataset.teams
    }

    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.teams
    }

    fn validate(&self, dataset: &Dataset) -> Result<()> {
        assert_unique_nome(self, dataset)
    }

    fn check_purgeable(&self, dataset: &Dataset) -> Result<()> {
        // Purging a team that players still reference would leave dangling
        // foreign keys in the next snapshot, which restore would then reject.
        if let Some(player) = dataset
            .players
            .iter()
            .find(|p| p.squadra_id == Some(self.id) || p.in_prestito_a == Some(self.id))
        {
            return Err(StoreError::integrity(format!(
                "team {} '{}' is still referenced by player {} '{}'",
                self.id, self.nome, player.id, player.nome
            )));
        }

        Ok(())
    }
}

impl Record for Player {
    const KIND: &'static str = "player";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn nome(&self) -> &str {
        &self.nome
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn rows(dataset: &Dataset) -> &[Self] {
        &dataset.players
    }

    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.players
    }

    fn validate(&self, dataset: &Dataset) -> Result<()> {
        assert_unique_nome(self, dataset)?;

        if self.spesa < 1 {
            return Err(StoreError::validation(format!(
                "player '{}': spesa must be at least 1, got {}",
                self.nome, self.spesa
            )));
        }

        for (field, target) in [("squadra_id", self.squadra_id), ("in_prestito_a", self.in_prestito_a)] {
            if let Some(team_id) = target {
                if dataset.team(team_id).is_none() {
                    return Err(StoreError::validation(format!(
                        "player '{}': {} references team {} which does not exist",
                        self.nome, field, team_id
                    )));
                }
            }
        }

        if self.in_prestito_a.is_some() && self.in_prestito_a == self.squadra_id {
            return Err(StoreError::validation(format!(
                "player '{}': loan target must differ from the owning team",
                self.nome
            )));
        }

        Ok(())
    }
}

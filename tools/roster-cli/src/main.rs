//! Roster CLI
//!
//! Command-line collaborator for the roster service: team and player CRUD
//! with the soft-delete lifecycle, the two valuation passes fed from a JSON
//! price document, undo, and manual export/import.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use roster_service::{
    EntityId, Player, PriceMap, RosterService, ServiceConfig, Team, UndoOutcome,
};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster-cli")]
#[command(about = "Fantasy roster manager - teams, players, valuation, undo")]
#[command(version = "0.1.0")]
struct Cli {
    /// Base directory for the store document and the undo stack
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Team management
    Teams {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Player management
    Players {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Valuation passes over an external price document
    Update {
        #[command(subcommand)]
        action: UpdateAction,
    },

    /// Restore the whole dataset from the most recent snapshot
    Undo,

    /// Export the dataset to a snapshot document
    Export {
        /// Destination path
        path: PathBuf,
    },

    /// Replace the dataset from a snapshot document (undoable)
    Import {
        /// Source path
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum TeamAction {
    /// List teams
    List {
        /// Show the recoverable (soft-deleted) partition instead
        #[arg(long)]
        deleted: bool,
    },

    /// Create a team
    Add {
        nome: String,

        /// Starting FantaMilioni budget
        #[arg(long, default_value_t = 0)]
        fm: i64,
    },

    /// Set one field of a team (value parsed as JSON scalar)
    Set { id: EntityId, field: String, value: String },

    /// Soft-delete a team
    Delete { id: EntityId },

    /// Restore a soft-deleted team
    Restore { id: EntityId },

    /// Permanently remove a soft-deleted team
    Purge { id: EntityId },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// List players
    List {
        /// Show the recoverable (soft-deleted) partition instead
        #[arg(long)]
        deleted: bool,
    },

    /// Create a player
    Add {
        nome: String,

        /// Owning team id
        #[arg(long)]
        squadra: Option<EntityId>,

        /// Investment basis (at least 1)
        #[arg(long, default_value_t = 1)]
        spesa: i64,

        /// Current market quotation
        #[arg(long, default_value_t = 0)]
        quotazione: i64,

        /// Price tier
        #[arg(long)]
        fascia: Option<String>,
    },

    /// Set one field of a player (value parsed as JSON scalar)
    Set { id: EntityId, field: String, value: String },

    /// Soft-delete a player
    Delete { id: EntityId },

    /// Restore a soft-deleted player
    Restore { id: EntityId },

    /// Permanently remove a soft-deleted player
    Purge { id: EntityId },
}

#[derive(Subcommand)]
enum UpdateAction {
    /// Full recompute: quotations, cumulative delta, release values
    Full {
        /// JSON document mapping player names to integer prices
        prices: PathBuf,
    },

    /// Quotes-only recompute: quotations and top-division flags
    Quotes {
        /// JSON document mapping player names to integer prices
        prices: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::new(&cli.data_dir);
    let mut service = RosterService::open(&config)
        .with_context(|| format!("opening roster data in {}", cli.data_dir.display()))?;

    match cli.command {
        Commands::Teams { action } => run_team_action(&mut service, action),
        Commands::Players { action } => run_player_action(&mut service, action),
        Commands::Update { action } => run_update_action(&mut service, action),
        Commands::Undo => {
            match service.undo()? {
                UndoOutcome::Restored(sequence) => {
                    println!("{} restored snapshot #{sequence}", "ok".green().bold());
                }
                UndoOutcome::NothingToRestore => {
                    println!("{}", "nothing to restore".yellow());
                }
            }
            Ok(())
        }
        Commands::Export { path } => {
            service.export(&path)?;
            println!("{} exported to {}", "ok".green().bold(), path.display());
            Ok(())
        }
        Commands::Import { path } => {
            service.import(&path)?;
            println!("{} imported from {}", "ok".green().bold(), path.display());
            Ok(())
        }
    }
}

fn run_team_action(service: &mut RosterService, action: TeamAction) -> anyhow::Result<()> {
    match action {
        TeamAction::List { deleted } => {
            let teams =
                if deleted { service.list_deleted::<Team>() } else { service.list_active::<Team>() };
            print_teams(&teams, deleted);
        }
        TeamAction::Add { nome, fm } => {
            let mut team = Team::named(nome);
            team.fm = fm;
            let team = service.create(team)?;
            println!("{} team {} '{}'", "created".green().bold(), team.id, team.nome);
        }
        TeamAction::Set { id, field, value } => {
            let team = service.update_field::<Team>(id, &field, parse_scalar(&value))?;
            println!("{} team {} '{}'", "updated".green().bold(), team.id, team.nome);
        }
        TeamAction::Delete { id } => {
            let team = service.soft_delete::<Team>(id)?;
            println!("{} team {} '{}'", "deleted".yellow().bold(), team.id, team.nome);
        }
        TeamAction::Restore { id } => {
            let team = service.restore::<Team>(id)?;
            println!("{} team {} '{}'", "restored".green().bold(), team.id, team.nome);
        }
        TeamAction::Purge { id } => {
            service.purge::<Team>(id)?;
            println!("{} team {}", "purged".red().bold(), id);
        }
    }

    Ok(())
}

fn run_player_action(service: &mut RosterService, action: PlayerAction) -> anyhow::Result<()> {
    match action {
        PlayerAction::List { deleted } => {
            let players = if deleted {
                service.list_deleted::<Player>()
            } else {
                service.list_active::<Player>()
            };
            print_players(&players, deleted);
        }
        PlayerAction::Add { nome, squadra, spesa, quotazione, fascia } => {
            let mut player = Player::named(nome);
            player.squadra_id = squadra;
            player.spesa = spesa;
            player.quotazione = quotazione;
            player.fascia = fascia.unwrap_or_default();
            let player = service.create(player)?;
            println!("{} player {} '{}'", "created".green().bold(), player.id, player.nome);
        }
        PlayerAction::Set { id, field, value } => {
            let player = service.update_field::<Player>(id, &field, parse_scalar(&value))?;
            println!("{} player {} '{}'", "updated".green().bold(), player.id, player.nome);
        }
        PlayerAction::Delete { id } => {
            let player = service.soft_delete::<Player>(id)?;
            println!("{} player {} '{}'", "deleted".yellow().bold(), player.id, player.nome);
        }
        PlayerAction::Restore { id } => {
            let player = service.restore::<Player>(id)?;
            println!("{} player {} '{}'", "restored".green().bold(), player.id, player.nome);
        }
        PlayerAction::Purge { id } => {
            service.purge::<Player>(id)?;
            println!("{} player {}", "purged".red().bold(), id);
        }
    }

    Ok(())
}

fn run_update_action(service: &mut RosterService, action: UpdateAction) -> anyhow::Result<()> {
    match action {
        UpdateAction::Full { prices } => {
            let map = load_price_map(&prices)?;
            let outcome = service.recompute_full(&map)?;
            println!(
                "{} full recompute: {} updated, {} on loan, {} left the feed",
                "ok".green().bold(),
                outcome.updated,
                outcome.loan_bypassed,
                outcome.left_feed
            );
        }
        UpdateAction::Quotes { prices } => {
            let map = load_price_map(&prices)?;
            let outcome = service.recompute_quotes_only(&map)?;
            println!(
                "{} quotes-only recompute: {} updated, {} left the feed",
                "ok".green().bold(),
                outcome.updated,
                outcome.left_feed
            );
        }
    }

    Ok(())
}

/// Load the external price feed: a JSON object mapping exact player display
/// names to integer prices
fn load_price_map(path: &PathBuf) -> anyhow::Result<PriceMap> {
    let file =
        File::open(path).with_context(|| format!("opening price document {}", path.display()))?;
    let map: PriceMap = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing price document {}", path.display()))?;

    Ok(map)
}

/// Parse a command-line value into the JSON scalar `update_field` expects:
/// null, booleans, and integers are recognized, everything else stays a
/// string
fn parse_scalar(raw: &str) -> Value {
    match raw {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(raw)),
    }
}

fn print_teams(teams: &[Team], deleted: bool) {
    let header = if deleted { "deleted teams" } else { "teams" };
    println!("{}", header.bold());
    println!(
        "{:>4}  {:<24} {:>8} {:>6} {:>6} {:>10}",
        "id", "nome", "fm", "camp", "coppe", "supercoppe"
    );

    for team in teams {
        println!(
            "{:>4}  {:<24} {:>8} {:>6} {:>6} {:>10}",
            team.id, team.nome, team.fm, team.campionati, team.coppe, team.supercoppe
        );
    }

    println!("{} rows", teams.len());
}

fn print_players(players: &[Player], deleted: bool) {
    let header = if deleted { "deleted players" } else { "players" };
    println!("{}", header.bold());
    println!(
        "{:>4}  {:<24} {:>8} {:>6} {:>6} {:>4} {:>9} {:<8} {:>6} {:>8}",
        "id", "nome", "squadra", "spesa", "quot", "dq", "svincolo", "fascia", "serieA", "prestito"
    );

    for player in players {
        let squadra = player.squadra_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let prestito =
            player.in_prestito_a.map(|id| id.to_string()).unwrap_or_else(|| "-".into());

        println!(
            "{:>4}  {:<24} {:>8} {:>6} {:>6} {:>4} {:>9} {:<8} {:>6} {:>8}",
            player.id,
            player.nome,
            squadra,
            player.spesa,
            player.quotazione,
            player.dq,
            player.valore_svincolo,
            player.fascia,
            if player.in_serie_a { "yes" } else { "no" },
            prestito
        );
    }

    println!("{} rows", players.len());
}

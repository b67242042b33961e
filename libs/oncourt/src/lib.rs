//! OnCourt-backed resolution and persistence.
//!
//! The OnCourt mirror is the system's source of truth for player and
//! tournament identity. This crate wires three stores together:
//!
//! - **players**: plain-text feed-name → id translation files
//! - **database**: the relational mirror (MySQL), per-tour table families
//! - **history**: the Mongo archives (point-by-point odds, elevation)
//!
//! [`Oncourt`] composes the first two into the [`mbet_feed::Directory`]
//! the feed parser resolves against. Lookup failures there degrade to
//! `None`/sentinel returns; the parser decides what each miss costs.

pub mod database;
pub mod history;
pub mod players;

use async_trait::async_trait;
use mbet_feed::{Category, Directory, PlayerData, TournamentInfo, TournamentKey};
use thiserror::Error;
use tracing::debug;

pub use database::{MatchDay, MatchRow, OncourtDatabase, PlayerRow};
pub use history::MatchArchive;
pub use players::PlayersDirectory;

#[derive(Error, Debug)]
pub enum OncourtError {
    #[error("OnCourt mirror error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Match archive error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Players map error: {0}")]
    Io(#[from] std::io::Error),

    #[error("category carries no tour bit")]
    UnknownCategory,
}

pub type Result<T> = std::result::Result<T, OncourtError>;

/// The production resolver: players file maps for feed-name → id, the
/// relational mirror for everything else.
pub struct Oncourt {
    players: PlayersDirectory,
    database: OncourtDatabase,
}

impl Oncourt {
    pub fn new(players: PlayersDirectory, database: OncourtDatabase) -> Oncourt {
        Oncourt { players, database }
    }
}

#[async_trait]
impl Directory for Oncourt {
    async fn player_id(&self, name: &str) -> Option<(i32, Category)> {
        self.players.lookup(name)
    }

    async fn player_data(&self, category: Category, id: i32) -> Option<PlayerData> {
        match self.database.player(category, id).await {
            Ok(data) => data,
            Err(error) => {
                debug!(%error, id, "player lookup failed");
                None
            }
        }
    }

    async fn tournament_for(&self, category: Category, home: i32, away: i32) -> TournamentKey {
        match self.database.tournament_for(category, home, away).await {
            Ok(key) => key,
            Err(error) => {
                debug!(%error, home, away, "tournament lookup failed");
                TournamentKey::default()
            }
        }
    }

    async fn tournament_info(&self, category: Category, tour: i32) -> Option<TournamentInfo> {
        match self.database.tournament_info(category, tour).await {
            Ok(info) => info,
            Err(error) => {
                debug!(%error, tour, "tournament info lookup failed");
                None
            }
        }
    }

    async fn player_odds(
        &self,
        category: Category,
        home: i32,
        away: i32,
        tour: i32,
        round: i32,
    ) -> Option<(f64, f64)> {
        match self
            .database
            .player_odds(category, home, away, tour, round)
            .await
        {
            Ok(odds) => odds,
            Err(error) => {
                debug!(%error, home, away, "stored odds lookup failed");
                None
            }
        }
    }
}

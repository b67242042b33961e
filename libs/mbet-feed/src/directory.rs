//! Player/tournament resolution boundary.
//!
//! The parser cross-references feed names against an external directory
//! (the OnCourt mirror in production). Everything here is best-effort:
//! lookups return `None` or sentinel keys instead of errors, and the
//! parser degrades per event, never per tree.

use async_trait::async_trait;

use crate::model::Category;

/// Resolved display data for one player.
#[derive(Clone, Debug)]
pub struct PlayerData {
    pub name: String,
    pub flag: String,
    pub ranking: i32,
}

/// Tournament identity resolved from a member pair; −1 means unknown.
#[derive(Clone, Copy, Debug)]
pub struct TournamentKey {
    pub tour: i32,
    pub round: i32,
    pub rank: i32,
}

impl Default for TournamentKey {
    fn default() -> TournamentKey {
        TournamentKey {
            tour: -1,
            round: -1,
            rank: -1,
        }
    }
}

impl TournamentKey {
    pub fn is_resolved(self) -> bool {
        self.tour != -1
    }
}

/// Tournament display fields.
#[derive(Clone, Debug)]
pub struct TournamentInfo {
    pub name: String,
    pub flag: String,
    pub court: String,
}

/// The directory the parser resolves against.
///
/// Implementations must be idempotent for the duration of one poll cycle;
/// the parser may retry `tournament_for` for the same group until it
/// resolves.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Feed display name → (external id, category). Checks the ATP table
    /// first, then WTA; `None` when the name is unknown to both.
    async fn player_id(&self, name: &str) -> Option<(i32, Category)>;

    /// Display data for a resolved player id.
    async fn player_data(&self, category: Category, id: i32) -> Option<PlayerData>;

    /// Tournament identity for a member pair, either ordering.
    async fn tournament_for(&self, category: Category, home: i32, away: i32) -> TournamentKey;

    /// Display fields for a resolved tournament id.
    async fn tournament_info(&self, category: Category, tour: i32) -> Option<TournamentInfo>;

    /// Last stored odds for the pairing, `None` when not yet priced.
    async fn player_odds(
        &self,
        category: Category,
        home: i32,
        away: i32,
        tour: i32,
        round: i32,
    ) -> Option<(f64, f64)>;
}

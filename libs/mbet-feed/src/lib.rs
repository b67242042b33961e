//! Marathonbet tennis feed ingestion.
//!
//! Turns the raw `betennis` XML feed into an in-memory snapshot tree:
//!
//! - **model**: Sport → Group (tournament) → Event → members/markets/score
//! - **score**: the compact live-score text decoder and the plain-text
//!   decoder used for archived results
//! - **directory**: the player/tournament resolution boundary (backed by
//!   the OnCourt mirror in production, by an in-memory table in tests)
//! - **parser**: document-order XML traversal with memoized per-group
//!   tournament resolution
//! - **fetch**: the HTTP side, one URL per feed kind (`pre` / `liv`)
//!
//! Trees are immutable once parsed; the caller keeps at most two
//! generations alive (previous and current) and discards them wholesale.

pub mod directory;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod score;

use thiserror::Error;

pub use directory::{Directory, PlayerData, TournamentInfo, TournamentKey};
pub use fetch::{FeedClient, FeedKind};
pub use model::{
    Category, Event, Feed, GamePoint, GameScore, Group, Market, Member, ScoreBoard, Selection,
    Service, SetScore, Side, Sport, MATCH_RESULT_MODEL,
};
pub use parser::parse;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed markup error: {0}")]
    Xml(#[from] roxmltree::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;

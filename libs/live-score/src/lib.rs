//! The live-score engine.
//!
//! Every cycle the poller pulls both feed documents, diffs the live one
//! against the previous generation and pushes the resulting patch
//! documents to every listening Unix-socket subscriber:
//!
//! - **index**: tree-id lookup over one feed generation
//! - **diff**: score/odds update and departure documents
//! - **patch**: the full-event serializer (arrivals, snapshots, finished
//!   and yesterday documents) plus the side effects it collects
//! - **registry**: subscriber bookkeeping and the broadcast fan-out
//! - **server**: the Unix-socket accept/command loop
//! - **poller**: the fixed-interval cycle driving all of the above
//!
//! Documents are JSON objects whose first key is always `"mt"` (the
//! method tag); a document with nothing to say is not sent at all.

pub mod config;
pub mod diff;
pub mod index;
pub mod logging;
pub mod patch;
pub mod poller;
pub mod registry;
pub mod server;

use thiserror::Error;

pub use config::Config;
pub use index::SnapshotIndex;
pub use patch::Patcher;
pub use poller::Poller;
pub use registry::Registry;
pub use server::Server;

#[derive(Error, Debug)]
pub enum LsError {
    #[error("Feed error: {0}")]
    Feed(#[from] mbet_feed::FeedError),

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Document serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LsError>;

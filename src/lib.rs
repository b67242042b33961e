//! Live-score daemon assembly.
//!
//! The workspace splits along the data path: `mbet-feed` parses the
//! upstream XML into snapshot trees, `oncourt` resolves identity against
//! the mirror and persists history, `live-score` diffs generations and
//! broadcasts the patches. This crate re-exports the three and carries
//! the binary-side plumbing.

pub use live_score;
pub use mbet_feed;
pub use oncourt;

pub mod bin_common {
    //! Shared plumbing for the daemon binary.

    pub mod cli;

    pub use cli::{config_path, parse_args, CONFIG_ENV};
}

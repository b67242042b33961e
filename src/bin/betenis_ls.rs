//! The live-score daemon.
//!
//! `betenis-ls <socket path>` polls both Marathonbet tennis feeds,
//! diffs the live one against the previous generation and pushes the
//! patch documents to every subscriber on the Unix socket. The YAML
//! configuration resolves through `LS_CONFIG_PATH` (default
//! `config.yaml`); a `.env` file can carry the store credentials.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use betenis_live_score::bin_common::cli;
use live_score::poller::{Generations, Poller};
use live_score::{logging, Config, Patcher, Registry, Server};
use mbet_feed::FeedClient;
use oncourt::{MatchArchive, Oncourt, OncourtDatabase, PlayersDirectory};
use parking_lot::Mutex;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = cli::parse_args();
    let Some(socket_path) = args.first() else {
        bail!("usage: betenis-ls <socket path>");
    };

    let config_path = cli::config_path();
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    logging::init_tracing(&config.log_level);
    info!(socket = %socket_path, "betenis live-score starting");

    let players = PlayersDirectory::load(&config.players_dir)?;
    let database = OncourtDatabase::connect(&config.database.url).await?;
    let archive = MatchArchive::connect(&config.mongo.uri).await?;

    let directory = Arc::new(Oncourt::new(players, database.clone()));
    let patcher = Arc::new(Patcher::new(Arc::new(archive.clone())));
    let registry = Arc::new(Registry::new());
    let generations = Arc::new(Mutex::new(Generations::default()));

    let poller = Poller {
        client: FeedClient::new(&config.feed.url_template)?,
        directory,
        patcher: Arc::clone(&patcher),
        database: database.clone(),
        archive,
        registry: Arc::clone(&registry),
        generations: Arc::clone(&generations),
        period: Duration::from_secs(config.feed.poll_secs),
    };
    tokio::spawn(poller.run());

    let server = Server::bind(
        socket_path,
        config.socket.backlog,
        registry,
        patcher,
        database,
        generations,
    )?;
    server.run().await?;
    Ok(())
}

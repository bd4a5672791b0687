mod ai;
mod card;
mod cli;
mod command;
mod engine;
mod game;
mod grid;
mod player;
mod remote;
mod renderer;
mod schedule;
mod scores;
mod store;

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::Args;
use engine::Engine;
use game::Game;
use remote::{Offline, RemoteWorker};
use renderer::TuiRenderer;
use store::{FileStore, MemoryStore, Store};

const LOG_FILE: &str = "tmemory.log";

fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = args.data_dir.clone().or_else(store::data_dir);
    if let Some(dir) = &data_dir {
        // The terminal belongs to the game, so logs go to a file or nowhere.
        if let Err(err) = initialize_logging(dir, args.log_level) {
            eprintln!("warning: logging disabled: {err:#}");
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let store: Box<dyn Store> = match &data_dir {
        Some(dir) => Box::new(FileStore::new(dir)),
        None => {
            warn!("no data directory, scores will not be kept");
            Box::new(MemoryStore::default())
        }
    };
    let engine = Engine::new(args.mode.into(), args.grid.unwrap_or_default(), args.seed);

    let mut term = TuiRenderer::new()?;
    term.enter()?;

    let mut game = Game::new(engine, &mut term, store, RemoteWorker::spawn(Offline));
    let result = game.run();
    drop(game);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn initialize_logging(dir: &Path, level: LevelFilter) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("could not create {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("could not open {}", path.display()))?;

    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();
    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();
    Ok(())
}

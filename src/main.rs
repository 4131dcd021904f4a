mod budget;
mod categorize;
mod clock;
mod config;
mod db;
mod engine;
mod error;
mod extract;
mod ledger;
mod models;
mod run;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::clock::SystemClock;
use crate::db::{MemoryStorage, SqliteStorage, Storage};
use crate::engine::{Engine, EngineOptions, Flusher};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let loaded = config::load_settings();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(&settings.log_level);
    if let Err(e) = &loaded {
        warn!("using default settings: {e:#}");
    }

    let storage: Arc<dyn Storage> = if args.iter().any(|a| a == "--memory") {
        info!("in-memory storage, nothing will be saved");
        Arc::new(MemoryStorage::default())
    } else {
        let db_path = config::db_path(&settings)?;
        info!(path = %db_path.display(), "opening database");
        Arc::new(SqliteStorage::open(&db_path)?)
    };

    let engine = Arc::new(Engine::open(
        storage,
        Arc::new(SystemClock),
        EngineOptions::from(&settings),
    )?);
    let flusher = Flusher::spawn(engine.clone(), settings.flush_interval())?;

    let outcome = run::as_cli(&args, &engine, &flusher);
    flusher.shutdown()?;
    if engine.has_unsaved_changes() {
        warn!("some changes could not be saved");
    }
    outcome
}

/// Logs go to stderr so chat output on stdout stays clean. `RUST_LOG` wins
/// over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("chatledger={level}")))
        .unwrap_or_else(|_| EnvFilter::new("chatledger=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

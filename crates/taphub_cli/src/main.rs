//! `taphub` roster watcher.
//!
//! # Responsibility
//! - Wire config, logging, the SQLite store, the feed source and the log
//!   sink into the poll loop.
//! - Fail fast on startup errors; everything after startup is non-fatal.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use taphub_core::db::open_db;
use taphub_core::{
    default_log_level, init_logging, JsonFeedSource, LocationNaming, LogSink, LoggingOptions,
    PollService, RosterStore, SqliteRosterStore, StopSignal, WatchConfig,
};

/// Watches location rosters and reports items going on and off.
#[derive(Parser)]
#[command(name = "taphub", version, about, long_about = None)]
struct Cli {
    /// JSON watcher config (interval, noise markers, notify targets).
    #[arg(long)]
    config: PathBuf,

    /// SQLite database holding the persisted rosters.
    #[arg(long)]
    db: PathBuf,

    /// JSON feed file re-read on every cycle.
    #[arg(long)]
    feed: PathBuf,

    /// Absolute directory for rotating log files.
    #[arg(long)]
    log_dir: String,

    /// trace|debug|info|warn|error; defaults per build mode.
    #[arg(long)]
    log_level: Option<String>,

    /// Run a single cycle and exit.
    #[arg(long, conflicts_with = "max_cycles")]
    once: bool,

    /// Exit after this many cycles.
    #[arg(long)]
    max_cycles: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingOptions {
        level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string()),
        log_dir: cli.log_dir.clone(),
        echo_stderr: true,
    };
    init_logging(&logging).map_err(anyhow::Error::msg)?;

    let config = WatchConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let conn = open_db(&cli.db)
        .with_context(|| format!("opening {}", cli.db.display()))?;
    let store = SqliteRosterStore::try_new(&conn).context("preparing roster store")?;

    let mut source = JsonFeedSource::new(&cli.feed, LocationNaming::from_config(&config));
    let service = PollService::new(&store, LogSink, &config);
    let max_cycles = if cli.once { Some(1) } else { cli.max_cycles };

    info!(
        "event=watch_start module=cli status=ok interval_secs={} noise_markers={} notify_locations={}",
        config.poll_interval_secs,
        config.noise_substrings.len(),
        config.notify_locations.len()
    );
    let cycles = service.run(&mut source, &StopSignal::new(), max_cycles);

    let locations = store.list_locations().context("listing locations")?;
    println!(
        "taphub: {cycles} cycle(s), {} location(s) tracked",
        locations.len()
    );
    Ok(())
}

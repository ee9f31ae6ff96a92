//! Core roster reconciliation for TapHub.
//! Detects items appearing at and disappearing from watched locations.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod source;

pub use config::{ConfigError, NotifyPolicy, WatchConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingOptions};
pub use model::roster::{ChangeEvent, Item, ItemId, Location, LocationId, Snapshot};
pub use notify::{LogSink, NotificationSink, SinkError};
pub use reconcile::{canonical_key, reconcile, NormalizedRoster, Normalizer, RosterDiff};
pub use repo::roster_repo::{RosterStore, SqliteRosterStore, StoreError, StoreResult};
pub use service::poll_service::{
    change_events, CycleOutcome, CycleReport, LocationOutcome, LocationReport, PollService,
};
pub use service::stop_signal::StopSignal;
pub use source::{JsonFeedSource, LocationNaming, SnapshotSource, SourceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

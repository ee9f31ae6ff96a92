//! Snapshot sources.
//!
//! # Responsibility
//! - Define the fetch contract the poll loop pulls snapshots from.
//! - Provide a JSON feed file source and the location naming rules applied
//!   to feed entries.
//!
//! # Invariants
//! - A failed fetch yields `SourceError`; it never yields a partial snapshot.

pub mod feed;
pub mod naming;

pub use feed::JsonFeedSource;
pub use naming::LocationNaming;

use crate::model::roster::Snapshot;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Snapshot could not be obtained this cycle.
#[derive(Debug)]
pub enum SourceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Free-form failure reported by custom sources.
    Unavailable(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read feed `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse feed `{}`: {source}", path.display())
            }
            Self::Unavailable(message) => write!(f, "snapshot unavailable: {message}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Unavailable(_) => None,
        }
    }
}

/// Supplies one snapshot per cycle.
pub trait SnapshotSource {
    fn fetch(&mut self) -> Result<Snapshot, SourceError>;
}

impl<F> SnapshotSource for F
where
    F: FnMut() -> Result<Snapshot, SourceError>,
{
    fn fetch(&mut self) -> Result<Snapshot, SourceError> {
        self()
    }
}

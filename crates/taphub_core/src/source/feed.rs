//! JSON feed file source.
//!
//! Reads the bar/tap listing shape:
//! `{"bars": [{"name": "...", "data": {"tap": [{"name": "..."}]}}]}`.
//! Unknown fields are ignored; a null or missing tap name becomes a blank
//! candidate that normalization drops.

use super::naming::LocationNaming;
use super::{SnapshotSource, SourceError};
use crate::model::roster::Snapshot;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default, rename = "bars")]
    locations: Vec<FeedLocation>,
}

#[derive(Debug, Deserialize)]
struct FeedLocation {
    name: String,
    #[serde(default)]
    data: Option<FeedLocationData>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedLocationData {
    #[serde(default, rename = "tap")]
    items: Option<Vec<FeedItem>>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    name: Option<String>,
}

/// Re-reads a feed file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFeedSource {
    path: PathBuf,
    naming: LocationNaming,
}

impl JsonFeedSource {
    pub fn new(path: impl Into<PathBuf>, naming: LocationNaming) -> Self {
        Self {
            path: path.into(),
            naming,
        }
    }
}

impl SnapshotSource for JsonFeedSource {
    fn fetch(&mut self) -> Result<Snapshot, SourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = parse_feed(&raw, &self.naming).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            "event=feed_read module=source status=ok locations={} path={}",
            snapshot.len(),
            self.path.display()
        );
        Ok(snapshot)
    }
}

/// Parses a feed document into a snapshot using `naming` for identities.
pub fn parse_feed(raw: &str, naming: &LocationNaming) -> Result<Snapshot, serde_json::Error> {
    let document: FeedDocument = serde_json::from_str(raw)?;
    let mut snapshot = Snapshot::new();
    for location in document.locations {
        let candidates = location
            .data
            .and_then(|data| data.items)
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.name.unwrap_or_default());
        snapshot.push_location(naming.location_name(&location.name), candidates);
    }
    Ok(snapshot)
}

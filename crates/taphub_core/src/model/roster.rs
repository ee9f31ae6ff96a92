//! Location/item records, snapshots and change events.
//!
//! # Responsibility
//! - Provide the canonical shapes passed between source, reconciler,
//!   store and notification sink.
//!
//! # Invariants
//! - `Snapshot` holds each location name at most once.
//! - `ChangeEvent` is never persisted; it only describes a transition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a persisted location.
pub type LocationId = Uuid;

/// Stable identifier for a persisted item.
pub type ItemId = Uuid;

/// Handle to a persisted location, valid for the lifetime of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Stable storage ID.
    pub uuid: LocationId,
    /// Unique display/identity name, e.g. `BrewDog EDINBURGH`.
    pub name: String,
    /// First observation as epoch milliseconds, at whole-second precision.
    pub created_at: i64,
}

/// One item currently present at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uuid: ItemId,
    pub location_uuid: LocationId,
    /// Diff key; unique within the owning location.
    pub name: String,
    /// Epoch milliseconds, at whole-second precision, of the cycle that first
    /// persisted this item.
    pub first_seen_at: i64,
}

/// One cycle's raw view of every location's roster.
///
/// Candidates are kept exactly as fetched, including blanks, duplicates and
/// noise entries. Locations iterate in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    locations: BTreeMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw candidates for `location_name`.
    ///
    /// Repeated calls for the same name merge into one candidate list, so a
    /// cycle visits every distinct location once.
    pub fn push_location<I, S>(&mut self, location_name: impl Into<String>, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations
            .entry(location_name.into())
            .or_default()
            .extend(candidates.into_iter().map(Into::into));
    }

    /// Builder-style variant of [`Snapshot::push_location`].
    pub fn with_location<I, S>(mut self, location_name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_location(location_name, candidates);
        self
    }

    /// Iterates `(location_name, raw_candidates)` in name order.
    pub fn locations(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.locations
            .iter()
            .map(|(name, candidates)| (name.as_str(), candidates.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Transition of one item at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Item appeared in the latest snapshot.
    Added { location: String, item: String },
    /// Item disappeared; `item` is the name as it was persisted.
    Removed { location: String, item: String },
}

impl ChangeEvent {
    pub fn location(&self) -> &str {
        match self {
            Self::Added { location, .. } | Self::Removed { location, .. } => location,
        }
    }

    pub fn item(&self) -> &str {
        match self {
            Self::Added { item, .. } | Self::Removed { item, .. } => item,
        }
    }

    /// Notification text: `ON: <item>` or `OFF: <item>`.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for ChangeEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added { item, .. } => write!(f, "ON: {item}"),
            Self::Removed { item, .. } => write!(f, "OFF: {item}"),
        }
    }
}

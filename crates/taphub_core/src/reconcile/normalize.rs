//! Candidate filtering and deduplication for one location.

use std::collections::{BTreeMap, BTreeSet};

/// Normalized roster: canonical key -> item name.
pub type NormalizedRoster = BTreeMap<String, String>;

/// Maps an item name to the key used for deduplication and diffing.
///
/// Keys are the exact name; two names collapse only when they are
/// byte-identical.
pub fn canonical_key(name: &str) -> String {
    name.to_owned()
}

/// Filters blank and noise candidates, then collapses duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    noise_substrings: Vec<String>,
}

impl Normalizer {
    /// Creates a normalizer with the configured noise markers.
    ///
    /// Markers match case-sensitively anywhere inside a name. Blank markers
    /// are dropped here because they would match every name.
    pub fn new<I, S>(noise_substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let noise_substrings = noise_substrings
            .into_iter()
            .map(Into::into)
            .filter(|marker: &String| !marker.trim().is_empty())
            .collect();
        Self { noise_substrings }
    }

    /// Returns whether `name` is excluded from consideration.
    pub fn is_rejected(&self, name: &str) -> bool {
        name.trim().is_empty() || self.is_noise(name)
    }

    /// Returns whether `name` contains a configured noise marker.
    pub fn is_noise(&self, name: &str) -> bool {
        self.noise_substrings
            .iter()
            .any(|marker| name.contains(marker.as_str()))
    }

    /// Normalizes one location's raw candidates.
    ///
    /// The first occurrence of a duplicated name wins; since all duplicates
    /// are identical strings this does not affect the result.
    pub fn normalize<I, S>(&self, candidates: I) -> NormalizedRoster
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = NormalizedRoster::new();
        for candidate in candidates {
            let name = candidate.as_ref();
            if self.is_rejected(name) {
                continue;
            }
            roster
                .entry(canonical_key(name))
                .or_insert_with(|| name.to_owned());
        }
        roster
    }

    /// Normalizes and returns only the canonical key set.
    pub fn normalize_keys<I, S>(&self, candidates: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.normalize(candidates).into_keys().collect()
    }
}

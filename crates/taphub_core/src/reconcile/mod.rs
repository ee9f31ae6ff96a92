//! Pure roster reconciliation.
//!
//! # Responsibility
//! - Turn raw per-location candidates into a clean name set.
//! - Compute the minimal added/removed transition between two name sets.
//!
//! # Invariants
//! - No I/O, clock or store access happens in this module.
//! - Name equality is exact string equality on canonical keys.

pub mod diff;
pub mod normalize;

pub use diff::{reconcile, RosterDiff};
pub use normalize::{canonical_key, NormalizedRoster, Normalizer};

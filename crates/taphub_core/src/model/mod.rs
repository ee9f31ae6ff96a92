//! Roster domain model.
//!
//! # Responsibility
//! - Define the location/item records owned by the roster store.
//! - Define the transient per-cycle shapes (snapshot, change events).
//!
//! # Invariants
//! - Locations are identified by a stable, unique name and never deleted.
//! - Item names are unique within one location.

pub mod roster;

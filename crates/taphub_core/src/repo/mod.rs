//! Roster persistence boundary.
//!
//! # Responsibility
//! - Define the store contract used by the poll cycle.
//! - Isolate SQLite query details from reconciliation and orchestration.
//!
//! # Invariants
//! - A location's changes for one cycle commit together or not at all.
//! - Store APIs return semantic errors (`LocationNotFound`) in addition to DB
//!   transport errors.

pub mod roster_repo;

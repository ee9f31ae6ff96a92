//! Effectful drivers around the pure reconciliation core.
//!
//! # Responsibility
//! - Run poll cycles: normalize, reconcile, persist and notify per location.
//! - Repeat cycles at a fixed interval until stopped.
//!
//! # Invariants
//! - Locations are processed sequentially; one failure never aborts a cycle.
//! - Notifications are sent only after the location's changes are persisted.

pub mod poll_service;
pub mod stop_signal;

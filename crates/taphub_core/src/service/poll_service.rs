//! Poll cycle orchestration.
//!
//! # Responsibility
//! - Drive one reconciliation pass over every location in a snapshot.
//! - Repeat passes at the configured interval until a stop is requested.
//!
//! # Invariants
//! - A missing snapshot skips the pass without touching the store.
//! - Unchanged locations cause no store writes and no sink calls.
//! - A location's notifications follow its successful `apply_changes`.
//! - Store and sink failures are contained to the current location.

use crate::config::{NotifyPolicy, WatchConfig};
use crate::model::roster::{ChangeEvent, Snapshot};
use crate::notify::NotificationSink;
use crate::reconcile::{reconcile, Normalizer, RosterDiff};
use crate::repo::roster_repo::{RosterStore, StoreResult};
use crate::service::stop_signal::StopSignal;
use crate::source::SnapshotSource;
use log::{debug, error, info, trace, warn};
use std::time::{Duration, Instant};

/// Result of processing one location in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    /// Persisted roster already matched the snapshot.
    Unchanged { item_count: usize },
    /// Changes were persisted; `notified` counts sink deliveries that succeeded.
    Changed {
        item_count: usize,
        events: Vec<ChangeEvent>,
        notified: usize,
    },
    /// A store operation failed; nothing was persisted or sent.
    Failed { error: String },
}

/// Outcome of one location, keyed by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationReport {
    pub location: String,
    pub outcome: LocationOutcome,
}

/// Summary of one completed cycle, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub locations: Vec<LocationReport>,
}

impl CycleReport {
    /// Returns the outcome recorded for `location`, if it was visited.
    pub fn outcome(&self, location: &str) -> Option<&LocationOutcome> {
        self.locations
            .iter()
            .find(|report| report.location == location)
            .map(|report| &report.outcome)
    }

    pub fn changed_count(&self) -> usize {
        self.locations
            .iter()
            .filter(|report| matches!(report.outcome, LocationOutcome::Changed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.locations
            .iter()
            .filter(|report| matches!(report.outcome, LocationOutcome::Failed { .. }))
            .count()
    }

    pub fn has_changes(&self) -> bool {
        self.changed_count() > 0
    }

    /// All persisted change events of this cycle.
    pub fn events(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.locations
            .iter()
            .filter_map(|report| match &report.outcome {
                LocationOutcome::Changed { events, .. } => Some(events.iter()),
                _ => None,
            })
            .flatten()
    }
}

/// Outcome of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch failed; reconciliation was skipped.
    NoData,
    Completed(CycleReport),
}

/// Poll cycle driver over a roster store and a notification sink.
pub struct PollService<S: RosterStore, N: NotificationSink> {
    store: S,
    sink: N,
    normalizer: Normalizer,
    notify_policy: NotifyPolicy,
    poll_interval: Duration,
}

impl<S: RosterStore, N: NotificationSink> PollService<S, N> {
    /// Creates a driver using the noise markers, notify targets and interval
    /// from `config`.
    pub fn new(store: S, sink: N, config: &WatchConfig) -> Self {
        Self {
            store,
            sink,
            normalizer: config.normalizer(),
            notify_policy: config.notify_policy(),
            poll_interval: config.poll_interval(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Runs one reconciliation pass.
    ///
    /// `None` means the snapshot could not be fetched this cycle.
    pub fn run_cycle(&self, snapshot: Option<Snapshot>) -> CycleOutcome {
        let Some(snapshot) = snapshot else {
            info!("event=poll_cycle module=service status=no_data");
            return CycleOutcome::NoData;
        };

        let started_at = Instant::now();
        let mut report = CycleReport::default();
        for (location, candidates) in snapshot.locations() {
            let outcome = match self.process_location(location, candidates) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(
                        "event=location_sync module=service status=error location=\"{}\" error_code=store_failed error={}",
                        location, err
                    );
                    LocationOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            report.locations.push(LocationReport {
                location: location.to_owned(),
                outcome,
            });
        }

        if !report.has_changes() {
            debug!("No roster changes.");
        }
        info!(
            "event=poll_cycle module=service status=ok locations={} changed={} failed={} duration_ms={}",
            report.locations.len(),
            report.changed_count(),
            report.failed_count(),
            started_at.elapsed().as_millis()
        );
        CycleOutcome::Completed(report)
    }

    /// Fetches and reconciles until `stop` is raised or `max_cycles` passes
    /// have run. Returns the number of passes; `Some(0)` runs none.
    pub fn run<F>(&self, source: &mut F, stop: &StopSignal, max_cycles: Option<u64>) -> u64
    where
        F: SnapshotSource + ?Sized,
    {
        let mut cycles = 0_u64;
        while !stop.is_stopped() {
            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            let snapshot = match source.fetch() {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    debug!("event=fetch module=service status=unavailable error={err}");
                    None
                }
            };
            self.run_cycle(snapshot);
            cycles += 1;

            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            debug!(
                "event=sleep module=service status=start duration_secs={}",
                self.poll_interval.as_secs()
            );
            if stop.wait_timeout(self.poll_interval) {
                break;
            }
        }

        info!("event=poll_loop module=service status=stopped cycles={cycles}");
        cycles
    }

    fn process_location(
        &self,
        location_name: &str,
        candidates: &[String],
    ) -> StoreResult<LocationOutcome> {
        let location = self.store.get_or_create_location(location_name)?;
        let current = self.normalizer.normalize_keys(candidates);
        let previous = self.store.load_current_items(&location)?;
        let diff = reconcile(&previous, &current);

        let summary = format!(
            "{location_name}: {} items found. {} have gone off, {} have gone on.",
            current.len(),
            diff.removed.len(),
            diff.added.len()
        );
        if diff.is_empty() {
            trace!("{summary}");
            return Ok(LocationOutcome::Unchanged {
                item_count: current.len(),
            });
        }
        debug!("{summary}");

        let events = change_events(location_name, &diff);
        for event in &events {
            debug!("{event}");
        }

        self.store
            .apply_changes(&location, &diff.added, &diff.removed)?;
        let notified = self.notify(location_name, &events);

        Ok(LocationOutcome::Changed {
            item_count: current.len(),
            events,
            notified,
        })
    }

    fn notify(&self, location_name: &str, events: &[ChangeEvent]) -> usize {
        if !self.notify_policy.is_enabled(location_name) {
            return 0;
        }

        let mut delivered = 0;
        for event in events {
            match self.sink.notify(&event.message(), location_name) {
                Ok(()) => delivered += 1,
                Err(err) => warn!(
                    "event=notify module=service status=error location=\"{}\" error_code=sink_failed error={}",
                    location_name, err
                ),
            }
        }
        delivered
    }
}

/// Orders a diff into events: removals first, then additions, each sorted.
///
/// Removed names come from the store, so `OFF:` messages carry the name as
/// it was persisted.
pub fn change_events(location_name: &str, diff: &RosterDiff) -> Vec<ChangeEvent> {
    let removed = diff.removed.iter().map(|item| ChangeEvent::Removed {
        location: location_name.to_owned(),
        item: item.clone(),
    });
    let added = diff.added.iter().map(|item| ChangeEvent::Added {
        location: location_name.to_owned(),
        item: item.clone(),
    });
    removed.chain(added).collect()
}

#[cfg(test)]
mod tests {
    use super::change_events;
    use crate::reconcile::RosterDiff;

    #[test]
    fn removals_precede_additions() {
        let diff = RosterDiff {
            added: ["Stout", "Alt"].iter().map(|name| name.to_string()).collect(),
            removed: ["Lager"].iter().map(|name| name.to_string()).collect(),
        };

        let messages: Vec<_> = change_events("X", &diff)
            .iter()
            .map(|event| event.message())
            .collect();
        assert_eq!(messages, vec!["OFF: Lager", "ON: Alt", "ON: Stout"]);
    }
}

//! Per-entity trackers and the multipath demultiplexer

use std::collections::HashMap;

use super::{CongestionLog, CongestionState, UpdateReport};
use crate::qlog::QlogEvent;

/// Events, current state and snapshot history of one entity
#[derive(Debug, Clone, Default)]
pub struct CongestionTracker {
    events: Vec<QlogEvent>,
    state: CongestionState,
    log: CongestionLog,
}

impl CongestionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event, snapshotting congestion state on metric updates.
    ///
    /// Returns the merge report when the event was a metric update.
    pub fn record(&mut self, event: QlogEvent) -> Option<UpdateReport> {
        let report = if event.is_metrics_update() {
            let report = self.state.update(event.time, event.data.as_ref());
            self.log.push(self.state.snapshot());
            Some(report)
        } else {
            None
        };
        self.events.push(event);
        report
    }

    /// All recorded events
    pub fn events(&self) -> &[QlogEvent] {
        &self.events
    }

    /// Current congestion state
    pub fn state(&self) -> &CongestionState {
        &self.state
    }

    /// Snapshot history
    pub fn log(&self) -> &CongestionLog {
        &self.log
    }

    /// Take the snapshot history, dropping the rest
    pub fn into_log(self) -> CongestionLog {
        self.log
    }
}

/// Trackers keyed by path identifier, created on first sighting.
///
/// Paths are kept in the order they first appear in the trace.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    index: HashMap<i64, usize>,
    paths: Vec<(i64, CongestionTracker)>,
}

impl PathSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an event to the tracker of its path
    pub fn record(&mut self, event: QlogEvent) -> Option<UpdateReport> {
        let path_id = event.path_id;
        let slot = match self.index.get(&path_id) {
            Some(&slot) => slot,
            None => {
                tracing::debug!("new path {path_id}");
                self.paths.push((path_id, CongestionTracker::new()));
                self.index.insert(path_id, self.paths.len() - 1);
                self.paths.len() - 1
            }
        };
        self.paths[slot].1.record(event)
    }

    /// Tracker of one path
    pub fn get(&self, path_id: i64) -> Option<&CongestionTracker> {
        self.index.get(&path_id).map(|&slot| &self.paths[slot].1)
    }

    /// Known path identifiers, in first-seen order
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.paths.iter().map(|(id, _)| *id)
    }

    /// Iterate paths in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &CongestionTracker)> {
        self.paths.iter().map(|(id, tracker)| (*id, tracker))
    }

    /// Number of paths seen
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if no path was seen
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

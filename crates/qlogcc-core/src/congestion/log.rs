//! Congestion log
//!
//! Ordered snapshots of one entity's congestion state, ready for charting.

use serde::{Deserialize, Serialize};

use super::{CcColumn, CcSnapshot};

/// Ordered congestion snapshots of one trace or path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CongestionLog {
    entries: Vec<CcSnapshot>,
}

impl CongestionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot
    pub fn push(&mut self, snapshot: CcSnapshot) {
        self.entries.push(snapshot);
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all snapshots
    pub fn entries(&self) -> &[CcSnapshot] {
        &self.entries
    }

    /// Most recent snapshot
    pub fn last(&self) -> Option<&CcSnapshot> {
        self.entries.last()
    }

    /// Rows as plain tuples, in column order
    pub fn rows(&self) -> Vec<[i64; 8]> {
        self.entries.iter().map(CcSnapshot::values).collect()
    }

    /// Time covered from the first to the last snapshot (us), saturating
    pub fn duration(&self) -> i64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.event_time.saturating_sub(first.event_time),
            _ => 0,
        }
    }

    /// Get snapshots in a time range, bounds included
    pub fn entries_in_range(&self, start: i64, end: i64) -> impl Iterator<Item = &CcSnapshot> {
        self.entries
            .iter()
            .filter(move |e| e.event_time >= start && e.event_time <= end)
    }

    /// Get values for a specific column
    pub fn column(&self, column: CcColumn) -> Vec<i64> {
        self.entries.iter().map(|e| e.get(column)).collect()
    }

    /// Get values for a column by header name
    pub fn column_by_name(&self, name: &str) -> Vec<i64> {
        match CcColumn::from_name(name) {
            Some(column) => self.column(column),
            None => Vec::new(),
        }
    }
}

impl FromIterator<CcSnapshot> for CongestionLog {
    fn from_iter<I: IntoIterator<Item = CcSnapshot>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_log() -> CongestionLog {
        [
            [1000, 10, 5, 0, 0, 0, 0, 0],
            [2000, 20, 15, 0, 0, 0, 0, 0],
            [3000, 30, 25, 0, 0, 0, 0, 1],
        ]
        .into_iter()
        .map(CcSnapshot::from)
        .collect()
    }

    #[test]
    fn test_log_columns() {
        let log = make_test_log();
        assert_eq!(log.column(CcColumn::Cwnd), vec![10, 20, 30]);
        assert_eq!(log.column_by_name("app_limited"), vec![0, 0, 1]);
        assert!(log.column_by_name("rpm").is_empty());
    }

    #[test]
    fn test_log_range_and_duration() {
        let log = make_test_log();
        assert_eq!(log.duration(), 2000);
        let times: Vec<i64> = log
            .entries_in_range(1500, 3000)
            .map(|e| e.event_time)
            .collect();
        assert_eq!(times, vec![2000, 3000]);
        assert_eq!(CongestionLog::new().duration(), 0);
    }

    #[test]
    fn test_duration_saturates_on_extreme_times() {
        let log: CongestionLog = [
            CcSnapshot::from([i64::MIN, 1, 0, 0, 0, 0, 0, 0]),
            CcSnapshot::from([i64::MAX, 2, 0, 0, 0, 0, 0, 0]),
        ]
        .into_iter()
        .collect();
        assert_eq!(log.duration(), i64::MAX);

        let backwards: CongestionLog = [
            CcSnapshot::from([i64::MAX, 1, 0, 0, 0, 0, 0, 0]),
            CcSnapshot::from([i64::MIN, 2, 0, 0, 0, 0, 0, 0]),
        ]
        .into_iter()
        .collect();
        assert_eq!(backwards.duration(), i64::MIN);
    }
}

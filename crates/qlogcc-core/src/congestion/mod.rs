//! Congestion-control state tracking
//!
//! Holds the "last known value" of every congestion metric for one entity
//! (a trace, or one path of a multipath trace) and merges sparse
//! `recovery:metrics_updated` payloads into it.

mod log;
mod path;

pub use log::CongestionLog;
pub use path::{CongestionTracker, PathSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::qlog::value::{coerce_i64, describe};

/// Columns of a congestion snapshot, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CcColumn {
    /// Absolute event time
    EventTime,
    /// Congestion window
    Cwnd,
    /// Bytes sent but not yet acknowledged
    BytesInFlight,
    /// Pacing rate
    PacingRate,
    /// Smoothed RTT
    SmoothedRtt,
    /// Minimum RTT
    MinRtt,
    /// Latest RTT sample
    LatestRtt,
    /// Application-limited flag
    AppLimited,
}

impl CcColumn {
    /// All columns, in output order
    pub const ALL: [CcColumn; 8] = [
        CcColumn::EventTime,
        CcColumn::Cwnd,
        CcColumn::BytesInFlight,
        CcColumn::PacingRate,
        CcColumn::SmoothedRtt,
        CcColumn::MinRtt,
        CcColumn::LatestRtt,
        CcColumn::AppLimited,
    ];

    /// Column header
    pub fn name(&self) -> &'static str {
        match self {
            CcColumn::EventTime => "event_time",
            CcColumn::Cwnd => "cwnd",
            CcColumn::BytesInFlight => "bytes_in_flight",
            CcColumn::PacingRate => "pacing_rate",
            CcColumn::SmoothedRtt => "smoothed_rtt",
            CcColumn::MinRtt => "min_rtt",
            CcColumn::LatestRtt => "latest_rtt",
            CcColumn::AppLimited => "app_limited",
        }
    }

    /// Look up a column by header
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Look up a metric reported in a `metrics_updated` payload.
    ///
    /// `event_time` is not a payload metric; it comes from the event itself.
    pub fn metric_from_name(name: &str) -> Option<Self> {
        Self::from_name(name).filter(|c| *c != CcColumn::EventTime)
    }

    /// Position in [`CcSnapshot::values`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Header row for exported snapshots
    pub fn headers() -> [&'static str; 8] {
        Self::ALL.map(|c| c.name())
    }
}

/// Full congestion state at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcSnapshot {
    /// Absolute event time (us)
    pub event_time: i64,
    /// Congestion window (bytes)
    pub cwnd: i64,
    /// Bytes sent but not yet acknowledged
    pub bytes_in_flight: i64,
    /// Pacing rate (bytes per second)
    pub pacing_rate: i64,
    /// Smoothed RTT (us)
    pub smoothed_rtt: i64,
    /// Minimum RTT (us)
    pub min_rtt: i64,
    /// Latest RTT sample (us)
    pub latest_rtt: i64,
    /// 1 when the sender was application limited
    pub app_limited: i64,
}

impl CcSnapshot {
    /// Values in column order
    pub fn values(&self) -> [i64; 8] {
        [
            self.event_time,
            self.cwnd,
            self.bytes_in_flight,
            self.pacing_rate,
            self.smoothed_rtt,
            self.min_rtt,
            self.latest_rtt,
            self.app_limited,
        ]
    }

    /// Value of one column
    pub fn get(&self, column: CcColumn) -> i64 {
        self.values()[column.index()]
    }

    fn set(&mut self, column: CcColumn, value: i64) {
        let field = match column {
            CcColumn::EventTime => &mut self.event_time,
            CcColumn::Cwnd => &mut self.cwnd,
            CcColumn::BytesInFlight => &mut self.bytes_in_flight,
            CcColumn::PacingRate => &mut self.pacing_rate,
            CcColumn::SmoothedRtt => &mut self.smoothed_rtt,
            CcColumn::MinRtt => &mut self.min_rtt,
            CcColumn::LatestRtt => &mut self.latest_rtt,
            CcColumn::AppLimited => &mut self.app_limited,
        };
        *field = value;
    }
}

impl From<[i64; 8]> for CcSnapshot {
    fn from(v: [i64; 8]) -> Self {
        Self {
            event_time: v[0],
            cwnd: v[1],
            bytes_in_flight: v[2],
            pacing_rate: v[3],
            smoothed_rtt: v[4],
            min_rtt: v[5],
            latest_rtt: v[6],
            app_limited: v[7],
        }
    }
}

/// What one payload merge did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Metrics overwritten
    pub updated: Vec<CcColumn>,
    /// Payload keys that are not congestion metrics
    pub unknown: Vec<String>,
    /// Metrics whose value could not be read as an integer
    pub rejected: Vec<CcColumn>,
}

/// Mutable congestion state of one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CongestionState {
    current: CcSnapshot,
}

impl CongestionState {
    /// Create a state with every metric at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a `metrics_updated` payload.
    ///
    /// The timestamp always moves to `event_time`. Metrics absent from the
    /// payload keep their previous value. A payload that is not an object
    /// updates only the timestamp.
    pub fn update(&mut self, event_time: i64, payload: Option<&Value>) -> UpdateReport {
        self.current.event_time = event_time;
        let mut report = UpdateReport::default();

        let metrics = match payload {
            Some(Value::Object(map)) => map,
            Some(other) => {
                tracing::warn!("metrics_updated payload is not an object: {}", describe(other));
                return report;
            }
            None => return report,
        };

        for (key, value) in metrics {
            let Some(column) = CcColumn::metric_from_name(key) else {
                tracing::warn!("Unexpected cc element: {key}");
                report.unknown.push(key.clone());
                continue;
            };
            match coerce_i64(value) {
                Some(v) => {
                    self.current.set(column, v);
                    report.updated.push(column);
                }
                None => {
                    tracing::warn!("Ignoring non-numeric {key}: {}", describe(value));
                    report.rejected.push(column);
                }
            }
        }

        report
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CcSnapshot {
        self.current
    }
}

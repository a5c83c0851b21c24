//! Trace loading
//!
//! Drives schema resolution, event normalization and congestion tracking
//! over one element of a qlog document's `traces` array.

use std::fmt;

use serde_json::{Map, Value};

use super::error::{EventError, SchemaError};
use super::event::{normalize_event, Normalized, QlogEvent};
use super::schema::{EventField, FieldSchema};
use super::value::{coerce_i64, describe};
use super::{LoadOptions, TraceMode};
use crate::congestion::{CongestionLog, CongestionTracker, PathSet};

/// Where a trace stopped loading events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceAbort {
    /// Index of the offending record in `events`
    pub index: usize,
    /// Why the record was rejected
    pub error: EventError,
}

/// Tracked entity within a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityId {
    /// The whole trace (single-path loading)
    Trace,
    /// One path (multipath loading)
    Path(i64),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Trace => write!(f, "trace"),
            EntityId::Path(id) => write!(f, "path_{id}"),
        }
    }
}

/// Congestion data of a trace, flat or split by path
#[derive(Debug, Clone)]
pub enum TraceData {
    /// One state for the whole trace
    Single(CongestionTracker),
    /// One state per `path_id`
    Paths(PathSet),
}

impl TraceData {
    fn new(mode: TraceMode) -> Self {
        match mode {
            TraceMode::Single => TraceData::Single(CongestionTracker::new()),
            TraceMode::Multipath => TraceData::Paths(PathSet::new()),
        }
    }

    fn record(&mut self, event: QlogEvent) {
        match self {
            TraceData::Single(tracker) => {
                tracker.record(event);
            }
            TraceData::Paths(paths) => {
                paths.record(event);
            }
        }
    }
}

/// One loaded qlog trace
#[derive(Debug, Clone)]
pub struct Trace {
    schema: FieldSchema,
    schema_error: Option<SchemaError>,
    reference_time: i64,
    data: TraceData,
    abort: Option<TraceAbort>,
}

impl Trace {
    /// Create an empty trace
    pub fn new(mode: TraceMode) -> Self {
        Self {
            schema: FieldSchema::default(),
            schema_error: None,
            reference_time: 0,
            data: TraceData::new(mode),
            abort: None,
        }
    }

    /// Load a trace from its JSON object.
    ///
    /// `event_fields` and `common_fields` are applied before `events`
    /// wherever they appear in the object. Loading stops at the first event
    /// that fails normalization; everything routed before it is kept.
    pub fn load(value: &Value, options: &LoadOptions) -> Self {
        let mut trace = Self::new(options.mode);

        let Some(object) = value.as_object() else {
            tracing::warn!("trace is not an object: {}", describe(value));
            return trace;
        };

        let (fields, common, events) = split_sections(object);

        if let Some(fields) = fields {
            trace.load_event_fields(fields);
        }
        if let Some(common) = common {
            trace.load_common(common);
        }
        if let Some(events) = events {
            if let Some(err) = &trace.schema_error {
                tracing::warn!("skipping events: {err}");
            } else {
                trace.load_events(events, options);
            }
        }

        trace
    }

    fn load_event_fields(&mut self, value: &Value) {
        match FieldSchema::from_json(value) {
            Ok(schema) => {
                tracing::debug!("event_fields: {:?}", schema.names());
                for name in schema.unrecognized() {
                    tracing::warn!("event_fields: unexpected event element '{name}'");
                }
                self.schema = schema;
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.schema_error = Some(err);
            }
        }
    }

    fn load_common(&mut self, value: &Value) {
        let reference = value.as_object().and_then(|cf| cf.get("reference_time"));
        match reference {
            Some(raw) => match coerce_i64(raw) {
                Some(t) => {
                    self.reference_time = t;
                    tracing::debug!("reference_time: {t}");
                }
                None => tracing::warn!("invalid reference_time {}, using 0", describe(raw)),
            },
            None => tracing::debug!("common_fields without reference_time: {}", describe(value)),
        }
    }

    fn load_events(&mut self, value: &Value, options: &LoadOptions) {
        let Some(records) = value.as_array() else {
            tracing::warn!("events is not an array: {}", describe(value));
            return;
        };
        tracing::debug!("{} events", records.len());

        if options.mode == TraceMode::Single && self.schema.has(EventField::PathId) {
            tracing::debug!("single-path loading ignores path_id");
        }

        for (index, record) in records.iter().enumerate() {
            let result = normalize_event(
                record,
                &self.schema,
                self.reference_time,
                options.field_policy,
            )
            .and_then(Normalized::into_result);

            match result {
                Ok(event) => self.data.record(event),
                Err(error) => {
                    tracing::warn!("Error load event {index}: {error}");
                    self.abort = Some(TraceAbort { index, error });
                    break;
                }
            }
        }

        for (entity, tracker) in self.entities() {
            tracing::info!(
                "{entity}: loaded {} events, {} congestion snapshots",
                tracker.events().len(),
                tracker.log().len()
            );
        }
    }

    /// Declared event field schema
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Why `event_fields` was rejected, if it was
    pub fn schema_error(&self) -> Option<&SchemaError> {
        self.schema_error.as_ref()
    }

    /// Reference time in microseconds (0 when not declared)
    pub fn reference_time(&self) -> i64 {
        self.reference_time
    }

    /// Where event loading stopped, if it did
    pub fn abort(&self) -> Option<&TraceAbort> {
        self.abort.as_ref()
    }

    /// Congestion data
    pub fn data(&self) -> &TraceData {
        &self.data
    }

    /// Single-path tracker, when loaded in single mode
    pub fn tracker(&self) -> Option<&CongestionTracker> {
        match &self.data {
            TraceData::Single(tracker) => Some(tracker),
            TraceData::Paths(_) => None,
        }
    }

    /// Per-path trackers, when loaded in multipath mode
    pub fn paths(&self) -> Option<&PathSet> {
        match &self.data {
            TraceData::Paths(paths) => Some(paths),
            TraceData::Single(_) => None,
        }
    }

    /// Every tracked entity with its tracker
    pub fn entities(&self) -> Vec<(EntityId, &CongestionTracker)> {
        match &self.data {
            TraceData::Single(tracker) => vec![(EntityId::Trace, tracker)],
            TraceData::Paths(paths) => paths
                .iter()
                .map(|(id, tracker)| (EntityId::Path(id), tracker))
                .collect(),
        }
    }

    /// Every tracked entity with its congestion log
    pub fn congestion_logs(&self) -> Vec<(EntityId, &CongestionLog)> {
        self.entities()
            .into_iter()
            .map(|(id, tracker)| (id, tracker.log()))
            .collect()
    }

    /// Number of events accepted across all entities
    pub fn event_count(&self) -> usize {
        self.entities().iter().map(|(_, t)| t.events().len()).sum()
    }
}

type Sections<'a> = (Option<&'a Value>, Option<&'a Value>, Option<&'a Value>);

fn split_sections(object: &Map<String, Value>) -> Sections<'_> {
    let (mut fields, mut common, mut events) = (None, None, None);
    for (key, value) in object {
        match key.as_str() {
            "event_fields" => fields = Some(value),
            "common_fields" => common = Some(value),
            "events" => events = Some(value),
            _ => tracing::debug!("ignoring trace key {key}: {}", describe(value)),
        }
    }
    (fields, common, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::CcSnapshot;
    use crate::qlog::FieldPolicy;
    use serde_json::json;

    #[test]
    fn test_events_before_metadata() {
        let value = json!({
            "events": [[5, "recovery", "metrics_updated", {"cwnd": 9}]],
            "event_fields": ["relative_time", "category", "event", "data"],
            "common_fields": {"reference_time": "100"}
        });
        let trace = Trace::load(&value, &LoadOptions::default());
        assert_eq!(trace.reference_time(), 100);
        assert_eq!(
            trace.tracker().unwrap().log().entries(),
            &[CcSnapshot::from([105, 9, 0, 0, 0, 0, 0, 0])]
        );
    }

    #[test]
    fn test_bad_event_fields_skips_events() {
        let value = json!({
            "event_fields": "relative_time",
            "events": [[5]]
        });
        let trace = Trace::load(&value, &LoadOptions::default());
        assert!(trace.schema_error().is_some());
        assert_eq!(trace.event_count(), 0);
        assert!(trace.abort().is_none());
    }

    #[test]
    fn test_strict_policy_aborts_on_unrecognized_field() {
        let value = json!({
            "event_fields": ["relative_time", "trigger", "category", "event", "data"],
            "events": [[1, "x", "recovery", "metrics_updated", {"cwnd": 1}]]
        });
        let strict = LoadOptions {
            field_policy: FieldPolicy::Strict,
            ..Default::default()
        };
        let trace = Trace::load(&value, &strict);
        assert_eq!(trace.abort().map(|a| a.index), Some(0));
        assert!(trace.tracker().unwrap().log().is_empty());

        let trace = Trace::load(&value, &LoadOptions::default());
        assert!(trace.abort().is_none());
        assert_eq!(trace.tracker().unwrap().log().len(), 1);
    }

    #[test]
    fn test_non_object_trace_is_empty() {
        let trace = Trace::load(&json!([1, 2]), &LoadOptions::default());
        assert_eq!(trace.event_count(), 0);
        assert_eq!(trace.entities().len(), 1);
    }

    #[test]
    fn test_entity_labels() {
        assert_eq!(EntityId::Trace.to_string(), "trace");
        assert_eq!(EntityId::Path(-1).to_string(), "path_-1");
        assert_eq!(EntityId::Path(3).to_string(), "path_3");
    }
}

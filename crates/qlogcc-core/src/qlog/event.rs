//! Event normalization
//!
//! Turns one positional event record into a [`QlogEvent`] using the trace's
//! [`FieldSchema`] and reference time.

use serde::Serialize;
use serde_json::Value;

use super::error::EventError;
use super::schema::{EventField, FieldSchema, FieldSlot};
use super::value::{coerce_i64, describe};
use super::FieldPolicy;

/// Path identifier of events that carry no `path_id`
pub const UNASSIGNED_PATH: i64 = -1;

/// Category of congestion-control events
pub const RECOVERY_CATEGORY: &str = "recovery";

/// Event name of congestion metric updates
pub const METRICS_UPDATED: &str = "metrics_updated";

/// A normalized qlog event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QlogEvent {
    /// Absolute time: relative time plus the trace reference time (us)
    pub time: i64,
    /// Path identifier, [`UNASSIGNED_PATH`] when not declared
    pub path_id: i64,
    /// Event category, e.g. `recovery`
    pub category: String,
    /// Event name, e.g. `metrics_updated`
    pub event: String,
    /// Opaque payload
    pub data: Option<Value>,
}

impl Default for QlogEvent {
    fn default() -> Self {
        Self {
            time: 0,
            path_id: UNASSIGNED_PATH,
            category: String::new(),
            event: String::new(),
            data: None,
        }
    }
}

impl QlogEvent {
    /// Check if this event feeds the congestion accumulator
    pub fn is_metrics_update(&self) -> bool {
        self.category == RECOVERY_CATEGORY && self.event == METRICS_UPDATED
    }
}

/// Outcome of normalizing one record whose shape matched the schema.
///
/// Field-level failures do not stop the remaining fields from being
/// assigned, so `event` is always as complete as the record allows.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Event built from the fields that were accepted
    pub event: QlogEvent,
    /// Field errors, in schema order
    pub errors: Vec<EventError>,
}

impl Normalized {
    /// Check if every field was accepted
    pub fn is_good(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collapse into the event or the first field error
    pub fn into_result(self) -> Result<QlogEvent, EventError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.event),
        }
    }
}

/// Normalize a positional event record.
///
/// Fails outright when the record is not an array or its length differs from
/// the schema. Otherwise every position is assigned; malformed
/// `relative_time`, `path_id`, `category` or `event` values are collected in
/// [`Normalized::errors`], as are unrecognized field names under
/// [`FieldPolicy::Strict`].
pub fn normalize_event(
    record: &Value,
    schema: &FieldSchema,
    reference_time: i64,
    policy: FieldPolicy,
) -> Result<Normalized, EventError> {
    let values = record
        .as_array()
        .ok_or_else(|| EventError::NotAnArray(describe(record)))?;

    if values.len() != schema.len() {
        return Err(EventError::LengthMismatch {
            expected: schema.len(),
            actual: values.len(),
        });
    }

    let mut event = QlogEvent::default();
    let mut errors = Vec::new();

    for (slot, value) in schema.slots().iter().zip(values) {
        let field = match slot {
            FieldSlot::Known(field) => *field,
            FieldSlot::Unrecognized(name) => {
                if policy == FieldPolicy::Strict {
                    errors.push(EventError::UnrecognizedField(name.clone()));
                }
                continue;
            }
        };

        match field {
            EventField::RelativeTime => {
                match coerce_i64(value).and_then(|t| t.checked_add(reference_time)) {
                    Some(time) => event.time = time,
                    None => errors.push(invalid(field, value)),
                }
            }
            EventField::PathId => match coerce_i64(value) {
                Some(id) => event.path_id = id,
                None => errors.push(invalid(field, value)),
            },
            EventField::Category => match value.as_str() {
                Some(s) => event.category = s.to_string(),
                None => errors.push(invalid(field, value)),
            },
            EventField::Event => match value.as_str() {
                Some(s) => event.event = s.to_string(),
                None => errors.push(invalid(field, value)),
            },
            EventField::Data => {
                if !value.is_null() {
                    event.data = Some(value.clone());
                }
            }
        }
    }

    Ok(Normalized { event, errors })
}

fn invalid(field: EventField, value: &Value) -> EventError {
    EventError::InvalidValue {
        field: field.name().to_string(),
        value: describe(value),
    }
}

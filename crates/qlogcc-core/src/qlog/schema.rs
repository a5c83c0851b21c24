//! Event field schema
//!
//! A qlog trace declares the layout of its positional event records once, in
//! `event_fields`. The names are stored verbatim and resolved up front into
//! [`FieldSlot`]s so the normalizer can dispatch on an enum per position.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::SchemaError;
use super::value::describe;

/// Event fields the loader knows how to interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    /// Offset from the trace reference time, in microseconds
    RelativeTime,
    /// Multipath path identifier
    PathId,
    /// Event category, e.g. "recovery"
    Category,
    /// Event name within the category, e.g. "metrics_updated"
    Event,
    /// Event payload
    Data,
}

impl EventField {
    /// All recognized fields
    pub const ALL: [EventField; 5] = [
        EventField::RelativeTime,
        EventField::PathId,
        EventField::Category,
        EventField::Event,
        EventField::Data,
    ];

    /// Resolve a declared field name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "relative_time" => Some(EventField::RelativeTime),
            "path_id" => Some(EventField::PathId),
            "category" => Some(EventField::Category),
            "event" => Some(EventField::Event),
            "data" => Some(EventField::Data),
            _ => None,
        }
    }

    /// Field name as written in `event_fields`
    pub fn name(&self) -> &'static str {
        match self {
            EventField::RelativeTime => "relative_time",
            EventField::PathId => "path_id",
            EventField::Category => "category",
            EventField::Event => "event",
            EventField::Data => "data",
        }
    }
}

/// One resolved position of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSlot {
    /// A field the normalizer understands
    Known(EventField),
    /// Any other declared name, kept verbatim
    Unrecognized(String),
}

/// Ordered field layout of a trace's event records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    names: Vec<String>,
    slots: Vec<FieldSlot>,
}

impl FieldSchema {
    /// Build a schema from declared names. Any name is accepted.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let slots = names
            .iter()
            .map(|name| match EventField::from_name(name) {
                Some(field) => FieldSlot::Known(field),
                None => FieldSlot::Unrecognized(name.clone()),
            })
            .collect();
        Self { names, slots }
    }

    /// Build a schema from the raw `event_fields` JSON value
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        let entries = value
            .as_array()
            .ok_or_else(|| SchemaError::NotAnArray(describe(value)))?;

        let mut names = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match entry.as_str() {
                Some(name) => names.push(name.to_string()),
                None => {
                    return Err(SchemaError::NonStringField {
                        index,
                        value: describe(entry),
                    })
                }
            }
        }
        Ok(Self::new(names))
    }

    /// Number of fields per event record
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no fields are declared
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declared names, in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolved slots, in order
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    /// Position of a recognized field
    pub fn position(&self, field: EventField) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| *slot == FieldSlot::Known(field))
    }

    /// Check if a recognized field is declared
    pub fn has(&self, field: EventField) -> bool {
        self.position(field).is_some()
    }

    /// Declared names that the loader does not recognize
    pub fn unrecognized(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|slot| match slot {
            FieldSlot::Unrecognized(name) => Some(name.as_str()),
            FieldSlot::Known(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_resolves_known_names() {
        let schema = FieldSchema::new(["relative_time", "path_id", "category", "event", "data"]);
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.position(EventField::RelativeTime), Some(0));
        assert_eq!(schema.position(EventField::Data), Some(4));
        assert_eq!(schema.unrecognized().count(), 0);
    }

    #[test]
    fn test_schema_keeps_unrecognized_names() {
        let schema = FieldSchema::new(["relative_time", "trigger", "data"]);
        assert_eq!(schema.names()[1], "trigger");
        assert_eq!(schema.slots()[1], FieldSlot::Unrecognized("trigger".into()));
        assert!(!schema.has(EventField::PathId));
        assert_eq!(schema.unrecognized().collect::<Vec<_>>(), vec!["trigger"]);
    }

    #[test]
    fn test_schema_from_json() {
        let schema = FieldSchema::from_json(&json!(["relative_time", "category"])).unwrap();
        assert_eq!(schema.names(), ["relative_time", "category"]);

        assert!(matches!(
            FieldSchema::from_json(&json!("relative_time")),
            Err(SchemaError::NotAnArray(_))
        ));
        assert_eq!(
            FieldSchema::from_json(&json!(["relative_time", 3])),
            Err(SchemaError::NonStringField {
                index: 1,
                value: "3".into()
            })
        );
    }

    #[test]
    fn test_field_name_round_trip() {
        for field in EventField::ALL {
            assert_eq!(EventField::from_name(field.name()), Some(field));
        }
        assert_eq!(EventField::from_name("Relative_Time"), None);
    }
}

//! qlog Document Loader
//!
//! Loads qlog JSON documents produced by QUIC stacks and extracts the
//! congestion-control telemetry carried by `recovery:metrics_updated`
//! events. Supports:
//! - Positional event records described by `event_fields`
//! - Reference time from `common_fields`
//! - Single-path traces and multipath traces split by `path_id`

mod error;
mod event;
mod schema;
mod trace;
pub mod value;

pub use error::{EventError, QlogError, SchemaError};
pub use event::{
    normalize_event, Normalized, QlogEvent, METRICS_UPDATED, RECOVERY_CATEGORY, UNASSIGNED_PATH,
};
pub use schema::{EventField, FieldSchema, FieldSlot};
pub use trace::{EntityId, Trace, TraceAbort, TraceData};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use value::describe;

/// How unrecognized names in `event_fields` are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// Warn once per trace and ignore the column
    #[default]
    Lenient,
    /// Fail every event that carries the column
    Strict,
}

/// Whether events are tracked per trace or per path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// One congestion log per trace; `path_id` is ignored
    #[default]
    Single,
    /// One congestion log per `path_id`
    Multipath,
}

/// Loader configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Handling of unrecognized schema fields
    pub field_policy: FieldPolicy,
    /// Flat or per-path congestion tracking
    pub mode: TraceMode,
}

impl LoadOptions {
    /// Default options with the given mode
    pub fn with_mode(mode: TraceMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

/// A loaded qlog document
#[derive(Debug, Clone, Default)]
pub struct QlogFile {
    /// `qlog_version`, when present
    pub qlog_version: Option<String>,
    /// `title`, when present
    pub title: Option<String>,
    /// Traces, in document order
    pub traces: Vec<Trace>,
}

impl QlogFile {
    /// Load a qlog document from a file
    pub fn from_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, QlogError> {
        let path = path.as_ref();
        tracing::info!("loading {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content, options)
    }

    /// Load a qlog document from a JSON string
    pub fn from_str(content: &str, options: &LoadOptions) -> Result<Self, QlogError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value, options)
    }

    /// Load a qlog document from parsed JSON.
    ///
    /// Only a non-object document is an error. A missing `traces` array
    /// yields a document with no traces.
    pub fn from_value(value: &Value, options: &LoadOptions) -> Result<Self, QlogError> {
        let object = value.as_object().ok_or_else(|| {
            QlogError::InvalidDocument(format!("expected a JSON object, got {}", describe(value)))
        })?;

        let mut file = QlogFile::default();
        for (key, value) in object {
            match key.as_str() {
                "qlog_version" => {
                    tracing::debug!("qlog_version: {value}");
                    file.qlog_version = Some(text_of(value));
                }
                "title" => {
                    tracing::debug!("title: {value}");
                    file.title = Some(text_of(value));
                }
                "traces" => match value.as_array() {
                    Some(traces) => {
                        for (i, trace) in traces.iter().enumerate() {
                            tracing::debug!("traces[{i}]");
                            file.traces.push(Trace::load(trace, options));
                        }
                    }
                    None => tracing::warn!("traces is not an array: {}", describe(value)),
                },
                _ => tracing::debug!("ignoring {key}: {}", describe(value)),
            }
        }

        if !object.contains_key("traces") {
            tracing::warn!("document has no traces");
        }
        tracing::info!("loaded {} traces", file.traces.len());
        Ok(file)
    }

    /// First trace, which the comparison tools plot
    pub fn first_trace(&self) -> Option<&Trace> {
        self.traces.first()
    }
}

/// Load several qlog files one after the other.
///
/// Stops at the first file that cannot be read or parsed.
pub fn load_files<P: AsRef<Path>>(
    paths: &[P],
    options: &LoadOptions,
) -> Result<Vec<QlogFile>, QlogError> {
    paths
        .iter()
        .map(|path| QlogFile::from_file(path, options))
        .collect()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_metadata() {
        let doc = json!({
            "qlog_version": "draft-00",
            "title": "picoquic",
            "traces": []
        });
        let file = QlogFile::from_value(&doc, &LoadOptions::default()).unwrap();
        assert_eq!(file.qlog_version.as_deref(), Some("draft-00"));
        assert_eq!(file.title.as_deref(), Some("picoquic"));
        assert!(file.traces.is_empty());
        assert!(file.first_trace().is_none());
    }

    #[test]
    fn test_missing_traces_is_not_an_error() {
        let file = QlogFile::from_value(&json!({"title": "x"}), &LoadOptions::default()).unwrap();
        assert!(file.traces.is_empty());
    }

    #[test]
    fn test_non_object_document_is_an_error() {
        let err = QlogFile::from_value(&json!([1, 2, 3]), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, QlogError::InvalidDocument(_)));

        let err = QlogFile::from_str("{not json", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, QlogError::JsonError(_)));
    }

    #[test]
    fn test_load_options_deserialize() {
        let options: LoadOptions =
            serde_json::from_value(json!({"field_policy": "strict"})).unwrap();
        assert_eq!(options.field_policy, FieldPolicy::Strict);
        assert_eq!(options.mode, TraceMode::Single);

        let options: LoadOptions = serde_json::from_value(json!({"mode": "multipath"})).unwrap();
        assert_eq!(options, LoadOptions::with_mode(TraceMode::Multipath));
    }
}

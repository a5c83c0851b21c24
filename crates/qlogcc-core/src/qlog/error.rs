//! Error types for qlog loading

use thiserror::Error;

/// Errors that abort loading a whole qlog document
#[derive(Error, Debug)]
pub enum QlogError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid JSON
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Valid JSON that is not a qlog document
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Errors that reject a trace's declared `event_fields`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// `event_fields` is not an array
    #[error("event_fields must be an array, got {0}")]
    NotAnArray(String),

    /// An `event_fields` entry is not a string
    #[error("event_fields[{index}] must be a string, got {value}")]
    NonStringField {
        /// Position in `event_fields`
        index: usize,
        /// Rendering of the offending entry
        value: String,
    },
}

/// Errors raised while normalizing a single positional event record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The record is not an array
    #[error("event record must be an array, got {0}")]
    NotAnArray(String),

    /// The record length differs from the schema length
    #[error("event has {actual} elements, schema declares {expected}")]
    LengthMismatch {
        /// Number of declared fields
        expected: usize,
        /// Number of record elements
        actual: usize,
    },

    /// The schema names a field this loader does not know
    #[error("unexpected event element '{0}'")]
    UnrecognizedField(String),

    /// A field holds a value of the wrong type
    #[error("invalid value for '{field}': {value}")]
    InvalidValue {
        /// Field or metric name
        field: String,
        /// Rendering of the rejected value
        value: String,
    },
}

//! # qlogcc Core Library
//!
//! Congestion-control telemetry extraction from qlog traces.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - qlog document and trace loading with positional event schemas
//! - Per-trace and per-path congestion state tracking
//! - Chart plans for overlaying congestion logs
//! - CSV and JSON export of the resulting series
//!
//! ## Example
//!
//! ```rust,ignore
//! use qlogcc_core::prelude::*;
//!
//! let file = QlogFile::from_file("server.qlog", &LoadOptions::default())?;
//! if let Some(tracker) = file.first_trace().and_then(|t| t.tracker()) {
//!     for row in tracker.log().rows() {
//!         println!("{row:?}");
//!     }
//! }
//! ```

pub mod chart;
pub mod congestion;
pub mod export;
pub mod qlog;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chart::{comparison_series, path_series, ChartPlan, Series};
    pub use crate::congestion::{
        CcColumn, CcSnapshot, CongestionLog, CongestionState, CongestionTracker, PathSet,
    };
    pub use crate::export::{export_to_file, ExportFormat};
    pub use crate::qlog::{
        load_files, EntityId, FieldPolicy, LoadOptions, QlogEvent, QlogFile, Trace, TraceMode,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

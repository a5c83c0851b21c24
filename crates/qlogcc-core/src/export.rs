//! Series export
//!
//! Writes labeled congestion logs for external plotting tools.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::chart::{ChartPlan, Series};
use crate::congestion::CcColumn;

/// Errors that can occur while exporting series
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output file could not be written
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The chart document could not be serialized
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The output extension is neither `.csv` nor `.json`
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One row per snapshot, with a leading series column
    Csv,
    /// Chart plan plus series data
    Json,
}

impl ExportFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Chart plan bundled with the data it refers to
#[derive(Debug, Serialize)]
pub struct ChartDocument<'a> {
    /// Layout of the chart
    pub plan: ChartPlan,
    /// Data the plan's lines index into
    pub series: &'a [Series],
}

/// Write series as CSV
pub fn write_csv<W: Write>(mut writer: W, series: &[Series]) -> std::io::Result<()> {
    write!(writer, "series")?;
    for header in CcColumn::headers() {
        write!(writer, ",{}", header)?;
    }
    writeln!(writer)?;

    for s in series {
        for entry in s.log.entries() {
            write!(writer, "{}", csv_field(&s.label))?;
            for value in entry.values() {
                write!(writer, ",{}", value)?;
            }
            writeln!(writer)?;
        }
    }

    writer.flush()
}

/// Write the chart plan and series as JSON
pub fn write_json<W: Write>(writer: W, series: &[Series]) -> Result<(), ExportError> {
    let doc = ChartDocument {
        plan: ChartPlan::for_series(series),
        series,
    };
    serde_json::to_writer_pretty(writer, &doc)?;
    Ok(())
}

/// Write series to a file, picking the format from its extension
pub fn export_to_file<P: AsRef<Path>>(path: P, series: &[Series]) -> Result<(), ExportError> {
    let path = path.as_ref();
    let format = ExportFormat::from_extension(path)
        .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(&mut writer, series)?,
        ExportFormat::Json => {
            write_json(&mut writer, series)?;
            writer.flush()?;
        }
    }
    tracing::info!("wrote {} series to {}", series.len(), path.display());
    Ok(())
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::{CcSnapshot, CongestionLog};

    fn sample() -> Vec<Series> {
        let log: CongestionLog = [CcSnapshot::from([1500, 100, 50, 0, 0, 0, 0, 0])]
            .into_iter()
            .collect();
        vec![Series::new("main", log)]
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ExportFormat::from_extension(Path::new("out.csv")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            ExportFormat::from_extension(Path::new("out.JSON")),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_extension(Path::new("out.png")), None);
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "series,event_time,cwnd,bytes_in_flight,pacing_rate,smoothed_rtt,min_rtt,latest_rtt,app_limited\n\
             main,1500,100,50,0,0,0,0,0\n"
        );
    }

    #[test]
    fn test_csv_quotes_labels() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("path_0"), "path_0");
    }

    #[test]
    fn test_json_output() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["series"][0]["label"], "main");
        assert_eq!(value["series"][0]["log"][0]["cwnd"], 100);
        assert_eq!(value["plan"]["x"], "event_time");
        assert_eq!(value["plan"]["panels"][0]["lines"][1]["y"], "cwnd");
    }
}

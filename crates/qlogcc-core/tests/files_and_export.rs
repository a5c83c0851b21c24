//! File-level loading and export tests using on-disk fixtures.

use pretty_assertions::assert_eq;
use qlogcc_core::chart::{comparison_series, ChartPlan};
use qlogcc_core::export::{export_to_file, ExportError};
use qlogcc_core::qlog::{load_files, LoadOptions, QlogError, QlogFile};
use std::fs;
use tempfile::TempDir;

const CUBIC: &str = r#"{
  "qlog_version": "draft-00",
  "title": "picoquic",
  "traces": [{
    "vantage_point": {"name": "backend-67", "type": "server"},
    "event_fields": ["relative_time", "category", "event", "data"],
    "common_fields": {"protocol_type": "QUIC_HTTP3", "reference_time": "1000"},
    "events": [
      [0, "transport", "datagram_received", {"byte_length": 1252}],
      [500, "recovery", "metrics_updated", {"cwnd": 15360, "bytes_in_flight": 1200, "smoothed_rtt": 25000}],
      [900, "recovery", "metrics_updated", {"cwnd": 30720, "latest_rtt": 24000, "min_rtt": 23000}]
    ]
  }]
}"#;

const BBR: &str = r#"{
  "qlog_version": "draft-00",
  "title": "picoquic",
  "traces": [{
    "event_fields": ["relative_time", "category", "event", "data"],
    "common_fields": {"reference_time": 0},
    "events": [
      [100, "recovery", "metrics_updated", {"cwnd": 20000, "pacing_rate": 1000000}]
    ]
  }]
}"#;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_file_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "cubic.qlog", CUBIC);

    let file = QlogFile::from_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(file.title.as_deref(), Some("picoquic"));

    let trace = file.first_trace().unwrap();
    assert_eq!(trace.reference_time(), 1000);
    assert_eq!(
        trace.tracker().unwrap().log().rows(),
        vec![
            [1500, 15360, 1200, 0, 25000, 0, 0, 0],
            [1900, 30720, 1200, 0, 25000, 23000, 24000, 0],
        ]
    );
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = QlogFile::from_file(dir.path().join("absent.qlog"), &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, QlogError::IoError(_)));
}

#[test]
fn test_comparison_series_labels() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_fixture(&dir, "a.qlog", CUBIC),
        write_fixture(&dir, "b.qlog", BBR),
        write_fixture(&dir, "c.qlog", r#"{"traces": []}"#),
    ];

    let files = load_files(&paths, &LoadOptions::default()).unwrap();
    let series = comparison_series(&files, 0);

    let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["main", "background_1", "background_2"]);
    assert_eq!(series[0].log.len(), 2);
    assert_eq!(series[1].log.column_by_name("pacing_rate"), vec![1000000]);
    assert!(series[2].log.is_empty());

    let two = comparison_series(&files[..2], 0);
    assert_eq!(two[1].label, "background");
}

#[test]
fn test_empty_series_plan_is_not_an_error() {
    let files = vec![QlogFile::from_str(r#"{"traces": []}"#, &LoadOptions::default()).unwrap()];
    let series = comparison_series(&files, 0);
    let plan = ChartPlan::for_series(&series);
    assert_eq!(plan.series_count, 1);
    assert!(series[0].log.is_empty());
}

#[test]
fn test_export_csv_and_json() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "bbr.qlog", BBR);
    let files = load_files(&[input], &LoadOptions::default()).unwrap();
    let series = comparison_series(&files, 0);

    let csv_path = dir.path().join("out.csv");
    export_to_file(&csv_path, &series).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "main,100,20000,0,1000000,0,0,0,0");

    let json_path = dir.path().join("out.json");
    export_to_file(&json_path, &series).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["series"][0]["log"][0]["pacing_rate"], 1000000);
    assert_eq!(value["plan"]["panels"].as_array().unwrap().len(), 2);

    let err = export_to_file(dir.path().join("out.png"), &series).unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedFormat(_)));
}

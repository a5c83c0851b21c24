//! Plain-text summary of congestion series

use qlogcc_core::chart::Series;
use qlogcc_core::congestion::CcColumn;

const HEADER: [&str; 7] = [
    "series",
    "snapshots",
    "duration_us",
    "max_cwnd",
    "max_bytes_in_flight",
    "min_rtt",
    "last_srtt",
];

/// Render one row per series
pub fn render(series: &[Series]) -> String {
    let rows: Vec<[String; 7]> = series.iter().map(row).collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADER.map(String::from), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no congestion data)\n");
    }
    out
}

fn row(s: &Series) -> [String; 7] {
    let max = |column| s.log.column(column).into_iter().max();
    let min_rtt = s
        .log
        .column(CcColumn::MinRtt)
        .into_iter()
        .filter(|v| *v > 0)
        .min();
    let last_srtt = s.log.last().map(|e| e.smoothed_rtt);

    [
        s.label.clone(),
        s.log.len().to_string(),
        s.log.duration().to_string(),
        cell(max(CcColumn::Cwnd)),
        cell(max(CcColumn::BytesInFlight)),
        cell(min_rtt),
        cell(last_srtt),
    ]
}

fn cell(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn push_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let mut first = true;
    for (cell, &width) in cells.iter().zip(widths) {
        if !first {
            out.push_str("  ");
        }
        first = false;
        out.push_str(&format!("{cell:<width$}"));
    }
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

//! Chart plan
//!
//! Describes how congestion logs are overlaid for comparison, independent
//! of the plotting backend: a tall "bytes" panel with congestion window and
//! bytes in flight, and a short "us" panel with RTT samples, sharing the
//! time axis. Plans serialize with serde so any renderer can consume them.

use serde::{Deserialize, Serialize};

use crate::congestion::{CcColumn, CongestionLog};
use crate::qlog::{EntityId, QlogFile, Trace};

/// At most this many series are overlaid on one chart
pub const MAX_SERIES: usize = 5;

const PRIMARY_COLORS: [&str; MAX_SERIES] = ["blue", "green", "violet", "red", "orange"];
const SECONDARY_COLORS: [&str; MAX_SERIES] = ["turquoise", "lime", "magenta", "pink", "yellow"];
const LINE_STYLES: [LineStyle; MAX_SERIES] = [
    LineStyle::Solid,
    LineStyle::Dashed,
    LineStyle::DashDot,
    LineStyle::Dotted,
    LineStyle::Dotted,
];
const MARKERS: [Marker; MAX_SERIES] = [
    Marker::Circle,
    Marker::Plus,
    Marker::Cross,
    Marker::Triangle,
    Marker::Point,
];

/// A congestion log with its legend label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Legend label, e.g. "main" or "path_0"
    pub label: String,
    /// Snapshots to plot
    pub log: CongestionLog,
}

impl Series {
    /// Create a labeled series
    pub fn new(label: impl Into<String>, log: CongestionLog) -> Self {
        Self {
            label: label.into(),
            log,
        }
    }
}

/// Label of the `index`-th file (0-based) out of `count` compared files.
///
/// The first file is "main". A single extra file is "background"; with more
/// files they are numbered "background_1", "background_2", and so on.
pub fn comparison_label(index: usize, count: usize) -> String {
    match (index, count) {
        (0, _) => "main".to_string(),
        (1, 2) => "background".to_string(),
        (i, _) => format!("background_{i}"),
    }
}

/// Label of a path's series
pub fn path_label(path_id: i64) -> String {
    format!("path_{path_id}")
}

/// One series per file, taken from trace `trace` of each file.
///
/// Files must be loaded in [`TraceMode::Single`](crate::qlog::TraceMode).
/// A file without that trace contributes an empty series so labels stay
/// aligned with the file order.
pub fn comparison_series(files: &[QlogFile], trace: usize) -> Vec<Series> {
    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let log = file
                .traces
                .get(trace)
                .and_then(Trace::tracker)
                .map(|tracker| tracker.log().clone())
                .unwrap_or_default();
            Series::new(comparison_label(i, files.len()), log)
        })
        .collect()
}

/// One series per path of a trace, in the order paths first appear
pub fn path_series(trace: &Trace) -> Vec<Series> {
    trace
        .congestion_logs()
        .into_iter()
        .map(|(entity, log)| {
            let label = match entity {
                EntityId::Path(id) => path_label(id),
                EntityId::Trace => entity.to_string(),
            };
            Series::new(label, log.clone())
        })
        .collect()
}

/// How a column is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    /// Unconnected markers
    Scatter,
    /// Connected line
    Line,
}

/// Dash pattern of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// `-`
    Solid,
    /// `--`
    Dashed,
    /// `-.`
    DashDot,
    /// `:`
    Dotted,
}

/// Scatter marker shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// `o`
    Circle,
    /// `+`
    Plus,
    /// `x`
    Cross,
    /// `^`
    Triangle,
    /// `.`
    Point,
}

/// One plotted column of one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotLine {
    /// Legend text
    pub label: String,
    /// Index into the plotted series
    pub series: usize,
    /// Column on the y axis
    pub y: CcColumn,
    /// Scatter or line
    pub kind: PlotKind,
    /// Color name
    pub color: String,
    /// Dash pattern
    pub style: LineStyle,
    /// Marker shape, scatter plots only
    pub marker: Option<Marker>,
    /// Line width, or marker size for scatter plots
    pub width: f32,
    /// Opacity, 0 to 1
    pub alpha: f32,
}

/// One set of axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Y axis label
    pub y_label: String,
    /// Relative height among the chart's panels
    pub height_ratio: u32,
    /// Lines drawn on these axes
    pub lines: Vec<PlotLine>,
}

/// Full chart layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPlan {
    /// Column on the shared x axis
    pub x: CcColumn,
    /// X axis label
    pub x_label: String,
    /// Panels from top to bottom
    pub panels: Vec<Panel>,
    /// Series actually plotted
    pub series_count: usize,
}

impl ChartPlan {
    /// Build the comparison layout for `series`.
    ///
    /// Only the first [`MAX_SERIES`] series are plotted. An empty slice
    /// yields the two panels with no lines.
    pub fn for_series(series: &[Series]) -> Self {
        if series.len() > MAX_SERIES {
            tracing::warn!(
                "plotting the first {MAX_SERIES} of {} series",
                series.len()
            );
        }
        let count = series.len().min(MAX_SERIES);

        let mut bytes = Panel {
            y_label: "bytes".to_string(),
            height_ratio: 3,
            lines: Vec::new(),
        };
        let mut rtt = Panel {
            y_label: "us".to_string(),
            height_ratio: 1,
            lines: Vec::new(),
        };

        for (i, s) in series.iter().take(count).enumerate() {
            let primary = PRIMARY_COLORS[i].to_string();
            let secondary = SECONDARY_COLORS[i].to_string();
            let style = LINE_STYLES[i];

            bytes.lines.push(PlotLine {
                label: format!("bytes in flight, {}", s.label),
                series: i,
                y: CcColumn::BytesInFlight,
                kind: PlotKind::Scatter,
                color: secondary.clone(),
                style: LineStyle::Solid,
                marker: Some(MARKERS[i]),
                width: 15.0,
                alpha: 0.5,
            });
            bytes.lines.push(PlotLine {
                label: format!("cwin, {}", s.label),
                series: i,
                y: CcColumn::Cwnd,
                kind: PlotKind::Line,
                color: primary.clone(),
                style,
                marker: None,
                width: 2.0,
                alpha: 0.75,
            });
            rtt.lines.push(PlotLine {
                label: format!("rtt, {}", s.label),
                series: i,
                y: CcColumn::LatestRtt,
                kind: PlotKind::Line,
                color: primary,
                style,
                marker: None,
                width: 2.0,
                alpha: 0.75,
            });
            rtt.lines.push(PlotLine {
                label: format!("min rtt, {}", s.label),
                series: i,
                y: CcColumn::MinRtt,
                kind: PlotKind::Line,
                color: secondary,
                style,
                marker: None,
                width: 1.0,
                alpha: 0.75,
            });
        }

        Self {
            x: CcColumn::EventTime,
            x_label: "time(us)".to_string(),
            panels: vec![bytes, rtt],
            series_count: count,
        }
    }

    /// Check if nothing would be drawn
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(|p| p.lines.is_empty())
    }
}

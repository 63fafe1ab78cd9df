//! ASCII bar chart rendering
//!
//! Turns a metric series into a fixed-height block of monospaced text. Values
//! are scaled linearly into `height` rows; series longer than the chart width
//! are stride-sampled (nearest index, no averaging, so high-frequency noise can
//! alias).

use crate::config::{ChartSpec, ValueFormat};
use crate::stats::MetricSummary;
use crate::types::{BenchError, Result};
use std::fmt::Write;

/// Character for a filled cell
pub const FILLED: char = '█';
/// Character for an empty cell
pub const EMPTY: char = ' ';

/// A rendered chart plus the intermediate values it was drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub label: String,
    /// Statistics of the source series (true min/max, before range padding)
    pub summary: MetricSummary,
    /// Number of values in the source series
    pub source_len: usize,
    /// Source index drawn in each column
    pub sample_indices: Vec<usize>,
    /// Scaled row index of each column, in `[0, height - 1]`
    pub columns: Vec<usize>,
    /// Rendered text, one `\n`-terminated line per row
    pub text: String,
}

impl Chart {
    /// Iterate over the rendered lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// Render a series as an ASCII chart
///
/// # Arguments
/// * `values` - Metric values in frame order
/// * `spec` - Label, value format and geometry
///
/// # Returns
/// * `Chart` whose text is exactly `spec.height + 3` lines: header, body rows
///   (top row first), axis line and frame-range caption
///
/// # Errors
/// * `BenchError::EmptyInput` if `values` is empty
/// * `BenchError::InvalidConfig` if the geometry is unusable
pub fn render_chart(values: &[f64], spec: &ChartSpec) -> Result<Chart> {
    spec.validate()?;
    let summary = MetricSummary::from_values(values).ok_or(BenchError::EmptyInput)?;

    let min_v = summary.min;
    let max_v = if summary.max == summary.min {
        // Constant series: pad the range so it lands on the bottom row
        min_v + 1.0
    } else {
        summary.max
    };
    let range = max_v - min_v;
    let top = spec.height - 1;

    let scaled: Vec<usize> = values
        .iter()
        .map(|&v| scale(v, min_v, range, top))
        .collect();

    let sample_indices = sample_indices(values.len(), spec.width);
    let columns: Vec<usize> = sample_indices.iter().map(|&i| scaled[i]).collect();

    let mut text = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        text,
        "{}: Min={:.1}, Max={:.1}, Avg={:.1}",
        spec.label, summary.min, summary.max, summary.avg
    );

    for row in (0..=top).rev() {
        let actual = min_v + (row as f64 / top as f64) * range;
        let cells: String = columns
            .iter()
            .map(|&c| if c >= row { FILLED } else { EMPTY })
            .collect();
        let _ = writeln!(text, "{}{}", axis_label(actual, spec.format), cells);
    }

    let _ = writeln!(text, "     +{}", "-".repeat(columns.len()));
    let _ = writeln!(text, "      Frame: 0 → {}", values.len());

    log::trace!(
        "Rendered chart '{}' ({} values, {} columns)",
        spec.label,
        values.len(),
        columns.len()
    );

    Ok(Chart {
        label: spec.label.clone(),
        summary,
        source_len: values.len(),
        sample_indices,
        columns,
        text,
    })
}

/// Map a value into a row index in `[0, top]`
fn scale(value: f64, min_v: f64, range: f64, top: usize) -> usize {
    let row = ((value - min_v) / range * top as f64).round();
    (row.max(0.0) as usize).min(top)
}

/// Source index for each output column
///
/// Short series keep every point. Longer ones take `floor(i * len / width)`.
pub fn sample_indices(len: usize, width: usize) -> Vec<usize> {
    if len <= width {
        (0..len).collect()
    } else {
        (0..width).map(|i| i * len / width).collect()
    }
}

/// Row prefix showing the value a row represents, always five characters
/// wide followed by the axis bar
fn axis_label(value: f64, format: ValueFormat) -> String {
    match format {
        ValueFormat::Integer => format!("{:4} |", value.trunc() as i64),
        ValueFormat::Decimal => format!("{:5.1}|", value),
    }
}

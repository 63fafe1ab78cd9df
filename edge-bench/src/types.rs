//! Core types for the benchmark library
//!
//! This module defines the per-frame metric record produced by the benchmark
//! loop and consumed by the report generator, plus the library error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for benchmark and report operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// One processed frame's performance and environment snapshot
///
/// Records are produced by the benchmark loop (one per frame) and persisted as
/// rows of the metric table. They are never mutated after being written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Frame index, starting at 1
    pub frame: u64,
    /// Inference throughput for this frame (1 / inference time)
    pub fps: f64,
    /// System-wide CPU usage in percent
    pub cpu: f64,
    /// System-wide RAM usage in percent
    pub ram: f64,
    /// SoC temperature in degrees Celsius
    pub temp: f64,
    /// Number of detected objects (absent for quantized-model tables)
    pub detections: Option<u32>,
}

impl MetricRecord {
    /// Get the value of a numeric metric as f64
    ///
    /// Returns `None` for `MetricKind::Detections` when the record carries no
    /// detection count.
    pub fn value(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::Fps => Some(self.fps),
            MetricKind::Cpu => Some(self.cpu),
            MetricKind::Ram => Some(self.ram),
            MetricKind::Temperature => Some(self.temp),
            MetricKind::Detections => self.detections.map(f64::from),
        }
    }

    /// Schema this record belongs to
    pub fn schema(&self) -> TableSchema {
        if self.detections.is_some() {
            TableSchema::Full
        } else {
            TableSchema::Quantized
        }
    }
}

/// Column layout of a metric table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSchema {
    /// `frame,fps,cpu,ram,temp,detections`
    Full,
    /// `frame,fps,cpu,ram,temp` (quantized-model runs record no detections)
    Quantized,
}

impl TableSchema {
    /// Header columns written for this schema
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TableSchema::Full => &["frame", "fps", "cpu", "ram", "temp", "detections"],
            TableSchema::Quantized => &["frame", "fps", "cpu", "ram", "temp"],
        }
    }

    /// Metrics that can be charted for this schema, in report order
    pub fn metrics(&self) -> &'static [MetricKind] {
        match self {
            TableSchema::Full => &MetricKind::ALL,
            TableSchema::Quantized => &MetricKind::ALL[..4],
        }
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.columns().join(","))
    }
}

/// The numeric metrics tracked per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Fps,
    Cpu,
    Ram,
    #[serde(alias = "temp")]
    Temperature,
    Detections,
}

impl MetricKind {
    /// All metrics in report order
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Fps,
        MetricKind::Cpu,
        MetricKind::Ram,
        MetricKind::Temperature,
        MetricKind::Detections,
    ];

    /// CSV column name of this metric
    pub fn column(&self) -> &'static str {
        match self {
            MetricKind::Fps => "fps",
            MetricKind::Cpu => "cpu",
            MetricKind::Ram => "ram",
            MetricKind::Temperature => "temp",
            MetricKind::Detections => "detections",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Errors that can occur while benchmarking or building reports
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("No metric records to report on")]
    EmptyInput,

    #[error("Records mix table schemas: expected {expected}, found {found} at frame {frame}")]
    SchemaMismatch {
        expected: TableSchema,
        found: TableSchema,
        frame: u64,
    },

    #[error("Metric table is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid value {value:?} for column '{column}' on line {line}")]
    Parse {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No capture backend could be opened: {}", .0.join("; "))]
    NoCaptureBackend(Vec<String>),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Detector failed: {0}")]
    Detector(String),

    #[error("Failed to write report {path:?}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(detections: Option<u32>) -> MetricRecord {
        MetricRecord {
            frame: 1,
            fps: 30.0,
            cpu: 10.0,
            ram: 40.0,
            temp: 50.0,
            detections,
        }
    }

    #[test]
    fn test_record_values() {
        let rec = record(Some(3));
        assert_eq!(rec.value(MetricKind::Fps), Some(30.0));
        assert_eq!(rec.value(MetricKind::Temperature), Some(50.0));
        assert_eq!(rec.value(MetricKind::Detections), Some(3.0));
        assert_eq!(rec.schema(), TableSchema::Full);

        let quantized = record(None);
        assert_eq!(quantized.value(MetricKind::Detections), None);
        assert_eq!(quantized.schema(), TableSchema::Quantized);
    }

    #[test]
    fn test_schema_columns() {
        assert_eq!(TableSchema::Full.to_string(), "frame,fps,cpu,ram,temp,detections");
        assert_eq!(TableSchema::Quantized.to_string(), "frame,fps,cpu,ram,temp");
        assert_eq!(TableSchema::Quantized.metrics().len(), 4);
        assert!(!TableSchema::Quantized.metrics().contains(&MetricKind::Detections));
    }

    #[test]
    fn test_error_display() {
        let err = BenchError::NoCaptureBackend(vec![
            "raw:/dev/video0: not found".to_string(),
            "synthetic: disabled".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "No capture backend could be opened: raw:/dev/video0: not found; synthetic: disabled"
        );
    }
}

//! Edge Benchmark Library
//!
//! Measures object-detection models on small boards and turns the per-frame
//! measurements into a markdown report with ASCII charts.
//!
//! # Architecture
//!
//! - [`table`] reads and writes the flat CSV metric tables
//! - [`stats`] and [`chart`] summarize and draw one metric series
//! - [`report`] assembles summary and charts into a [`ReportDocument`]
//! - [`bench`] runs the capture → inference → measurement loop, with camera
//!   access behind [`capture::CaptureStrategy`], inference behind
//!   [`detector::Detector`] and system load behind [`probe::SystemProbe`]
//! - [`observer`] carries progress events out of the loop
//!
//! The library never prints. Model loading and camera drivers live with the
//! caller.
//!
//! # Example Usage
//!
//! ```no_run
//! use edge_bench::{read_table, ReportConfig, ReportGenerator};
//! use std::path::Path;
//!
//! let table = read_table(Path::new("logs/yolo11n.csv")).unwrap();
//!
//! let config = ReportConfig::new()
//!     .with_model_name("yolo11n")
//!     .with_chart_height(10)
//!     .with_chart_width(60);
//!
//! let generator = ReportGenerator::new(config).unwrap();
//! let report = generator
//!     .generate(&table.records, Path::new("logs/yolo11n_report.md"))
//!     .unwrap();
//!
//! println!("Average FPS: {:.2}", report.summary.fps.avg);
//! ```

// Public modules
pub mod bench;
pub mod capture;
pub mod chart;
pub mod config;
pub mod detector;
pub mod observer;
pub mod probe;
pub mod report;
pub mod stats;
pub mod table;
pub mod types;

// Re-export main types for convenience
pub use bench::{BenchmarkConfig, BenchmarkOutcome, BenchmarkRunner, CancellationToken, StopReason};
pub use capture::{open_first, CaptureStrategy, Frame, FrameSource, RawStream, Synthetic};
pub use chart::{render_chart, Chart};
pub use config::{ChartSpec, ReportConfig, ValueFormat};
pub use detector::{Detection, Detector, NullDetector};
pub use observer::{BenchEvent, LogObserver, NoopObserver, Observer};
pub use probe::{ProcfsProbe, SystemProbe, SystemSample};
pub use report::{report_path, ReportDocument, ReportGenerator};
pub use stats::{MetricSummary, Summary};
pub use table::{read_table, table_path, MetricTable, MetricWriter};
pub use types::{BenchError, MetricKind, MetricRecord, Result, TableSchema};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: the default report layout validates
        let generator = ReportGenerator::new(ReportConfig::new()).unwrap();
        assert_eq!(generator.config().charts.len(), 5);
        assert!(!VERSION.is_empty());
    }
}

//! Benchmark loop
//!
//! Reads frames, times inference, samples system load and appends one
//! [`MetricRecord`] per frame to the run's metric table. The loop stops when
//! the time budget or frame limit is reached, the source runs dry, or the
//! [`CancellationToken`] fires; in every case the rows written so far are
//! flushed and returned so a report can still be produced.

use crate::capture::FrameSource;
use crate::detector::Detector;
use crate::observer::{BenchEvent, Observer};
use crate::probe::SystemProbe;
use crate::report::{report_path, ReportDocument, ReportGenerator};
use crate::table::{table_path, MetricWriter};
use crate::types::{MetricRecord, Result, TableSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag checked between frames
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop after the current frame
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Model name; also names the metric table and report files
    pub model_name: String,

    /// Time budget in seconds (0 = unlimited)
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Optional: stop after this many frames
    #[serde(default)]
    pub max_frames: Option<u64>,

    /// Directory receiving the metric table and report
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_duration_secs() -> u64 {
    30
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl BenchmarkConfig {
    /// Create a configuration with default settings
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            duration_secs: default_duration_secs(),
            max_frames: None,
            log_dir: default_log_dir(),
        }
    }

    /// Builder method: set the time budget (0 = unlimited)
    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Builder method: set the frame limit
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Builder method: set the output directory
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    fn duration(&self) -> Option<Duration> {
        (self.duration_secs > 0).then(|| Duration::from_secs(self.duration_secs))
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    DurationElapsed,
    FrameLimit,
    SourceExhausted,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::DurationElapsed => write!(f, "time budget elapsed"),
            StopReason::FrameLimit => write!(f, "frame limit reached"),
            StopReason::SourceExhausted => write!(f, "camera returned no frame"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of a benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkOutcome {
    pub records: Vec<MetricRecord>,
    pub schema: TableSchema,
    pub table: PathBuf,
    pub stop_reason: StopReason,
}

/// Drives one benchmark run
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the capture → inference → measurement loop
    ///
    /// # Arguments
    /// * `source` - Opened camera or replay source
    /// * `detector` - Inference backend; its `reports_detections` picks the
    ///   table schema
    /// * `probe` - System load sampler
    /// * `observer` - Receives progress events
    /// * `cancel` - Checked before every frame
    ///
    /// # Errors
    /// Capture, detector and table I/O errors end the run. Rows written
    /// before the error stay on disk.
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        detector: &mut dyn Detector,
        probe: &mut dyn SystemProbe,
        observer: &mut dyn Observer,
        cancel: &CancellationToken,
    ) -> Result<BenchmarkOutcome> {
        let schema = if detector.reports_detections() {
            TableSchema::Full
        } else {
            TableSchema::Quantized
        };
        let table = table_path(&self.config.log_dir, &self.config.model_name, schema);
        let mut writer = MetricWriter::create(&table, schema)?;

        observer.notify(&BenchEvent::RunStarted {
            model_name: self.config.model_name.clone(),
            detector: detector.name().to_string(),
        });

        let budget = self.config.duration();
        let start = Instant::now();
        let mut records = Vec::new();

        let stop_reason = loop {
            if cancel.is_cancelled() {
                observer.notify(&BenchEvent::Cancelled {
                    frames: records.len(),
                });
                break StopReason::Cancelled;
            }
            if budget.is_some_and(|b| start.elapsed() >= b) {
                break StopReason::DurationElapsed;
            }
            if self
                .config
                .max_frames
                .is_some_and(|max| records.len() as u64 >= max)
            {
                break StopReason::FrameLimit;
            }

            let Some(frame) = source.read_frame()? else {
                log::warn!("Failed to grab frame from camera");
                break StopReason::SourceExhausted;
            };

            let t0 = Instant::now();
            let detections = detector.detect(&frame)?;
            let inference = t0.elapsed().max(Duration::from_micros(1));

            let sample = probe.sample();
            let record = MetricRecord {
                frame: records.len() as u64 + 1,
                fps: 1.0 / inference.as_secs_f64(),
                cpu: sample.cpu,
                ram: sample.ram,
                temp: sample.temp,
                detections: match schema {
                    TableSchema::Full => Some(detections.len() as u32),
                    TableSchema::Quantized => None,
                },
            };
            writer.write(&record)?;

            observer.notify(&BenchEvent::Frame {
                record: record.clone(),
                objects: detections
                    .into_iter()
                    .map(|d| (d.class_name, d.confidence))
                    .collect(),
            });
            records.push(record);
        };

        observer.notify(&BenchEvent::RunFinished {
            frames: records.len(),
            reason: stop_reason,
            table: table.clone(),
        });

        Ok(BenchmarkOutcome {
            records,
            schema,
            table,
            stop_reason,
        })
    }

    /// Write the report for a finished (or interrupted) run
    ///
    /// Returns `Ok(None)` without writing anything when no frame was
    /// collected.
    pub fn write_report(
        &self,
        outcome: &BenchmarkOutcome,
        generator: &ReportGenerator,
        observer: &mut dyn Observer,
    ) -> Result<Option<(PathBuf, ReportDocument)>> {
        if outcome.records.is_empty() {
            log::warn!("No frames collected, skipping report generation");
            return Ok(None);
        }

        let path = report_path(&self.config.log_dir, &self.config.model_name);
        let document = generator.generate(&outcome.records, &path)?;
        observer.notify(&BenchEvent::ReportWritten { path: path.clone() });
        Ok(Some((path, document)))
    }
}

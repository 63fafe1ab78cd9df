//! Progress events emitted during a benchmark run
//!
//! The runner never prints. Callers pass an [`Observer`] that receives
//! [`BenchEvent`]s; closures work directly, [`LogObserver`] forwards events to
//! the `log` facade.

use crate::bench::StopReason;
use crate::types::MetricRecord;
use std::path::PathBuf;

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum BenchEvent {
    /// Benchmark loop is about to start
    RunStarted {
        model_name: String,
        detector: String,
    },
    /// A capture strategy could not be opened
    CaptureFailed { strategy: String, reason: String },
    /// A capture strategy was opened and will supply frames
    CaptureOpened { strategy: String },
    /// One frame was processed and recorded
    Frame {
        record: MetricRecord,
        /// Class names and confidences of detected objects
        objects: Vec<(String, f32)>,
    },
    /// The cancellation token was triggered
    Cancelled { frames: usize },
    /// The loop stopped
    RunFinished {
        frames: usize,
        reason: StopReason,
        table: PathBuf,
    },
    /// A report file was written
    ReportWritten { path: PathBuf },
}

/// Receives benchmark events
pub trait Observer {
    fn notify(&mut self, event: &BenchEvent);
}

impl<F> Observer for F
where
    F: FnMut(&BenchEvent),
{
    fn notify(&mut self, event: &BenchEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&mut self, _event: &BenchEvent) {}
}

/// Forwards events to the `log` facade
///
/// Per-frame lines go to `debug` unless `frame_level_info` is set, which
/// mirrors the live per-frame console output of an interactive run.
#[derive(Debug, Default, Clone)]
pub struct LogObserver {
    model_name: String,
    frame_level_info: bool,
}

impl LogObserver {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            frame_level_info: false,
        }
    }

    /// Builder method: log every frame at `info` level
    pub fn with_frame_logging(mut self, enabled: bool) -> Self {
        self.frame_level_info = enabled;
        self
    }
}

impl Observer for LogObserver {
    fn notify(&mut self, event: &BenchEvent) {
        match event {
            BenchEvent::RunStarted { model_name, detector } => {
                log::info!("Running test for {} (detector: {})", model_name, detector);
            }
            BenchEvent::CaptureFailed { strategy, reason } => {
                log::warn!("Capture strategy '{}' failed: {}", strategy, reason);
            }
            BenchEvent::CaptureOpened { strategy } => {
                log::info!("Camera initialized via '{}'", strategy);
            }
            BenchEvent::Frame { record, objects } => {
                let level = if self.frame_level_info {
                    log::Level::Info
                } else {
                    log::Level::Debug
                };
                let detections = record
                    .detections
                    .map(|d| format!(" | Detections: {}", d))
                    .unwrap_or_default();
                let names = if objects.is_empty() {
                    String::new()
                } else {
                    let list: Vec<String> = objects
                        .iter()
                        .map(|(name, conf)| format!("{}({:.2})", name, conf))
                        .collect();
                    format!(" | Objects: [{}]", list.join(", "))
                };
                log::log!(
                    level,
                    "{} | Frame: {} | FPS: {:.2} | CPU: {:.1}% | RAM: {:.1}% | Temp: {:.1}°C{}{}",
                    self.model_name,
                    record.frame,
                    record.fps,
                    record.cpu,
                    record.ram,
                    record.temp,
                    detections,
                    names
                );
            }
            BenchEvent::Cancelled { frames } => {
                log::warn!("Test interrupted after {} frames", frames);
            }
            BenchEvent::RunFinished { frames, reason, table } => {
                log::info!(
                    "Test complete for {}: {} frames ({}), results saved to {:?}",
                    self.model_name,
                    frames,
                    reason,
                    table
                );
            }
            BenchEvent::ReportWritten { path } => {
                log::debug!("Report event for {:?}", path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &BenchEvent| seen.push(event.clone());
            observer.notify(&BenchEvent::CaptureOpened {
                strategy: "synthetic".to_string(),
            });
            observer.notify(&BenchEvent::Cancelled { frames: 4 });
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], BenchEvent::Cancelled { frames: 4 });
    }

    #[test]
    fn test_log_observer_accepts_all_events() {
        let mut observer = LogObserver::new("yolo11n").with_frame_logging(true);
        observer.notify(&BenchEvent::Frame {
            record: MetricRecord {
                frame: 1,
                fps: 30.0,
                cpu: 10.0,
                ram: 40.0,
                temp: 50.0,
                detections: Some(1),
            },
            objects: vec![("person".to_string(), 0.91)],
        });
        observer.notify(&BenchEvent::ReportWritten {
            path: PathBuf::from("logs/yolo11n_report.md"),
        });
    }
}

//! Configuration loading and parsing
//!
//! Every section is optional; command-line flags override file values.

use anyhow::{Context, Result};
use edge_bench::{BenchmarkConfig, ChartSpec, MetricKind, ReportConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub benchmark: BenchmarkSection,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub report: ReportSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BenchmarkSection {
    pub model_name: Option<String>,
    pub duration_secs: Option<u64>,
    pub max_frames: Option<u64>,
    pub log_dir: Option<PathBuf>,
    /// Record runs without a detections column
    #[serde(default)]
    pub quantized: bool,
}

impl BenchmarkSection {
    /// Build the library config for `model_name`
    pub fn to_benchmark_config(&self, model_name: &str) -> BenchmarkConfig {
        let mut config = BenchmarkConfig::new(model_name);
        if let Some(secs) = self.duration_secs {
            config = config.with_duration_secs(secs);
        }
        if let Some(frames) = self.max_frames {
            config = config.with_max_frames(frames);
        }
        if let Some(dir) = &self.log_dir {
            config = config.with_log_dir(dir);
        }
        config
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Device nodes or raw stream files, tried in order
    #[serde(default = "default_devices")]
    pub devices: Vec<PathBuf>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Fall back to a generated test pattern when no device opens
    #[serde(default)]
    pub allow_synthetic: bool,
}

fn default_devices() -> Vec<PathBuf> {
    vec![PathBuf::from("/dev/video0")]
}

fn default_width() -> u32 {
    320
}

fn default_height() -> u32 {
    240
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            width: default_width(),
            height: default_height(),
            allow_synthetic: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportSection {
    pub chart_height: Option<usize>,
    pub chart_width: Option<usize>,
    pub output_dir: Option<PathBuf>,
    /// Per-metric chart overrides, keyed by column name
    #[serde(default)]
    pub charts: HashMap<MetricKind, ChartOverride>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChartOverride {
    pub label: Option<String>,
    pub title: Option<String>,
    pub height: Option<usize>,
    pub width: Option<usize>,
}

impl ReportSection {
    /// Build the library report config for `model_name`
    pub fn to_report_config(&self, model_name: &str) -> ReportConfig {
        let mut config = ReportConfig::new().with_model_name(model_name);
        if let Some(height) = self.chart_height {
            config = config.with_chart_height(height);
        }
        if let Some(width) = self.chart_width {
            config = config.with_chart_width(width);
        }

        for (kind, over) in &self.charts {
            let mut spec: ChartSpec = config
                .chart(*kind)
                .cloned()
                .unwrap_or_else(|| ChartSpec::for_metric(*kind));
            if let Some(label) = &over.label {
                spec.label = label.clone();
            }
            if let Some(title) = &over.title {
                spec.title = title.clone();
            }
            if let Some(height) = over.height {
                spec.height = height;
            }
            if let Some(width) = over.width {
                spec.width = width;
            }
            config = config.with_chart(*kind, spec);
        }

        config
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [benchmark]
            model_name = "yolo11n"
            duration_secs = 60
            log_dir = "runs"

            [capture]
            devices = ["/dev/video0", "/dev/video1"]
            allow_synthetic = true

            [report]
            chart_height = 8

            [report.charts.temp]
            label = "SoC °C"

            [report.charts.fps]
            width = 40
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.benchmark.model_name.as_deref(), Some("yolo11n"));
        assert_eq!(config.capture.devices.len(), 2);
        assert_eq!(config.capture.width, 320);
        assert!(config.capture.allow_synthetic);

        let bench = config.benchmark.to_benchmark_config("yolo11n");
        assert_eq!(bench.duration_secs, 60);
        assert_eq!(bench.log_dir, PathBuf::from("runs"));

        let report = config.report.to_report_config("yolo11n");
        assert_eq!(report.chart(MetricKind::Temperature).unwrap().label, "SoC °C");
        assert_eq!(report.chart(MetricKind::Temperature).unwrap().height, 8);
        assert_eq!(report.chart(MetricKind::Fps).unwrap().width, 40);
        assert_eq!(report.chart(MetricKind::Cpu).unwrap().width, 60);
    }

    #[test]
    fn test_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.capture.devices, vec![PathBuf::from("/dev/video0")]);
        assert!(!config.benchmark.quantized);
        assert_eq!(config.report.to_report_config("m").charts.len(), 5);
    }
}

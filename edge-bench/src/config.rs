//! Report configuration types
//!
//! Maps each metric to its display label, value format and chart geometry.
//! Defaults reproduce the stock report layout: ten rows by sixty columns per
//! chart, detections rendered as integers and everything else to one decimal.

use crate::types::{BenchError, MetricKind, Result};
use serde::{Deserialize, Serialize};

/// How a metric's values are printed on chart axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// Truncated to a whole number
    Integer,
    /// Rounded to one decimal place
    Decimal,
}

/// Rendering parameters for one metric chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Label printed in the chart header (e.g. "CPU %")
    pub label: String,
    /// Section title used in the markdown report
    pub title: String,
    #[serde(default = "default_format")]
    pub format: ValueFormat,
    /// Number of body rows
    #[serde(default = "default_height")]
    pub height: usize,
    /// Maximum number of sampled columns
    #[serde(default = "default_width")]
    pub width: usize,
}

fn default_format() -> ValueFormat {
    ValueFormat::Decimal
}

fn default_height() -> usize {
    10
}

fn default_width() -> usize {
    60
}

impl ChartSpec {
    /// Create a chart spec with default geometry
    pub fn new(label: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            title: title.into(),
            format: default_format(),
            height: default_height(),
            width: default_width(),
        }
    }

    /// Builder method: set the value format
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder method: set the number of body rows
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    /// Builder method: set the maximum number of columns
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Check that the geometry can be rendered
    pub fn validate(&self) -> Result<()> {
        if self.height < 2 {
            return Err(BenchError::InvalidConfig(format!(
                "chart '{}' needs at least 2 rows, got {}",
                self.label, self.height
            )));
        }
        if self.width == 0 {
            return Err(BenchError::InvalidConfig(format!(
                "chart '{}' needs at least 1 column",
                self.label
            )));
        }
        Ok(())
    }

    /// Default spec for a metric
    pub fn for_metric(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Fps => Self::new("FPS", "FPS Over Time"),
            MetricKind::Cpu => Self::new("CPU %", "CPU Usage Over Time"),
            MetricKind::Ram => Self::new("RAM %", "RAM Usage Over Time"),
            MetricKind::Temperature => Self::new("Temp °C", "Temperature Over Time"),
            MetricKind::Detections => {
                Self::new("Objects", "Detections Per Frame").with_format(ValueFormat::Integer)
            }
        }
    }
}

/// Configuration for the report generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Model name printed in the report title
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Charts in report order
    #[serde(default = "default_charts")]
    pub charts: Vec<(MetricKind, ChartSpec)>,
}

fn default_model_name() -> String {
    "model".to_string()
}

fn default_charts() -> Vec<(MetricKind, ChartSpec)> {
    MetricKind::ALL
        .iter()
        .map(|&kind| (kind, ChartSpec::for_metric(kind)))
        .collect()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            charts: default_charts(),
        }
    }
}

impl ReportConfig {
    /// Create a report configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the model name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Builder method: set the height of every chart
    pub fn with_chart_height(mut self, height: usize) -> Self {
        for (_, spec) in &mut self.charts {
            spec.height = height;
        }
        self
    }

    /// Builder method: set the width of every chart
    pub fn with_chart_width(mut self, width: usize) -> Self {
        for (_, spec) in &mut self.charts {
            spec.width = width;
        }
        self
    }

    /// Builder method: replace the spec for one metric (appended if absent)
    pub fn with_chart(mut self, kind: MetricKind, spec: ChartSpec) -> Self {
        match self.charts.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = spec,
            None => self.charts.push((kind, spec)),
        }
        self
    }

    /// Look up the chart spec for a metric
    pub fn chart(&self, kind: MetricKind) -> Option<&ChartSpec> {
        self.charts.iter().find(|(k, _)| *k == kind).map(|(_, spec)| spec)
    }

    /// Validate every chart spec
    pub fn validate(&self) -> Result<()> {
        self.charts.iter().try_for_each(|(_, spec)| spec.validate())
    }
}

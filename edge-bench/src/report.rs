//! Markdown report generation
//!
//! Builds a [`ReportDocument`] from a run's metric records and writes it as a
//! markdown file: title, test date, frame count, a summary table, one fenced
//! ASCII chart per metric and a footer.

use crate::chart::{render_chart, Chart};
use crate::config::ReportConfig;
use crate::stats::{check_schema, metric_values, Summary};
use crate::types::{BenchError, MetricKind, MetricRecord, Result};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Footer line closing every report
pub const FOOTER: &str = "*Generated automatically by YOLO Benchmark Tool*";

/// One chart section of a report
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSection {
    pub metric: MetricKind,
    pub title: String,
    pub chart: Chart,
}

/// Aggregated statistics and rendered charts for one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub model_name: String,
    pub generated_at: DateTime<Local>,
    pub summary: Summary,
    pub sections: Vec<ChartSection>,
}

impl ReportDocument {
    /// Chart section for a metric, if the report has one
    pub fn section(&self, metric: MetricKind) -> Option<&ChartSection> {
        self.sections.iter().find(|s| s.metric == metric)
    }

    /// Render the full markdown text
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out, "# YOLO Benchmark Report: {}\n", self.model_name.to_uppercase());
        let _ = writeln!(out, "**Test Date:** {}\n", self.generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "**Total Frames:** {}\n", s.record_count);
        let _ = writeln!(out, "---\n");

        let _ = writeln!(out, "## Summary Statistics\n");
        let _ = writeln!(out, "| Metric | Value |");
        let _ = writeln!(out, "|--------|-------|");
        let _ = writeln!(out, "| **Average FPS** | {:.2} |", s.fps.avg);
        let _ = writeln!(out, "| **Min FPS** | {:.2} |", s.fps.min);
        let _ = writeln!(out, "| **Max FPS** | {:.2} |", s.fps.max);
        let _ = writeln!(out, "| **Average CPU** | {:.1}% |", s.cpu.avg);
        let _ = writeln!(out, "| **Average RAM** | {:.1}% |", s.ram.avg);
        let _ = writeln!(out, "| **Average Temp** | {:.1}°C |", s.temp.avg);
        let _ = writeln!(out, "| **Max Temp** | {:.1}°C |", s.temp.max);
        if let Some(total) = s.total_detections {
            let _ = writeln!(out, "| **Total Detections** | {} |", total);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "---\n");

        for section in &self.sections {
            let _ = writeln!(out, "## {}\n", section.title);
            let _ = writeln!(out, "```");
            out.push_str(&section.chart.text);
            let _ = writeln!(out, "```\n");
        }

        let _ = writeln!(out, "---\n");
        let _ = writeln!(out, "{}", FOOTER);
        out
    }
}

/// Produces reports from metric records
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    /// Create a generator, validating the chart geometry up front
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Build the report document without touching the filesystem
    ///
    /// # Errors
    /// * `BenchError::EmptyInput` if `records` is empty
    /// * `BenchError::SchemaMismatch` if records mix table schemas
    pub fn build(&self, records: &[MetricRecord]) -> Result<ReportDocument> {
        let schema = check_schema(records)?;
        let summary = Summary::from_records(records)?;

        let mut sections = Vec::new();
        for (metric, spec) in &self.config.charts {
            if !schema.metrics().contains(metric) {
                log::debug!("Skipping {} chart for {} table", metric, schema);
                continue;
            }
            let values = metric_values(records, *metric);
            sections.push(ChartSection {
                metric: *metric,
                title: spec.title.clone(),
                chart: render_chart(&values, spec)?,
            });
        }

        Ok(ReportDocument {
            model_name: self.config.model_name.clone(),
            generated_at: Local::now(),
            summary,
            sections,
        })
    }

    /// Build the report and write it as markdown to `path`
    ///
    /// The parent directory is created if needed. Write failures are returned
    /// to the caller as `BenchError::ReportWrite`.
    pub fn generate(&self, records: &[MetricRecord], path: &Path) -> Result<ReportDocument> {
        let document = self.build(records)?;
        write_markdown(&document, path)?;
        log::info!("Report generated: {:?}", path);
        Ok(document)
    }
}

/// Write a document to `path`; the file handle is closed on every exit path
pub fn write_markdown(document: &ReportDocument, path: &Path) -> Result<()> {
    let wrap = |source: std::io::Error| BenchError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(wrap)?);
    writer
        .write_all(document.to_markdown().as_bytes())
        .map_err(wrap)?;
    writer.flush().map_err(wrap)?;
    Ok(())
}

/// Default report path for a model: `{dir}/{model}_report.md`
pub fn report_path(dir: &Path, model_name: &str) -> std::path::PathBuf {
    dir.join(format!("{}_report.md", model_name))
}

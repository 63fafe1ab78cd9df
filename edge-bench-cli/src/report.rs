//! `report` command: metric tables to markdown reports
//!
//! Several tables are rendered in parallel; each report is still a single
//! pass over its own records.

use crate::config::ReportSection;
use anyhow::{bail, Context, Result};
use edge_bench::{read_table, report_path, ReportGenerator, Summary};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Outcome of rendering one table
#[derive(Debug)]
pub struct RenderedReport {
    pub table: PathBuf,
    pub report: PathBuf,
    pub summary: Summary,
}

/// Model name implied by a table file name
///
/// `logs/yolo11n.csv` gives `yolo11n`; the `_tflite` suffix of quantized runs
/// is dropped so `yolo8n_tflite.csv` gives `yolo8n`.
pub fn model_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    stem.strip_suffix("_tflite").unwrap_or(stem).to_string()
}

fn model_name(table_path: &Path, model: Option<&str>) -> String {
    model
        .map(str::to_string)
        .unwrap_or_else(|| model_name_from_path(table_path))
}

/// Where the report for `table_path` is written
///
/// `--output-dir` wins over the config's `output_dir`; without either the
/// report lands next to the table.
pub fn resolve_report_path(
    table_path: &Path,
    model: Option<&str>,
    output_dir: Option<&Path>,
    section: &ReportSection,
) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| section.output_dir.clone())
        .or_else(|| table_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    report_path(&dir, &model_name(table_path, model))
}

/// Render one table
pub fn render_one(
    table_path: &Path,
    model: Option<&str>,
    output_dir: Option<&Path>,
    section: &ReportSection,
) -> Result<RenderedReport> {
    let model_name = model_name(table_path, model);

    let table = read_table(table_path)
        .with_context(|| format!("Failed to read metric table: {:?}", table_path))?;

    let report = resolve_report_path(table_path, model, output_dir, section);

    let generator = ReportGenerator::new(section.to_report_config(&model_name))
        .context("Invalid report configuration")?;
    let document = generator
        .generate(&table.records, &report)
        .with_context(|| format!("Failed to generate report for {:?}", table_path))?;

    Ok(RenderedReport {
        table: table_path.to_path_buf(),
        report,
        summary: document.summary,
    })
}

/// Render every table, in parallel
///
/// All tables are attempted; the command fails if any of them failed. Tables
/// that would write the same report file are refused before anything is
/// rendered.
pub fn render_all(
    tables: &[PathBuf],
    model: Option<&str>,
    output_dir: Option<&Path>,
    section: &ReportSection,
) -> Result<Vec<RenderedReport>> {
    if model.is_some() && tables.len() > 1 {
        bail!("--model can only be used with a single metric table");
    }

    let mut targets: HashMap<PathBuf, &PathBuf> = HashMap::new();
    for table in tables {
        let report = resolve_report_path(table, model, output_dir, section);
        if let Some(other) = targets.insert(report.clone(), table) {
            bail!(
                "{:?} and {:?} would both write {:?}; render them separately or use --output-dir",
                other,
                table,
                report
            );
        }
    }

    let results: Vec<Result<RenderedReport>> = tables
        .par_iter()
        .map(|table| render_one(table, model, output_dir, section))
        .collect();

    let mut rendered = Vec::new();
    let mut failures = 0;
    for result in results {
        match result {
            Ok(r) => rendered.push(r),
            Err(e) => {
                log::error!("{:#}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} reports failed", failures, tables.len());
    }
    Ok(rendered)
}

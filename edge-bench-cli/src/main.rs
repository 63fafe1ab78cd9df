//! Edge Benchmark CLI Application
//!
//! Command-line interface for the edge-bench library:
//! - `report`: render markdown reports from recorded metric tables
//! - `run`: capture frames, measure FPS/CPU/RAM/temperature per frame, write
//!   the metric table and the report

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod config;
mod report;
mod run;
mod shutdown;

/// Edge Bench - Benchmark object detection models and report the results
#[derive(Parser, Debug)]
#[command(name = "edge-bench-cli")]
#[command(about = "Benchmark detection models on edge boards and render markdown reports", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render markdown reports from metric tables (CSV)
    Report {
        /// Metric table(s) to render
        #[arg(required = true, value_name = "CSV")]
        tables: Vec<PathBuf>,

        /// Model name for the report title (default: derived from file name)
        #[arg(short, long)]
        model: Option<String>,

        /// Directory for the report files (default: next to each table)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Print the summary statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a benchmark and generate its report
    Run {
        /// Model name (names the metric table and report)
        #[arg(short, long)]
        model: Option<String>,

        /// Test duration in seconds (0 = until stopped)
        #[arg(short, long, value_name = "SECS")]
        duration: Option<u64>,

        /// Maximum number of frames to process
        #[arg(long, value_name = "COUNT")]
        max_frames: Option<u64>,

        /// Directory for the metric table and report
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,

        /// Capture device or raw stream (can be repeated, tried in order)
        #[arg(long, value_name = "PATH")]
        device: Vec<PathBuf>,

        /// Frame width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Frame height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Fall back to a generated test pattern if no device opens
        #[arg(long)]
        synthetic: bool,

        /// Record without a detections column (quantized model layout)
        #[arg(long)]
        quantized: bool,

        /// Log every frame at info level
        #[arg(long)]
        show_frames: bool,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("Edge Bench CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using edge-bench library v{}", edge_bench::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    match args.command {
        Command::Report {
            tables,
            model,
            output_dir,
            json,
        } => report_mode(&tables, model.as_deref(), output_dir.as_deref(), json, &app_config),
        Command::Run {
            model,
            duration,
            max_frames,
            log_dir,
            device,
            width,
            height,
            synthetic,
            quantized,
            show_frames,
        } => {
            let mut bench_section = app_config.benchmark.clone();
            bench_section.duration_secs = duration.or(bench_section.duration_secs);
            bench_section.max_frames = max_frames.or(bench_section.max_frames);
            bench_section.log_dir = log_dir.or(bench_section.log_dir);

            let model_name = model
                .or_else(|| bench_section.model_name.clone())
                .unwrap_or_else(|| "yolo11n".to_string());

            let mut capture = app_config.capture.clone();
            if !device.is_empty() {
                capture.devices = device;
            }
            capture.width = width.unwrap_or(capture.width);
            capture.height = height.unwrap_or(capture.height);
            capture.allow_synthetic |= synthetic;

            run::run_benchmark(
                bench_section.to_benchmark_config(&model_name),
                &capture,
                &app_config.report,
                quantized || bench_section.quantized,
                show_frames,
            )
        }
    }
}

/// Report mode - read metric tables, write one report per table
fn report_mode(
    tables: &[PathBuf],
    model: Option<&str>,
    output_dir: Option<&Path>,
    json: bool,
    app_config: &config::AppConfig,
) -> Result<()> {
    let rendered = report::render_all(tables, model, output_dir, &app_config.report)?;

    for r in &rendered {
        if json {
            println!("{}", serde_json::to_string_pretty(&r.summary)?);
        } else {
            println!("✓ {:?} → {:?}", r.table, r.report);
            println!(
                "  {} frames | FPS avg {:.2} (min {:.2}, max {:.2})",
                r.summary.record_count, r.summary.fps.avg, r.summary.fps.min, r.summary.fps.max
            );
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_run_args() {
        let args = Args::parse_from([
            "edge-bench-cli",
            "run",
            "--model",
            "yolo8n",
            "--device",
            "/dev/video0",
            "--device",
            "/dev/video1",
            "--synthetic",
            "-v",
        ]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::Run {
                model,
                device,
                synthetic,
                ..
            } => {
                assert_eq!(model.as_deref(), Some("yolo8n"));
                assert_eq!(device.len(), 2);
                assert!(synthetic);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}

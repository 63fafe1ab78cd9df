//! `run` command: benchmark loop followed by report generation

use crate::config::{CaptureConfig, ReportSection};
use crate::shutdown;
use anyhow::{Context, Result};
use edge_bench::{
    open_first, BenchmarkConfig, BenchmarkRunner, CancellationToken, CaptureStrategy, LogObserver,
    NullDetector, ProcfsProbe, RawStream, ReportGenerator, Synthetic,
};

/// Build the capture fallback chain: each device in order, then the test
/// pattern if allowed
pub fn capture_strategies(capture: &CaptureConfig) -> Vec<Box<dyn CaptureStrategy>> {
    let mut strategies: Vec<Box<dyn CaptureStrategy>> = capture
        .devices
        .iter()
        .map(|dev| {
            Box::new(RawStream::new(dev, capture.width, capture.height)) as Box<dyn CaptureStrategy>
        })
        .collect();

    if capture.allow_synthetic {
        strategies.push(Box::new(Synthetic::new(capture.width, capture.height)));
    }
    strategies
}

/// Run one benchmark and write its table and report
pub fn run_benchmark(
    bench: BenchmarkConfig,
    capture: &CaptureConfig,
    report: &ReportSection,
    quantized: bool,
    show_frames: bool,
) -> Result<()> {
    let model_name = bench.model_name.clone();
    let mut observer = LogObserver::new(&model_name).with_frame_logging(show_frames);

    let generator = ReportGenerator::new(report.to_report_config(&model_name))
        .context("Invalid report configuration")?;

    // Installed before the camera is opened so an early Ctrl+C is not fatal
    let cancel = CancellationToken::new();
    shutdown::cancel_on_ctrl_c(cancel.clone())?;

    let strategies = capture_strategies(capture);
    let (strategy, mut source) =
        open_first(&strategies, &mut observer).context("Could not open camera")?;
    log::debug!("Frames supplied by '{}'", strategy);

    // No inference backend is linked into this binary; the run measures the
    // capture and sampling pipeline on its own.
    log::warn!("No inference backend linked, measuring pipeline overhead only");
    let mut detector = if quantized {
        NullDetector::new(&model_name).quantized()
    } else {
        NullDetector::new(&model_name)
    };

    log::info!("Press Ctrl+C to stop and generate the report");
    let mut probe = ProcfsProbe::new();
    let runner = BenchmarkRunner::new(bench);
    let outcome = runner
        .run(
            source.as_mut(),
            &mut detector,
            &mut probe,
            &mut observer,
            &cancel,
        )
        .context("Benchmark run failed")?;

    // Partial runs still get a report
    match runner
        .write_report(&outcome, &generator, &mut observer)
        .context("Failed to generate report")?
    {
        Some((path, document)) => {
            let s = &document.summary;
            println!("\n✓ {} frames ({})", s.record_count, outcome.stop_reason);
            println!("  Table:  {:?}", outcome.table);
            println!("  Report: {:?}", path);
            println!(
                "  FPS avg/min/max: {:.2} / {:.2} / {:.2}",
                s.fps.avg, s.fps.min, s.fps.max
            );
        }
        None => println!("\n⚠️  No frames collected, skipping report generation"),
    }

    Ok(())
}

//! Ctrl+C handling
//!
//! The interrupt listener is registered before [`cancel_on_ctrl_c`] returns;
//! a helper thread then drives it on a single-threaded tokio runtime. The
//! first Ctrl+C cancels the benchmark token so the loop stops between frames
//! and still writes its partial results. A second Ctrl+C exits at once, for
//! a capture read that never returns.

use anyhow::{Context, Result};
use edge_bench::CancellationToken;
use std::thread;

/// Exit status after a second Ctrl+C (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// What to do about the `count`-th interrupt (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Stop after the current frame
    Cancel,
    /// Leave immediately with the given status
    Exit(i32),
}

/// Decide and apply the reaction to an interrupt
pub fn on_interrupt(count: u32, token: &CancellationToken) -> InterruptAction {
    if count <= 1 {
        log::warn!("Test interrupted by user (Ctrl+C), finishing current frame");
        token.cancel();
        InterruptAction::Cancel
    } else {
        log::error!("Interrupted again, exiting without a report");
        InterruptAction::Exit(INTERRUPTED_EXIT_CODE)
    }
}

#[cfg(unix)]
fn listen() -> std::io::Result<tokio::signal::unix::Signal> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn listen() -> std::io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}

/// Cancel `token` when the process receives Ctrl+C
pub fn cancel_on_ctrl_c(token: CancellationToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    let mut interrupts = {
        let _guard = runtime.enter();
        listen().context("Unable to listen for Ctrl+C")?
    };

    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let mut count = 0;
                while interrupts.recv().await.is_some() {
                    count += 1;
                    if let InterruptAction::Exit(code) = on_interrupt(count, &token) {
                        std::process::exit(code);
                    }
                }
            });
        })
        .context("Failed to spawn signal thread")?;

    Ok(())
}

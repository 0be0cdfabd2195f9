// src/progress.rs

//! Progress reporting for batch checks
//!
//! The batch runner only knows a callback. Front ends wrap one of the
//! trackers below in that callback:
//!
//! - `CliProgress`: indicatif bar on stderr
//! - `LogProgress`: periodic info-level log lines for non-interactive runs
//! - `SilentProgress`: nothing at all

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Receives one tick per checked installer
///
/// Implementations must be thread-safe; updates arrive from pool workers.
pub trait ProgressTracker: Send + Sync {
    /// Show what was processed last
    fn set_message(&self, message: &str);

    fn increment(&self, amount: u64);

    fn finish_with_message(&self, message: &str);
}

/// Pick the tracker suited to the current stderr
pub fn for_terminal(name: &str, length: u64) -> Box<dyn ProgressTracker> {
    if std::io::stderr().is_terminal() {
        Box::new(CliProgress::new(name, length))
    } else {
        Box::new(LogProgress::new(name, length))
    }
}

/// Installer count bar on stderr
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(name: &str, length: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(length), ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} ({pos}/{len}) [{bar:40.green/dim}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_prefix(name.to_string());
        Self { bar }
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Used with `--quiet`
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, _amount: u64) {}

    fn finish_with_message(&self, _message: &str) {}
}

/// Info-level log line about every tenth of the batch
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    checked: AtomicU64,
    total: u64,
    step: u64,
}

impl LogProgress {
    pub fn new(name: impl Into<String>, total: u64) -> Self {
        Self {
            name: name.into(),
            checked: AtomicU64::new(0),
            total,
            step: (total / 10).max(1),
        }
    }

    /// Whether moving from `before` to `after` crosses a reporting step
    fn crosses_step(&self, before: u64, after: u64) -> bool {
        self.total > 0 && after / self.step > before / self.step
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, amount: u64) {
        let before = self.checked.fetch_add(amount, Ordering::Relaxed);
        let after = before + amount;
        if self.crosses_step(before, after) {
            info!("{}: {}/{} installers", self.name, after, self.total);
        }
    }

    fn finish_with_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }
}

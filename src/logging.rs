// src/logging.rs

//! Logging setup
//!
//! Two outputs share one subscriber: the console, at the level the user asked
//! for (or `RUST_LOG`), and a dated log file that always records at least
//! warnings. A third layer counts ERROR events so the process can report
//! failure through its exit status even when every installer was processed.

use crate::error::Result;
use crate::report::dated_path;
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Console verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    /// Directive understood by [`EnvFilter`]
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Level used for the log file: never quieter than warnings
    pub fn for_file(self) -> Self {
        self.max(LogLevel::Warning)
    }

    /// Filter applying this level to our own events and warnings to dependencies
    fn filter(self) -> EnvFilter {
        EnvFilter::new(format!("warn,gogcheck={}", self.directive()))
    }
}

/// Counts ERROR events seen by the subscriber
#[derive(Debug, Clone, Default)]
pub struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    pub fn has_errors(&self) -> bool {
        self.count() > 0
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Handle returned by [`init`]
#[derive(Debug)]
pub struct LogHandle {
    pub errors: ErrorCounter,
    pub log_file: PathBuf,
}

/// Install the global subscriber
///
/// `log_file` gets the run's timestamp appended to its stem.
pub fn init(level: LogLevel, log_file: &Path, now: &DateTime<Local>) -> Result<LogHandle> {
    let log_file = dated_path(log_file, now);
    let file = File::create(&log_file)?;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.filter());
    let errors = ErrorCounter::default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true)
                .with_filter(level.for_file().filter()),
        )
        .with(errors.clone())
        .init();

    Ok(LogHandle { errors, log_file })
}

/// Console-only logging for the auxiliary commands
pub fn init_console(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.filter());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, warn};

    #[test]
    fn test_file_level_is_at_least_warning() {
        assert_eq!(LogLevel::Error.for_file(), LogLevel::Warning);
        assert_eq!(LogLevel::Warning.for_file(), LogLevel::Warning);
        assert_eq!(LogLevel::Debug.for_file(), LogLevel::Debug);
    }

    #[test]
    fn test_error_counter_counts_only_errors() {
        let counter = ErrorCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            warn!("not counted");
            error!("counted");
            error!("counted again");
        });

        assert_eq!(counter.count(), 2);
        assert!(counter.has_errors());
    }
}

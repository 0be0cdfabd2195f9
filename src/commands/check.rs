// src/commands/check.rs
//! Batch update check

use super::{default_data_file, default_log_file};
use crate::cli::CheckArgs;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use gogcheck::batch::{BatchRunner, ReportEntry};
use gogcheck::catalog::GogCatalog;
use gogcheck::discovery::find_installers;
use gogcheck::extract::{InnoExtractor, ToolPaths};
use gogcheck::logging;
use gogcheck::overrides::OverrideConfig;
use gogcheck::progress::{self, ProgressTracker};
use gogcheck::report::{self, Summary};
use std::process::ExitCode;
use tracing::{error, info};

/// Run the check and print the report
///
/// The exit code is 1 whenever anything was logged at ERROR level, even if
/// the run itself completed.
pub fn cmd_check(args: CheckArgs) -> Result<ExitCode> {
    let now = Local::now();
    let log_file = args.log_file.clone().unwrap_or_else(default_log_file);
    let log = logging::init(args.log_level, &log_file, &now)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
    info!("Logging to {}", log.log_file.display());

    if let Err(e) = run(&args, &now) {
        error!("{:#}", e);
        return Err(e);
    }

    if log.errors.has_errors() {
        eprintln!(
            "{} error(s) were logged, see {}",
            log.errors.count(),
            log.log_file.display()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run(args: &CheckArgs, now: &DateTime<Local>) -> Result<()> {
    let tools = ToolPaths::discover(args.innoextract_path.clone(), args.seven_zip_path.clone())?;

    let data_file = args.data_file.clone().unwrap_or_else(default_data_file);
    let config = OverrideConfig::load(Some(&data_file))
        .with_context(|| format!("Failed to load data file {}", data_file.display()))?;

    let installers = find_installers(&args.paths)?;
    println!("Found {} installers", installers.len());

    let catalog = GogCatalog::new()?;
    let extractor = InnoExtractor::new(tools);

    let tracker: Box<dyn ProgressTracker> = if args.quiet {
        Box::new(progress::SilentProgress)
    } else {
        progress::for_terminal("Checking", installers.len() as u64)
    };

    let runner = BatchRunner::new(extractor, catalog, &config)
        .with_jobs(args.jobs)
        .with_progress(|entry: &ReportEntry| {
            tracker.set_message(&entry.label);
            tracker.increment(1);
        });
    let entries = runner.run(&installers)?;
    tracker.finish_with_message("done");

    for entry in &entries {
        println!("{}", report::console_line(entry));
    }
    println!();
    println!("{}", Summary::from_entries(&entries));

    if let Some(output_file) = &args.output_file {
        let written = report::write_report(output_file, args.format, &entries, now)
            .with_context(|| format!("Failed to write report {}", output_file.display()))?;
        println!("Report written to {}", written.display());
    }

    Ok(())
}

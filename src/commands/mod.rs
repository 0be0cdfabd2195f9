// src/commands/mod.rs
//! Command handlers for the gogcheck CLI

mod check;
mod inspect;
mod normalize;

pub use check::cmd_check;
pub use inspect::cmd_inspect;
pub use normalize::cmd_normalize;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use std::path::PathBuf;

/// Default name of the override data file
const DATA_FILE_NAME: &str = "data.json";

/// Default name of the log file, before the date is appended
const LOG_FILE_NAME: &str = "gogcheck.log";

/// Directory holding the running executable
///
/// Default home of the data and log files. Falls back to the working
/// directory when the executable path cannot be determined.
pub fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_file() -> PathBuf {
    program_dir().join(DATA_FILE_NAME)
}

fn default_log_file() -> PathBuf {
    program_dir().join(LOG_FILE_NAME)
}

/// Print shell completions to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = crate::cli::Cli::command();
    clap_complete::generate(shell, &mut cmd, "gogcheck", &mut std::io::stdout());
    Ok(())
}

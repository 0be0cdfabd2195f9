// src/cli.rs
//! CLI definitions for gogcheck
//!
//! Command implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use gogcheck::logging::LogLevel;
use gogcheck::report::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gogcheck")]
#[command(author = "gogcheck contributors")]
#[command(version)]
#[command(about = "Find GOG offline installers that have newer versions available", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check every installer under the given directories
    Check(CheckArgs),

    /// Print the catalog search title derived from a product name
    Normalize {
        /// Product name as stored in the installer
        title: String,

        /// Override data file (default: data.json next to the executable)
        #[arg(short, long)]
        data_file: Option<PathBuf>,

        /// Console log level
        #[arg(short, long, value_enum, default_value_t = LogLevel::Warning)]
        log_level: LogLevel,
    },

    /// Print the metadata extracted from one installer
    Inspect {
        /// Path to the installer executable
        installer: PathBuf,

        /// innoextract executable (default: looked up in PATH)
        #[arg(short, long)]
        innoextract_path: Option<PathBuf>,

        /// 7-zip executable, needed for split legacy installers (default: looked up in PATH)
        #[arg(short, long)]
        seven_zip_path: Option<PathBuf>,

        /// Console log level
        #[arg(short, long, value_enum, default_value_t = LogLevel::Warning)]
        log_level: LogLevel,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct CheckArgs {
    /// Directories to search for installers (repeatable)
    #[arg(short, long = "path", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// innoextract executable (default: looked up in PATH)
    #[arg(short, long)]
    pub innoextract_path: Option<PathBuf>,

    /// 7-zip executable, needed for split legacy installers (default: looked up in PATH)
    #[arg(short, long)]
    pub seven_zip_path: Option<PathBuf>,

    /// Report file; the run's date and time are appended to its name
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Report file format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Override data file (default: data.json next to the executable)
    #[arg(short, long)]
    pub data_file: Option<PathBuf>,

    /// Console log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Warning)]
    pub log_level: LogLevel,

    /// Log file; the run's date and time are appended to its name
    /// (default: gogcheck.log next to the executable)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Number of installers checked in parallel (default: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Do not show a progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

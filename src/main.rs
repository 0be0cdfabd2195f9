// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use gogcheck::logging;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => commands::cmd_check(args),
        Commands::Normalize {
            title,
            data_file,
            log_level,
        } => {
            logging::init_console(log_level);
            commands::cmd_normalize(&title, data_file)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect {
            installer,
            innoextract_path,
            seven_zip_path,
            log_level,
        } => {
            logging::init_console(log_level);
            commands::cmd_inspect(&installer, innoextract_path, seven_zip_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            commands::cmd_completions(shell)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

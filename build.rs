// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: override data file
fn data_file_arg() -> Arg {
    Arg::new("data_file")
        .short('d')
        .long("data-file")
        .value_name("FILE")
        .help("Override data file (default: data.json next to the executable)")
}

/// Common argument: console log level
fn log_level_arg() -> Arg {
    Arg::new("log_level")
        .short('l')
        .long("log-level")
        .value_parser(["error", "warning", "info", "debug"])
        .default_value("warning")
        .help("Console log level")
}

fn innoextract_arg() -> Arg {
    Arg::new("innoextract_path")
        .short('i')
        .long("innoextract-path")
        .value_name("FILE")
        .help("innoextract executable (default: looked up in PATH)")
}

fn seven_zip_arg() -> Arg {
    Arg::new("seven_zip_path")
        .short('s')
        .long("seven-zip-path")
        .value_name("FILE")
        .help("7-zip executable, needed for split legacy installers (default: looked up in PATH)")
}

fn build_cli() -> Command {
    Command::new("gogcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .author("gogcheck contributors")
        .about("Find GOG offline installers that have newer versions available")
        .subcommand_required(true)
        .subcommand(
            Command::new("check")
                .about("Check every installer under the given directories")
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .required(true)
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .help("Directories to search for installers (repeatable)"),
                )
                .arg(innoextract_arg())
                .arg(seven_zip_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output-file")
                        .value_name("FILE")
                        .help("Report file; the run's date and time are appended to its name"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["text", "json"])
                        .default_value("text")
                        .help("Report file format"),
                )
                .arg(data_file_arg())
                .arg(log_level_arg())
                .arg(
                    Arg::new("log_file")
                        .long("log-file")
                        .value_name("FILE")
                        .help("Log file; the run's date and time are appended to its name"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of installers checked in parallel (default: one per CPU)"),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .action(ArgAction::SetTrue)
                        .help("Do not show a progress bar"),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print the catalog search title derived from a product name")
                .arg(Arg::new("title").required(true).help("Product name as stored in the installer"))
                .arg(data_file_arg())
                .arg(log_level_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the metadata extracted from one installer")
                .arg(Arg::new("installer").required(true).help("Path to the installer executable"))
                .arg(innoextract_arg())
                .arg(seven_zip_arg())
                .arg(log_level_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("gogcheck.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

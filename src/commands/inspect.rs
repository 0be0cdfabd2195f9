// src/commands/inspect.rs
//! Single-installer metadata dump

use anyhow::{Context, Result};
use gogcheck::extract::{InnoExtractor, MetadataExtractor, ToolPaths};
use gogcheck::metadata::RawInstallerMetadata;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct Inspection<'a> {
    #[serde(flatten)]
    metadata: &'a RawInstallerMetadata,
    display_name: Option<&'a str>,
    local_version: Option<String>,
    local_build: Option<String>,
}

/// Extract and print everything known about one installer
pub fn cmd_inspect(
    installer: &Path,
    innoextract_path: Option<PathBuf>,
    seven_zip_path: Option<PathBuf>,
) -> Result<()> {
    if !installer.is_file() {
        anyhow::bail!("'{}' is not a file", installer.display());
    }

    let tools = ToolPaths::discover(innoextract_path, seven_zip_path)?;
    let extractor = InnoExtractor::new(tools);

    info!("Inspecting {}", installer.display());
    let metadata = extractor
        .extract(installer)
        .with_context(|| format!("Failed to read metadata from {}", installer.display()))?;

    let inspection = Inspection {
        metadata: &metadata,
        display_name: metadata.display_name(),
        local_version: metadata.local_version(),
        local_build: metadata.local_build(),
    };
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}

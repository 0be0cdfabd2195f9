// src/commands/normalize.rs
//! Title normalization preview

use super::default_data_file;
use anyhow::{Context, Result};
use gogcheck::overrides::OverrideConfig;
use gogcheck::title::normalize;
use std::path::PathBuf;

/// Print the canonical search title for `title`
///
/// Handy for checking new data file rules without running a full batch.
pub fn cmd_normalize(title: &str, data_file: Option<PathBuf>) -> Result<()> {
    let data_file = data_file.unwrap_or_else(default_data_file);
    let config = OverrideConfig::load(Some(&data_file))
        .with_context(|| format!("Failed to load data file {}", data_file.display()))?;

    let canonical = normalize(title, &config);
    println!("{}", canonical);

    if let Some(replacement) = config.replacement_for(title) {
        eprintln!("  (name replaced with \"{}\" before cleanup)", replacement);
    }
    if config.is_delisted(title) {
        eprintln!("  (listed as delisted; installers with this name are skipped)");
    }
    Ok(())
}

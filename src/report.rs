// src/report.rs

//! Report rendering
//!
//! Console lines, the end-of-run summary and the output file. The output
//! file gets the run's timestamp appended to its stem so successive runs
//! never overwrite each other.

use crate::batch::ReportEntry;
use crate::error::Result;
use crate::resolver::ResolutionOutcome;
use crate::version::VersionVerdict;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Placeholder for versions and builds nobody reported
pub const UNKNOWN: &str = "Unknown";

/// Timestamp format used in output and log file names
pub const FILE_DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Installers with updates, in the classic plain-text layout
    #[default]
    Text,
    /// Every report entry as JSON
    Json,
}

/// One-word classification of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusTag {
    UpToDate,
    Update,
    Unknown,
    Skipped,
    Unresolved,
}

impl StatusTag {
    pub const ALL: [StatusTag; 5] = [
        StatusTag::UpToDate,
        StatusTag::Update,
        StatusTag::Unknown,
        StatusTag::Skipped,
        StatusTag::Unresolved,
    ];

    pub fn of(entry: &ReportEntry) -> Self {
        match (&entry.outcome, &entry.verdict) {
            (ResolutionOutcome::Skipped { .. }, _) => StatusTag::Skipped,
            (ResolutionOutcome::Unresolved { .. }, _) => StatusTag::Unresolved,
            (ResolutionOutcome::Resolved { .. }, Some(VersionVerdict::UpToDate)) => {
                StatusTag::UpToDate
            }
            (ResolutionOutcome::Resolved { .. }, Some(VersionVerdict::UpdateAvailable { .. })) => {
                StatusTag::Update
            }
            (ResolutionOutcome::Resolved { .. }, Some(VersionVerdict::Indeterminate { .. }) | None) => {
                StatusTag::Unknown
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::UpToDate => "UP-TO-DATE",
            StatusTag::Update => "UPDATE",
            StatusTag::Unknown => "UNKNOWN",
            StatusTag::Skipped => "SKIPPED",
            StatusTag::Unresolved => "UNRESOLVED",
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Console line for one entry
pub fn console_line(entry: &ReportEntry) -> String {
    let tag = StatusTag::of(entry);
    let head = format!("[{:<10}] {}", tag.as_str(), entry.label);

    match (&entry.outcome, &entry.verdict) {
        (ResolutionOutcome::Skipped { reason }, _) => format!("{} ({})", head, reason),
        (ResolutionOutcome::Unresolved { reason }, _) => {
            format!("{}: {} [{}]", head, reason, entry.source_path.display())
        }
        (ResolutionOutcome::Resolved { entry: catalog }, verdict) => {
            let id = &catalog.catalog_id;
            match verdict {
                Some(VersionVerdict::UpToDate) => format!(
                    "{} ({}) {}",
                    head,
                    id,
                    entry.local_version.as_deref().unwrap_or(UNKNOWN)
                ),
                Some(VersionVerdict::UpdateAvailable {
                    local_version,
                    remote_version,
                }) => {
                    let old_gen = if entry.is_generation_upgrade() {
                        " {OLD GEN INSTALLER}"
                    } else {
                        ""
                    };
                    format!(
                        "{} ({}) {}{} -> {}",
                        head, id, local_version, old_gen, remote_version
                    )
                }
                Some(VersionVerdict::Indeterminate { reason }) => {
                    format!("{} ({}) {}", head, id, reason)
                }
                None => format!("{} ({})", head, id),
            }
        }
    }
}

/// Count of entries per status tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub up_to_date: usize,
    pub updates: usize,
    pub unknown: usize,
    pub skipped: usize,
    pub unresolved: usize,
}

impl Summary {
    pub fn from_entries(entries: &[ReportEntry]) -> Self {
        let mut summary = Summary {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match StatusTag::of(entry) {
                StatusTag::UpToDate => summary.up_to_date += 1,
                StatusTag::Update => summary.updates += 1,
                StatusTag::Unknown => summary.unknown += 1,
                StatusTag::Skipped => summary.skipped += 1,
                StatusTag::Unresolved => summary.unresolved += 1,
            }
        }
        summary
    }

    pub fn count(&self, tag: StatusTag) -> usize {
        match tag {
            StatusTag::UpToDate => self.up_to_date,
            StatusTag::Update => self.updates,
            StatusTag::Unknown => self.unknown,
            StatusTag::Skipped => self.skipped,
            StatusTag::Unresolved => self.unresolved,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} installers:", self.total)?;
        for tag in StatusTag::ALL {
            write!(f, " {} {}", self.count(tag), tag)?;
        }
        Ok(())
    }
}

/// `<dir>/<stem>_<timestamp><ext>` for a requested `<dir>/<stem><ext>`
pub fn dated_path(path: &Path, now: &DateTime<Local>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, now.format(FILE_DATE_FORMAT));
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

/// Plain-text list of installers with updates
pub fn write_text<W: Write>(writer: &mut W, entries: &[ReportEntry]) -> Result<()> {
    for entry in entries.iter().filter(|e| e.is_update()) {
        let Some(VersionVerdict::UpdateAvailable {
            local_version,
            remote_version,
        }) = &entry.verdict
        else {
            continue;
        };

        writeln!(
            writer,
            "{} ({})",
            entry.label,
            entry.catalog_id().unwrap_or(UNKNOWN)
        )?;
        if entry.is_generation_upgrade() {
            writeln!(writer, "{} {{OLD GEN INSTALLER}} -> {}", local_version, remote_version)?;
        } else {
            writeln!(writer, "{} -> {}", local_version, remote_version)?;
        }
        writeln!(
            writer,
            "{} -> {}",
            entry.local_build.as_deref().unwrap_or(UNKNOWN),
            entry.remote_build().unwrap_or(UNKNOWN)
        )?;
        writeln!(writer, "\n")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    summary: Summary,
    entries: &'a [ReportEntry],
}

/// Every entry plus the summary, as pretty-printed JSON
pub fn write_json<W: Write>(writer: &mut W, entries: &[ReportEntry], now: &DateTime<Local>) -> Result<()> {
    let report = JsonReport {
        generated_at: now.to_rfc3339(),
        summary: Summary::from_entries(entries),
        entries,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the report next to `requested`, with the timestamp in its name
///
/// Returns the path actually written.
pub fn write_report(
    requested: &Path,
    format: ReportFormat,
    entries: &[ReportEntry],
    now: &DateTime<Local>,
) -> Result<PathBuf> {
    let path = dated_path(requested, now);
    let mut writer = BufWriter::new(File::create(&path)?);

    match format {
        ReportFormat::Text => write_text(&mut writer, entries)?,
        ReportFormat::Json => write_json(&mut writer, entries, now)?,
    }
    writer.flush()?;

    info!("Report written to {}", path.display());
    Ok(path)
}

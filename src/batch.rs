// src/batch.rs

//! Batch orchestration
//!
//! Runs extract → resolve → compare for every installer on a bounded rayon
//! pool and collects one [`ReportEntry`] per installer, in input order.
//! Per-installer failures become outcomes; only an extraction tool that
//! cannot be started at all stops the run.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::extract::{ExtractionError, MetadataExtractor};
use crate::metadata::{InstallerGeneration, RawInstallerMetadata};
use crate::overrides::OverrideConfig;
use crate::resolver::{ResolutionOutcome, UnresolvedReason, resolve};
use crate::title::normalize;
use crate::version::{VersionVerdict, compare};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Called once per finished installer, from worker threads
pub type ProgressCallback<'a> = Box<dyn Fn(&ReportEntry) + Send + Sync + 'a>;

/// Final record for one installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub source_path: PathBuf,
    /// Best human-readable name for the installer
    pub label: String,
    pub outcome: ResolutionOutcome,
    /// Present only when the installer was resolved
    pub verdict: Option<VersionVerdict>,
    pub local_version: Option<String>,
    pub local_build: Option<String>,
    pub generation: InstallerGeneration,
}

impl ReportEntry {
    pub fn catalog_id(&self) -> Option<&str> {
        self.outcome.entry().map(|e| e.catalog_id.as_str())
    }

    pub fn remote_version(&self) -> Option<&str> {
        self.outcome.entry().and_then(|e| e.remote_version.as_deref())
    }

    pub fn remote_build(&self) -> Option<&str> {
        self.outcome.entry().and_then(|e| e.build_id.as_deref())
    }

    pub fn is_update(&self) -> bool {
        self.verdict.as_ref().is_some_and(VersionVerdict::is_update)
    }

    /// Local installer is old-gen while the catalog publishes a current one
    pub fn is_generation_upgrade(&self) -> bool {
        self.generation == InstallerGeneration::Old
            && self.outcome.entry().is_some_and(|e| !e.legacy)
    }
}

/// Drives a batch of installers through the pipeline
pub struct BatchRunner<'a, E, C> {
    extractor: E,
    catalog: C,
    config: &'a OverrideConfig,
    jobs: Option<usize>,
    on_progress: Option<ProgressCallback<'a>>,
}

impl<'a, E, C> BatchRunner<'a, E, C>
where
    E: MetadataExtractor,
    C: Catalog,
{
    pub fn new(extractor: E, catalog: C, config: &'a OverrideConfig) -> Self {
        Self {
            extractor,
            catalog,
            config,
            jobs: None,
            on_progress: None,
        }
    }

    /// Worker count; `None` or 0 uses the available parallelism
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_progress(mut self, callback: impl Fn(&ReportEntry) + Send + Sync + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Process every installer; the result has one entry per path, in order
    pub fn run(&self, paths: &[PathBuf]) -> Result<Vec<ReportEntry>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .thread_name(|idx| format!("gogcheck-worker-{idx}"))
            .build()?;

        info!(
            "Checking {} installers on {} workers",
            paths.len(),
            pool.current_num_threads()
        );

        let entries = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let entry = self.process(path)?;
                    if let Some(callback) = &self.on_progress {
                        callback(&entry);
                    }
                    Ok(entry)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        debug!("Batch finished with {} entries", entries.len());
        Ok(entries)
    }

    /// Run the pipeline for one installer
    pub fn process(&self, path: &Path) -> Result<ReportEntry> {
        info!("Checking {}", path.display());

        let meta = match self.extractor.extract(path) {
            Ok(meta) => meta,
            Err(e) if e.is_fatal() => return Err(fatal(e)),
            Err(e) => {
                error!("Could not read metadata of {}: {}", path.display(), e);
                return Ok(extraction_failed(path, e));
            }
        };

        let outcome = resolve(&meta, self.config, &self.catalog);
        let local_build = meta.local_build();
        let local_version = match (meta.local_version(), outcome.entry(), &local_build) {
            (None, Some(entry), Some(build)) => self.version_of_local_build(&entry.catalog_id, build),
            (version, _, _) => version,
        };

        let verdict = outcome.entry().map(|entry| {
            compare(
                &entry.catalog_id,
                local_version.as_deref(),
                entry.remote_version.as_deref(),
                self.config,
            )
        });

        Ok(ReportEntry {
            source_path: path.to_path_buf(),
            label: label_for(&meta, self.config),
            outcome,
            verdict,
            local_version,
            local_build,
            generation: meta.generation,
        })
    }

    /// Ask the catalog which version name it published for the local build
    fn version_of_local_build(&self, catalog_id: &str, build_id: &str) -> Option<String> {
        debug!("Looking up the version of build {} of {}", build_id, catalog_id);
        match self.catalog.version_for_build(catalog_id, build_id) {
            Ok(Some(version)) => Some(version),
            Ok(None) => {
                warn!("Build {} of {} is not in the catalog", build_id, catalog_id);
                None
            }
            Err(e) => {
                error!("Version lookup for build {} of {} failed: {}", build_id, catalog_id, e);
                None
            }
        }
    }
}

fn fatal(e: ExtractionError) -> Error {
    error!("{}", e);
    Error::ToolUnavailable(e.to_string())
}

fn extraction_failed(path: &Path, e: ExtractionError) -> ReportEntry {
    ReportEntry {
        source_path: path.to_path_buf(),
        label: file_label(path),
        outcome: ResolutionOutcome::Unresolved {
            reason: UnresolvedReason::ExtractionFailed(e.to_string()),
        },
        verdict: None,
        local_version: None,
        local_build: None,
        generation: InstallerGeneration::from_path(path),
    }
}

/// Info-file name, else the canonical product name, else the file name
fn label_for(meta: &RawInstallerMetadata, config: &OverrideConfig) -> String {
    if let Some(name) = meta
        .game_info
        .as_ref()
        .and_then(|info| info.name.as_deref())
        .filter(|name| !name.trim().is_empty())
    {
        return name.to_string();
    }

    meta.raw_title()
        .map(|title| normalize(title, config))
        .filter(|title| !title.is_empty())
        .map(|title| title.into_string())
        .unwrap_or_else(|| file_label(&meta.source_path))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// src/lib.rs

//! gogcheck
//!
//! Finds GOG offline installers that are older than the version currently
//! published in the GOG catalog.
//!
//! # Architecture
//!
//! - `extract`: raw metadata out of installer files (innoextract, 7-zip, PE resources)
//! - `overrides`: data file rules, loaded once and shared read-only
//! - `title` / `resolver`: product name cleanup and catalog identity resolution
//! - `version`: opaque version equivalence with per-product overrides
//! - `batch`: parallel fan-out over installers, results in discovery order
//! - `report`: console lines, summary and the dated output file

pub mod batch;
pub mod catalog;
pub mod discovery;
mod error;
pub mod extract;
pub mod logging;
pub mod metadata;
pub mod overrides;
pub mod progress;
pub mod report;
pub mod resolver;
pub mod title;
pub mod version;

pub use batch::{BatchRunner, ReportEntry};
pub use catalog::{Catalog, CatalogEntry, CatalogError, GogCatalog};
pub use error::{Error, Result};
pub use extract::{ExtractionError, InnoExtractor, MetadataExtractor, ToolPaths};
pub use metadata::{GameInfo, InstallerGeneration, RawInstallerMetadata};
pub use overrides::{ConfigError, OverrideConfig};
pub use progress::{CliProgress, LogProgress, ProgressTracker, SilentProgress};
pub use resolver::{ResolutionOutcome, SkipReason, UnresolvedReason, resolve};
pub use title::{CanonicalTitle, normalize};
pub use version::{IndeterminateReason, VersionVerdict, compare};

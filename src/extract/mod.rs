// src/extract/mod.rs

//! Installer metadata extraction
//!
//! The batch runner only sees the [`MetadataExtractor`] trait. The production
//! implementation, [`InnoExtractor`], shells out to `innoextract` (and `7z`
//! for split legacy installers) and reads the executable's version resource.

mod innoextract;
mod version_info;

use crate::metadata::RawInstallerMetadata;
use std::path::Path;
use thiserror::Error;

pub use innoextract::{parse_product_id, InnoExtractor, ToolPaths};
pub use version_info::read_version_strings;

/// Errors raised while extracting metadata from one installer
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The tool binary could not be started at all
    #[error("{tool} could not be executed: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure
    #[error("{tool} failed on '{path}': {stderr}")]
    ToolFailed {
        tool: String,
        path: String,
        stderr: String,
    },

    /// The installer is not a readable PE executable
    #[error("failed to read executable '{path}': {reason}")]
    Executable { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractionError {
    /// Whether this failure makes every further extraction pointless
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractionError::ToolUnavailable { .. })
    }
}

/// Produces raw metadata for an installer file
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, installer: &Path) -> Result<RawInstallerMetadata, ExtractionError>;
}

impl<T: MetadataExtractor + ?Sized> MetadataExtractor for &T {
    fn extract(&self, installer: &Path) -> Result<RawInstallerMetadata, ExtractionError> {
        (**self).extract(installer)
    }
}

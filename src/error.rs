// src/error.rs

//! Crate-wide error type
//!
//! Per-installer problems never surface here; they are folded into the
//! installer's report entry. What remains are the failures that stop a run.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::overrides::ConfigError;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum Error {
    /// The override data file is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An extraction tool could not be run at all
    #[error("extraction tool unavailable: {0}")]
    ToolUnavailable(String),

    /// A search path given on the command line is unusable
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Nothing that looks like an installer was found
    #[error("no installers found under the given paths")]
    NoInstallers,

    /// The catalog client could not be constructed
    #[error("catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    /// The worker pool could not be built
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}


// src/catalog/mod.rs

//! Remote catalog access
//!
//! The resolver talks to the catalog only through the [`Catalog`] trait so
//! that it can run against canned data in tests. [`GogCatalog`] is the
//! production implementation.

mod gog;

use serde::Serialize;
use thiserror::Error;

pub use gog::{GogCatalog, GogEndpoints};

/// Errors raised by catalog lookups
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Transport-level failure after all retries
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// The server answered with an error status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body was not what the catalog documents
    #[error("unexpected response from {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// One published product as the catalog describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub catalog_id: String,
    pub title: String,
    /// Version name of the newest published installer, if the catalog has one
    pub remote_version: Option<String>,
    pub build_id: Option<String>,
    /// The newest published installer is from the legacy generation
    pub legacy: bool,
}

impl CatalogEntry {
    pub fn new(catalog_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            title: title.into(),
            remote_version: None,
            build_id: None,
            legacy: false,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.remote_version = Some(version.into());
        self
    }

    pub fn with_build(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }
}

/// Query interface to the remote catalog
pub trait Catalog: Send + Sync {
    /// Exact lookup; `Ok(None)` when the catalog has no such product
    fn lookup_by_id(&self, catalog_id: &str) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Free-text search; candidates in the order the catalog returned them
    fn lookup_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Version name the catalog published for one build of a product
    fn version_for_build(
        &self,
        catalog_id: &str,
        build_id: &str,
    ) -> Result<Option<String>, CatalogError>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn lookup_by_id(&self, catalog_id: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        (**self).lookup_by_id(catalog_id)
    }

    fn lookup_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        (**self).lookup_by_title(title)
    }

    fn version_for_build(
        &self,
        catalog_id: &str,
        build_id: &str,
    ) -> Result<Option<String>, CatalogError> {
        (**self).version_for_build(catalog_id, build_id)
    }
}

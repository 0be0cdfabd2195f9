// tests/common/mod.rs

//! Shared fakes and helpers for integration tests.

#![allow(dead_code)]

use gogcheck::catalog::{Catalog, CatalogEntry, CatalogError};
use gogcheck::extract::{ExtractionError, MetadataExtractor};
use gogcheck::metadata::{GameInfo, RawInstallerMetadata};
use gogcheck::overrides::OverrideConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Data file used by most tests
pub const DATA_FILE: &str = r#"{
    "Replace_Names": { "Foo Bar (Spanish)": "Foo Bar II" },
    "Strings_To_Remove": ["\\s*\\((?:french|spanish|german)\\)"],
    "Roman_Numerals": { "II": 2, "III": 3 },
    "Goodies_ID": { "1400000000": "Great Game Soundtrack" },
    "Delisted_Games": ["Gone Game"],
    "Match_Versions": { "1207658924": [["2.0.1", "2.0.1a"]] }
}"#;

pub fn config() -> OverrideConfig {
    OverrideConfig::from_json_str(DATA_FILE).unwrap()
}

/// Metadata of a current-gen installer with the given product name and version
pub fn installer(path: &str, title: Option<&str>, id: Option<&str>, version: &str) -> RawInstallerMetadata {
    let mut meta = RawInstallerMetadata::new(path);
    if let Some(title) = title {
        meta.properties
            .insert("ProductName".to_string(), title.to_string());
    }
    meta.properties
        .insert("ProductVersion".to_string(), format!("{}.[100]", version));
    meta.embedded_catalog_id = id.map(str::to_string);
    meta
}

/// Mark metadata as belonging to a DLC of `root`
pub fn as_dlc(mut meta: RawInstallerMetadata, root: &str) -> RawInstallerMetadata {
    meta.game_info = Some(GameInfo {
        game_id: meta.embedded_catalog_id.clone(),
        root_game_id: Some(root.to_string()),
        ..Default::default()
    });
    meta
}

/// What the fake extractor answers for one path
#[derive(Clone)]
pub enum Extraction {
    Ok(RawInstallerMetadata),
    /// Corrupt installer: a per-installer failure
    Corrupt,
    /// Tool missing from the environment: fatal for the whole run
    ToolMissing,
}

/// Extractor answering from a fixed table, with optional per-path delays
#[derive(Default)]
pub struct FakeExtractor {
    results: HashMap<PathBuf, Extraction>,
    delays: HashMap<PathBuf, Duration>,
    pub calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, meta: RawInstallerMetadata) -> Self {
        self.results
            .insert(meta.source_path.clone(), Extraction::Ok(meta));
        self
    }

    pub fn with_result(mut self, path: impl Into<PathBuf>, result: Extraction) -> Self {
        self.results.insert(path.into(), result);
        self
    }

    pub fn with_delay(mut self, path: impl Into<PathBuf>, delay: Duration) -> Self {
        self.delays.insert(path.into(), delay);
        self
    }
}

impl MetadataExtractor for FakeExtractor {
    fn extract(&self, installer: &Path) -> Result<RawInstallerMetadata, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(installer) {
            std::thread::sleep(*delay);
        }

        match self.results.get(installer) {
            Some(Extraction::Ok(meta)) => Ok(meta.clone()),
            Some(Extraction::ToolMissing) => Err(ExtractionError::ToolUnavailable {
                tool: "innoextract".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
            Some(Extraction::Corrupt) | None => Err(ExtractionError::Executable {
                path: installer.display().to_string(),
                reason: "not a PE file".to_string(),
            }),
        }
    }
}

/// Catalog answering from fixed tables and counting every call
#[derive(Default)]
pub struct FakeCatalog {
    by_id: HashMap<String, CatalogEntry>,
    by_title: HashMap<String, Vec<CatalogEntry>>,
    builds: HashMap<(String, String), String>,
    unreachable: bool,
    pub id_calls: AtomicUsize,
    pub title_calls: AtomicUsize,
    pub build_calls: AtomicUsize,
    pub searched_titles: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, entry: CatalogEntry) -> Self {
        self.by_id.insert(entry.catalog_id.clone(), entry);
        self
    }

    pub fn with_search(mut self, title: &str, candidates: Vec<CatalogEntry>) -> Self {
        self.by_title.insert(title.to_string(), candidates);
        self
    }

    /// Publish `version` as the name of `build` of product `id`
    pub fn with_build(mut self, id: &str, build: &str, version: &str) -> Self {
        self.builds
            .insert((id.to_string(), build.to_string()), version.to_string());
        self
    }

    /// Every call fails as if the network were down
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.id_calls.load(Ordering::SeqCst)
            + self.title_calls.load(Ordering::SeqCst)
            + self.build_calls.load(Ordering::SeqCst)
    }

    fn transport_error() -> CatalogError {
        CatalogError::Http {
            url: "https://catalog.invalid".to_string(),
            reason: "connection refused".to_string(),
        }
    }
}

impl Catalog for FakeCatalog {
    fn lookup_by_id(&self, catalog_id: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        self.id_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(Self::transport_error());
        }
        Ok(self.by_id.get(catalog_id).cloned())
    }

    fn lookup_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        self.searched_titles.lock().unwrap().push(title.to_string());
        if self.unreachable {
            return Err(Self::transport_error());
        }
        Ok(self.by_title.get(title).cloned().unwrap_or_default())
    }

    fn version_for_build(
        &self,
        catalog_id: &str,
        build_id: &str,
    ) -> Result<Option<String>, CatalogError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(Self::transport_error());
        }
        Ok(self
            .builds
            .get(&(catalog_id.to_string(), build_id.to_string()))
            .cloned())
    }
}

// src/metadata.rs

//! Raw metadata extracted from an installer
//!
//! Everything here is what the extraction tools reported, unprocessed. The
//! helpers at the bottom derive the local version and build from it using the
//! naming conventions of GOG offline installers.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const PRODUCT_NAME: &str = "ProductName";
pub const PRODUCT_VERSION: &str = "ProductVersion";

/// `setup_<name>_<x.y.z>.exe`: the naming of the old installer generation
static OLD_GEN_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"_([0-9]+(?:\.[0-9]+)+)\.exe$")
        .case_insensitive(true)
        .build()
        .expect("valid regex")
});

/// Version segment of a current-gen installer name, just before `_(<build>)`
static FILENAME_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"_+((?:v\.?)?(?:[a-zá-úñ0-9]+-)?(?:[0-9\-]+(?:\.[0-9a-z\-_]+?(?:\([^\)]+?\))?)*))_\(",
    )
    .case_insensitive(true)
    .build()
    .expect("valid regex")
});

/// `ProductVersion` of the form `<version>.[<build>]`
static BUILD_IN_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+?\.\[([0-9]+)\]").expect("valid regex"));

/// `ProductVersion` minus its trailing `.[<build>]` decoration
static VERSION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\.(?:\[[0-9]*\]?)?$").expect("valid regex"));

/// Installer packaging generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallerGeneration {
    /// Current Galaxy-era installers
    #[default]
    Current,
    /// Legacy installers, optionally split into `.bin` parts
    Old,
}

impl InstallerGeneration {
    /// Classify an installer from its file name
    pub fn from_path(path: &Path) -> Self {
        let name = file_name(path);
        if OLD_GEN_FILENAME.is_match(&name) {
            InstallerGeneration::Old
        } else {
            InstallerGeneration::Current
        }
    }
}

/// Contents of the `goggame-<id>.info` file embedded in an installer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub build_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub game_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub root_game_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub dependency_game_id: Option<String>,
}

impl GameInfo {
    /// False for DLC, expansions and extras packaged as their own installer
    pub fn is_base_game(&self) -> bool {
        if let Some(dependency) = &self.dependency_game_id {
            return dependency.is_empty();
        }
        self.game_id == self.root_game_id
    }
}

/// Ids in info files show up both as numbers and as strings
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Everything the extraction tools reported for one installer
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawInstallerMetadata {
    pub source_path: PathBuf,
    /// Version-resource strings; blank values are omitted
    pub properties: BTreeMap<String, String>,
    /// Catalog id embedded in the installer, when there is one
    pub embedded_catalog_id: Option<String>,
    pub generation: InstallerGeneration,
    pub game_info: Option<GameInfo>,
}

impl RawInstallerMetadata {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let generation = InstallerGeneration::from_path(&source_path);
        Self {
            source_path,
            generation,
            ..Default::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Product name exactly as stored in the executable
    pub fn raw_title(&self) -> Option<&str> {
        self.property(PRODUCT_NAME)
    }

    /// Best human-readable name: info file first, then the executable
    pub fn display_name(&self) -> Option<&str> {
        self.game_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.raw_title())
    }

    /// Build id from `ProductVersion`, falling back to the info file
    pub fn local_build(&self) -> Option<String> {
        self.property(PRODUCT_VERSION)
            .and_then(|v| BUILD_IN_VERSION.captures(v))
            .map(|caps| caps[1].to_string())
            .or_else(|| self.game_info.as_ref().and_then(|i| i.build_id.clone()))
    }

    /// Version of the locally held installer
    pub fn local_version(&self) -> Option<String> {
        let product_version = self.property(PRODUCT_VERSION);
        let name = file_name(&self.source_path);

        match self.generation {
            InstallerGeneration::Old => product_version
                .map(str::to_string)
                .or_else(|| version_from_old_filename(&name)),
            InstallerGeneration::Current => product_version
                .and_then(|v| VERSION_NAME.captures(v))
                .map(|caps| caps[1].to_string())
                .or_else(|| version_from_filename(&name)),
        }
    }

    pub fn file_name(&self) -> String {
        file_name(&self.source_path)
    }
}

/// Version from an old-gen file name (`setup_game_1.2.3.exe`)
pub fn version_from_old_filename(file_name: &str) -> Option<String> {
    OLD_GEN_FILENAME
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// Version from a current-gen file name (`setup_game_1.2_hotfix_(64bit)_(1234).exe`)
pub fn version_from_filename(file_name: &str) -> Option<String> {
    FILENAME_VERSION
        .captures(file_name)
        .map(|caps| caps[1].trim().replace('_', " "))
        .filter(|v| !v.is_empty())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

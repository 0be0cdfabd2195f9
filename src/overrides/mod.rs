// src/overrides/mod.rs

//! Override rules loaded from the data file
//!
//! The data file is a loosely-typed JSON document holding six independent
//! tables of hand-maintained exceptions:
//!
//! - `Replace_Names`: raw product name → corrected search title
//! - `Strings_To_Remove`: regular expressions stripped from titles
//! - `Roman_Numerals`: numeral token → decimal token
//! - `Goodies_ID`: catalog ids that are never looked up
//! - `Delisted_Games`: raw product names that are never looked up
//! - `Match_Versions`: catalog id → pairs of version strings that denote the same release
//!
//! Every table is optional. The whole file is optional too: a missing file
//! yields [`OverrideConfig::default`], which matches nothing.
//!
//! Once loaded, an [`OverrideConfig`] is never mutated. Consumers borrow it.

mod loader;

use regex::Regex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub use loader::{
    DELISTED_GAMES, GOODIES_ID, MATCH_VERSIONS, REPLACE_NAMES, ROMAN_NUMERALS, STRINGS_TO_REMOVE,
};

/// Errors raised while loading the data file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read data file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not JSON at all
    #[error("data file is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The top-level value is not an object
    #[error("data file must contain a JSON object at the top level")]
    NotAnObject,

    /// One table failed validation
    #[error("invalid '{table}' table in data file: {reason}")]
    Table { table: &'static str, reason: String },
}

impl ConfigError {
    /// Name of the offending table, if the error is table-specific
    pub fn table(&self) -> Option<&'static str> {
        match self {
            ConfigError::Table { table, .. } => Some(*table),
            _ => None,
        }
    }
}

/// A compiled numeral substitution
#[derive(Debug, Clone)]
pub struct NumeralRule {
    /// Token as written in the data file (e.g. `"II"`)
    pub token: String,
    /// Replacement (e.g. `"2"`)
    pub value: String,
    pattern: Regex,
}

impl NumeralRule {
    pub(crate) fn new(token: String, value: String) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&token)))?;
        Ok(Self {
            token,
            value,
            pattern,
        })
    }

    /// Word-bounded matcher for the token
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// Immutable set of override tables
#[derive(Debug, Clone, Default)]
pub struct OverrideConfig {
    name_replacements: HashMap<String, String>,
    strip_patterns: Vec<Regex>,
    roman_numerals: Vec<NumeralRule>,
    goodies_ids: HashSet<String>,
    delisted_titles: HashSet<String>,
    version_equivalences: HashMap<String, Vec<(String, String)>>,
}

impl OverrideConfig {
    /// Corrected title for an exact raw product name
    pub fn replacement_for(&self, raw_title: &str) -> Option<&str> {
        self.name_replacements.get(raw_title).map(String::as_str)
    }

    /// Title cleanup patterns, in file order
    pub fn strip_patterns(&self) -> &[Regex] {
        &self.strip_patterns
    }

    pub fn roman_numerals(&self) -> &[NumeralRule] {
        &self.roman_numerals
    }

    pub fn is_goodie(&self, catalog_id: &str) -> bool {
        self.goodies_ids.contains(catalog_id)
    }

    pub fn is_delisted(&self, raw_title: &str) -> bool {
        self.delisted_titles.contains(raw_title)
    }

    /// Version pairs declared equivalent for a catalog id (empty if none)
    pub fn equivalences(&self, catalog_id: &str) -> &[(String, String)] {
        self.version_equivalences
            .get(catalog_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True when no table holds any rule
    pub fn is_empty(&self) -> bool {
        self.name_replacements.is_empty()
            && self.strip_patterns.is_empty()
            && self.roman_numerals.is_empty()
            && self.goodies_ids.is_empty()
            && self.delisted_titles.is_empty()
            && self.version_equivalences.is_empty()
    }

    /// One-line summary of table sizes, for logging
    pub fn summary(&self) -> String {
        format!(
            "{} name replacements, {} strip patterns, {} numerals, {} goodies, {} delisted, {} version overrides",
            self.name_replacements.len(),
            self.strip_patterns.len(),
            self.roman_numerals.len(),
            self.goodies_ids.len(),
            self.delisted_titles.len(),
            self.version_equivalences.len()
        )
    }
}

// src/overrides/loader.rs

//! Data file parsing and validation
//!
//! The document is decoded into a generic JSON value first and each table is
//! then validated on its own, so an error always names the table at fault.

use super::{ConfigError, NumeralRule, OverrideConfig};
use regex::RegexBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

pub const MATCH_VERSIONS: &str = "Match_Versions";
pub const REPLACE_NAMES: &str = "Replace_Names";
pub const STRINGS_TO_REMOVE: &str = "Strings_To_Remove";
pub const ROMAN_NUMERALS: &str = "Roman_Numerals";
pub const GOODIES_ID: &str = "Goodies_ID";
pub const DELISTED_GAMES: &str = "Delisted_Games";

const KNOWN_TABLES: [&str; 6] = [
    MATCH_VERSIONS,
    REPLACE_NAMES,
    STRINGS_TO_REMOVE,
    ROMAN_NUMERALS,
    GOODIES_ID,
    DELISTED_GAMES,
];

/// A scalar that may be written either as a number or as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(u64),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// `Goodies_ID` is either a list of ids or an object keyed by id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdSet {
    List(Vec<Scalar>),
    Keyed(BTreeMap<String, Value>),
}

impl OverrideConfig {
    /// Load the data file at `path`
    ///
    /// `None` or a path that does not exist produce an empty configuration.
    /// Anything else that goes wrong is a [`ConfigError`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No data file configured, using empty override rules");
            return Ok(Self::default());
        };

        info!("Loading data file {}", path.display());

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Data file \"{}\" doesn't exist. Loading empty content.",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let config = Self::from_json_str(&content)?;
        info!("Data file loaded: {}", config.summary());
        Ok(config)
    }

    /// Parse a data file document held in memory
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(content).map_err(ConfigError::Syntax)?;
        let Value::Object(tables) = document else {
            return Err(ConfigError::NotAnObject);
        };

        if tables.is_empty() {
            info!("Data file empty.");
            return Ok(Self::default());
        }

        for key in tables.keys() {
            if !KNOWN_TABLES.contains(&key.as_str()) {
                warn!("Ignoring unknown data file table '{}'", key);
            }
        }

        let config = Self {
            name_replacements: parse_name_replacements(&tables)?,
            strip_patterns: parse_strip_patterns(&tables)?,
            roman_numerals: parse_roman_numerals(&tables)?,
            goodies_ids: parse_goodies(&tables)?,
            delisted_titles: parse_delisted(&tables)?,
            version_equivalences: parse_version_equivalences(&tables)?,
        };

        debug!("Override rules: {}", config.summary());
        Ok(config)
    }
}

/// Deserialize one table, treating an absent key or `null` as absent
fn table<T: DeserializeOwned>(
    tables: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match tables.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ConfigError::Table {
                table: name,
                reason: e.to_string(),
            }),
    }
}

fn parse_name_replacements(
    tables: &Map<String, Value>,
) -> Result<HashMap<String, String>, ConfigError> {
    let names: Option<HashMap<String, String>> = table(tables, REPLACE_NAMES)?;
    Ok(names.unwrap_or_default())
}

fn parse_strip_patterns(tables: &Map<String, Value>) -> Result<Vec<regex::Regex>, ConfigError> {
    let patterns: Vec<String> = table(tables, STRINGS_TO_REMOVE)?.unwrap_or_default();

    patterns
        .iter()
        .enumerate()
        .map(|(idx, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::Table {
                    table: STRINGS_TO_REMOVE,
                    reason: format!("pattern #{} ('{}') does not compile: {}", idx, pattern, e),
                })
        })
        .collect()
}

fn parse_roman_numerals(tables: &Map<String, Value>) -> Result<Vec<NumeralRule>, ConfigError> {
    let numerals: BTreeMap<String, Scalar> = table(tables, ROMAN_NUMERALS)?.unwrap_or_default();

    let mut rules = Vec::with_capacity(numerals.len());
    for (token, value) in numerals {
        if token.trim().is_empty() {
            return Err(ConfigError::Table {
                table: ROMAN_NUMERALS,
                reason: "numeral tokens must not be empty".to_string(),
            });
        }
        let rule = NumeralRule::new(token, value.into_string()).map_err(|e| ConfigError::Table {
            table: ROMAN_NUMERALS,
            reason: e.to_string(),
        })?;
        rules.push(rule);
    }

    Ok(rules)
}

fn parse_goodies(tables: &Map<String, Value>) -> Result<HashSet<String>, ConfigError> {
    let ids = match table::<IdSet>(tables, GOODIES_ID)? {
        None => HashSet::new(),
        Some(IdSet::List(ids)) => ids.into_iter().map(Scalar::into_string).collect(),
        Some(IdSet::Keyed(ids)) => ids.into_keys().collect(),
    };
    Ok(ids)
}

fn parse_delisted(tables: &Map<String, Value>) -> Result<HashSet<String>, ConfigError> {
    let titles: Option<Vec<String>> = table(tables, DELISTED_GAMES)?;
    Ok(titles.unwrap_or_default().into_iter().collect())
}

fn parse_version_equivalences(
    tables: &Map<String, Value>,
) -> Result<HashMap<String, Vec<(String, String)>>, ConfigError> {
    let versions: Option<HashMap<String, Vec<(String, String)>>> = table(tables, MATCH_VERSIONS)?;
    Ok(versions.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"{
        "Match_Versions": { "1207658924": [["1.0", "1.0a"], ["2.0", "2.0 (gog-3)"]] },
        "Replace_Names": { "Foo Bar (Spanish)": "Foo Bar II" },
        "Strings_To_Remove": ["\\s*\\((?:spanish|french|german)\\)$"],
        "Roman_Numerals": { "II": 2, "III": "3" },
        "Goodies_ID": { "1400000000": "Soundtrack" },
        "Delisted_Games": ["Gone Game"]
    }"#;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = OverrideConfig::load(Some(&dir.path().join("data.json"))).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_no_path_is_empty() {
        assert!(OverrideConfig::load(None).unwrap().is_empty());
    }

    #[test]
    fn test_load_full_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = OverrideConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.replacement_for("Foo Bar (Spanish)"), Some("Foo Bar II"));
        assert_eq!(config.strip_patterns().len(), 1);
        assert_eq!(config.roman_numerals().len(), 2);
        assert!(config.is_goodie("1400000000"));
        assert!(config.is_delisted("Gone Game"));
        assert_eq!(config.equivalences("1207658924").len(), 2);
        assert!(config.equivalences("unknown").is_empty());
    }

    #[test]
    fn test_numeral_values_accept_numbers_and_strings() {
        let config = OverrideConfig::from_json_str(FULL).unwrap();
        let values: Vec<(&str, &str)> = config
            .roman_numerals()
            .iter()
            .map(|r| (r.token.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(values, vec![("II", "2"), ("III", "3")]);
    }

    #[test]
    fn test_goodies_accepts_list() {
        let config = OverrideConfig::from_json_str(r#"{"Goodies_ID": [1, "2"]}"#).unwrap();
        assert!(config.is_goodie("1"));
        assert!(config.is_goodie("2"));
    }

    #[test]
    fn test_empty_object_and_nulls() {
        assert!(OverrideConfig::from_json_str("{}").unwrap().is_empty());
        let config = OverrideConfig::from_json_str(r#"{"Replace_Names": null}"#).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_malformed_table_is_named() {
        let err = OverrideConfig::from_json_str(r#"{"Match_Versions": {"1": [["only-one"]]}}"#)
            .unwrap_err();
        assert_eq!(err.table(), Some(MATCH_VERSIONS));

        let err = OverrideConfig::from_json_str(r#"{"Delisted_Games": "nope"}"#).unwrap_err();
        assert_eq!(err.table(), Some(DELISTED_GAMES));
        assert!(err.to_string().contains(DELISTED_GAMES));
    }

    #[test]
    fn test_bad_regex_is_reported_against_strip_table() {
        let err = OverrideConfig::from_json_str(r#"{"Strings_To_Remove": ["(unclosed"]}"#)
            .unwrap_err();
        assert_eq!(err.table(), Some(STRINGS_TO_REMOVE));
    }

    #[test]
    fn test_strip_patterns_are_case_insensitive() {
        let config =
            OverrideConfig::from_json_str(r#"{"Strings_To_Remove": ["\\(demo\\)"]}"#).unwrap();
        assert!(config.strip_patterns()[0].is_match("Game (DEMO)"));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            OverrideConfig::from_json_str("[1, 2]"),
            Err(ConfigError::NotAnObject)
        ));
        assert!(matches!(
            OverrideConfig::from_json_str("{ broken"),
            Err(ConfigError::Syntax(_))
        ));
    }
}

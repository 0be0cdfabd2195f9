// src/title.rs

//! Title normalization
//!
//! Turns the product name found in an installer's version resource into the
//! string used to search the catalog. The steps run in a fixed order:
//!
//! 1. exact-match name replacement (keyed on the raw, untouched title)
//! 2. strip patterns, each removing every match
//! 3. word-bounded roman numeral replacement
//! 4. whitespace cleanup
//!
//! Replacement comes first because its keys are the raw titles as they appear
//! in the executable; any cleanup before it would stop them from matching.

use crate::overrides::OverrideConfig;
use regex::NoExpand;
use std::fmt;
use tracing::debug;

/// A title after normalization, used as a catalog search key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalTitle(String);

impl CanonicalTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw product name into a catalog search title
pub fn normalize(raw_title: &str, config: &OverrideConfig) -> CanonicalTitle {
    let mut title = match config.replacement_for(raw_title) {
        Some(replacement) => {
            debug!("Replacing name \"{}\" with \"{}\"", raw_title, replacement);
            replacement.to_string()
        }
        None => raw_title.to_string(),
    };

    for pattern in config.strip_patterns() {
        if pattern.is_match(&title) {
            title = pattern.replace_all(&title, "").into_owned();
        }
    }

    for numeral in config.roman_numerals() {
        if numeral.pattern().is_match(&title) {
            title = numeral
                .pattern()
                .replace_all(&title, NoExpand(&numeral.value))
                .into_owned();
        }
    }

    let title = collapse_whitespace(&title);
    if title != raw_title {
        debug!("Normalized \"{}\" to \"{}\"", raw_title, title);
    }

    CanonicalTitle(title)
}

/// Trim the ends and squeeze the gaps left behind by removals
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> OverrideConfig {
        OverrideConfig::from_json_str(json).unwrap()
    }

    const LANG_TAG: &str = r#"\\s*\\((?:spanish|french|german|polish)\\)\\s*$"#;

    #[test]
    fn test_no_rules_only_trims() {
        let empty = OverrideConfig::default();
        assert_eq!(normalize("  Great Game  ", &empty).as_str(), "Great Game");
    }

    #[test]
    fn test_replacement_feeds_later_steps() {
        let cfg = config(&format!(
            r#"{{
                "Replace_Names": {{ "Foo Bar (Spanish)": "Foo Bar II" }},
                "Strings_To_Remove": ["{LANG_TAG}"],
                "Roman_Numerals": {{ "II": 2 }}
            }}"#
        ));
        assert_eq!(normalize("Foo Bar (Spanish)", &cfg).as_str(), "Foo Bar 2");
    }

    #[test]
    fn test_replacement_is_keyed_on_raw_title() {
        // The key still carries the tag, so stripping first would miss it.
        let cfg = config(&format!(
            r#"{{
                "Replace_Names": {{ "Thing (French)": "Other Thing (French)" }},
                "Strings_To_Remove": ["{LANG_TAG}"]
            }}"#
        ));
        assert_eq!(normalize("Thing (French)", &cfg).as_str(), "Other Thing");
        assert_eq!(normalize("Thing", &cfg).as_str(), "Thing");
    }

    #[test]
    fn test_replacement_is_case_sensitive() {
        let cfg = config(r#"{"Replace_Names": {"Witcher": "The Witcher"}}"#);
        assert_eq!(normalize("witcher", &cfg).as_str(), "witcher");
    }

    #[test]
    fn test_strip_patterns_apply_in_order() {
        let cfg = config(r#"{"Strings_To_Remove": ["™", "\\s*-\\s*GOTY$"]}"#);
        assert_eq!(normalize("Great Game™ - GOTY", &cfg).as_str(), "Great Game");
    }

    #[test]
    fn test_strip_removes_every_match() {
        let cfg = config(r#"{"Strings_To_Remove": ["®"]}"#);
        assert_eq!(normalize("A® B®", &cfg).as_str(), "A B");
    }

    #[test]
    fn test_numerals_respect_word_boundaries() {
        let cfg = config(r#"{"Roman_Numerals": {"II": "2", "IV": "4"}}"#);
        assert_eq!(normalize("Civilization IV", &cfg).as_str(), "Civilization 4");
        assert_eq!(normalize("HEXII", &cfg).as_str(), "HEXII");
        assert_eq!(normalize("Divinity II: Ego", &cfg).as_str(), "Divinity 2: Ego");
    }

    #[test]
    fn test_numerals_are_case_sensitive() {
        let cfg = config(r#"{"Roman_Numerals": {"II": "2"}}"#);
        assert_eq!(normalize("Part ii", &cfg).as_str(), "Part ii");
    }

    #[test]
    fn test_internal_gaps_collapse() {
        let cfg = config(r#"{"Strings_To_Remove": ["\\(Demo\\)"]}"#);
        assert_eq!(normalize("Game (Demo) Deluxe", &cfg).as_str(), "Game Deluxe");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let cfg = config(&format!(
            r#"{{
                "Replace_Names": {{ "Foo Bar (Spanish)": "Foo Bar II" }},
                "Strings_To_Remove": ["{LANG_TAG}", "™", "®"],
                "Roman_Numerals": {{ "II": 2, "III": 3 }}
            }}"#
        ));
        for raw in [
            "Foo Bar (Spanish)",
            "Great Game (French)",
            "Saga III™",
            "Great® Game®",
            "  Plain Title ",
        ] {
            let once = normalize(raw, &cfg);
            let twice = normalize(once.as_str(), &cfg);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}

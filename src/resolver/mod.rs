// src/resolver/mod.rs

//! Identity resolution
//!
//! Maps the raw metadata of one installer to a catalog entry, or explains why
//! it could not or should not be mapped. The decision order is fixed:
//!
//! 1. goodies (by embedded id) and delisted titles are skipped
//! 2. installers whose info file marks them as DLC or extras are skipped
//! 3. an embedded id is looked up directly and never falls back to search
//! 4. otherwise the normalized product name is searched; the first candidate wins
//!
//! Skips happen before any catalog call.

use crate::catalog::{Catalog, CatalogEntry};
use crate::metadata::RawInstallerMetadata;
use crate::overrides::OverrideConfig;
use crate::title::normalize;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Why an installer was deliberately left out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Embedded id is a known goodies (extras) product
    Goodie,
    /// Product name is on the delisted list
    Delisted,
    /// DLC or other add-on that depends on a base game
    NotBaseGame,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Goodie => write!(f, "goodies"),
            SkipReason::Delisted => write!(f, "delisted"),
            SkipReason::NotBaseGame => write!(f, "not a base game"),
        }
    }
}

/// Why an installer could not be mapped to a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// Id lookup missed or the search returned nothing
    NoCandidates,
    /// Metadata could not be read from the installer
    ExtractionFailed(String),
    /// The catalog could not be reached or answered garbage
    LookupFailed(String),
    /// No embedded id and no product name to search for
    MissingTitle,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoCandidates => write!(f, "no catalog match"),
            UnresolvedReason::ExtractionFailed(detail) => {
                write!(f, "metadata extraction failed: {}", detail)
            }
            UnresolvedReason::LookupFailed(detail) => write!(f, "catalog lookup failed: {}", detail),
            UnresolvedReason::MissingTitle => write!(f, "no product name"),
        }
    }
}

/// Result of resolving one installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ResolutionOutcome {
    Skipped { reason: SkipReason },
    Resolved { entry: CatalogEntry },
    Unresolved { reason: UnresolvedReason },
}

impl ResolutionOutcome {
    pub fn entry(&self) -> Option<&CatalogEntry> {
        match self {
            ResolutionOutcome::Resolved { entry } => Some(entry),
            _ => None,
        }
    }

    fn unresolved(reason: UnresolvedReason) -> Self {
        ResolutionOutcome::Unresolved { reason }
    }
}

/// Resolve an installer's metadata to a catalog entry
pub fn resolve<C>(meta: &RawInstallerMetadata, config: &OverrideConfig, catalog: &C) -> ResolutionOutcome
where
    C: Catalog + ?Sized,
{
    let path = meta.source_path.display();
    let embedded_id = meta.embedded_catalog_id.as_deref();
    let raw_title = meta.raw_title();

    if embedded_id.is_some_and(|id| config.is_goodie(id)) {
        info!("Skipping goodies installer {}", path);
        return ResolutionOutcome::Skipped {
            reason: SkipReason::Goodie,
        };
    }

    if raw_title.is_some_and(|title| config.is_delisted(title)) {
        info!("Skipping delisted game {}", path);
        return ResolutionOutcome::Skipped {
            reason: SkipReason::Delisted,
        };
    }

    if let Some(info) = &meta.game_info {
        if !info.is_base_game() {
            info!("Skipping {}: not a base game installer", path);
            return ResolutionOutcome::Skipped {
                reason: SkipReason::NotBaseGame,
            };
        }
    }

    if let Some(id) = embedded_id {
        debug!("Looking up {} by embedded id {}", path, id);
        return match catalog.lookup_by_id(id) {
            Ok(Some(entry)) => ResolutionOutcome::Resolved { entry },
            Ok(None) => {
                warn!("Catalog has no product {} (from {})", id, path);
                ResolutionOutcome::unresolved(UnresolvedReason::NoCandidates)
            }
            Err(e) => {
                error!("Lookup of {} failed: {}", id, e);
                ResolutionOutcome::unresolved(UnresolvedReason::LookupFailed(e.to_string()))
            }
        };
    }

    let Some(raw_title) = raw_title else {
        warn!("{} has neither an embedded id nor a product name", path);
        return ResolutionOutcome::unresolved(UnresolvedReason::MissingTitle);
    };

    let title = normalize(raw_title, config);
    if title.is_empty() {
        warn!("Product name \"{}\" of {} normalized to nothing", raw_title, path);
        return ResolutionOutcome::unresolved(UnresolvedReason::MissingTitle);
    }

    debug!("Searching catalog for \"{}\" ({})", title, path);
    match catalog.lookup_by_title(title.as_str()) {
        Ok(candidates) => match candidates.into_iter().next() {
            Some(entry) => ResolutionOutcome::Resolved { entry },
            None => {
                warn!("No search results for \"{}\" ({})", title, path);
                ResolutionOutcome::unresolved(UnresolvedReason::NoCandidates)
            }
        },
        Err(e) => {
            error!("Search for \"{}\" failed: {}", title, e);
            ResolutionOutcome::unresolved(UnresolvedReason::LookupFailed(e.to_string()))
        }
    }
}

// src/version/mod.rs

//! Version equivalence
//!
//! Version strings are compared as opaque strings. Publishers rename builds
//! freely ("1.0 hotfix", "v1.0.1-gog") and the same release can carry
//! different names in the installer and in the catalog, so there is no
//! ordering, only equality plus the per-product pairs declared equivalent in
//! the override data.

use crate::overrides::OverrideConfig;
use serde::Serialize;
use std::fmt;

/// Why no verdict could be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndeterminateReason {
    /// The local or the remote version is missing or blank
    MissingVersion,
}

impl fmt::Display for IndeterminateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndeterminateReason::MissingVersion => write!(f, "version unknown"),
        }
    }
}

/// Outcome of comparing a local version with the published one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum VersionVerdict {
    UpToDate,
    UpdateAvailable {
        local_version: String,
        remote_version: String,
    },
    Indeterminate {
        reason: IndeterminateReason,
    },
}

impl VersionVerdict {
    pub fn is_update(&self) -> bool {
        matches!(self, VersionVerdict::UpdateAvailable { .. })
    }
}

/// Decide whether `local` is the currently published version of `catalog_id`
///
/// Equal strings are always up to date. Otherwise the pair is looked up,
/// in either order, among the product's declared equivalences.
pub fn compare(
    catalog_id: &str,
    local: Option<&str>,
    remote: Option<&str>,
    config: &OverrideConfig,
) -> VersionVerdict {
    let present = |v: Option<&str>| v.filter(|v| !v.trim().is_empty()).map(str::to_string);
    let (Some(local), Some(remote)) = (present(local), present(remote)) else {
        return VersionVerdict::Indeterminate {
            reason: IndeterminateReason::MissingVersion,
        };
    };

    if local == remote || is_equivalent(catalog_id, &local, &remote, config) {
        return VersionVerdict::UpToDate;
    }

    VersionVerdict::UpdateAvailable {
        local_version: local,
        remote_version: remote,
    }
}

fn is_equivalent(catalog_id: &str, a: &str, b: &str, config: &OverrideConfig) -> bool {
    config
        .equivalences(catalog_id)
        .iter()
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

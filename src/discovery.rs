// src/discovery.rs

//! Installer discovery
//!
//! Walks the given directories for executables and keeps the ones named like
//! GOG offline installers:
//!
//! - `setup_<name>_<version>_(<build>).exe` for current installers
//! - `setup_<name>_<x.y.z>.exe` for legacy ones
//!
//! with an optional `_(<arch or language>)` suffix before `.exe`. Patches and
//! other executables living next to the installers are ignored.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

static INSTALLER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"^setup((?:_+[a-zá-úñ0-9\-.]+)+)(_.+)?(_+\([0-9]+\)|_[0-9]+(?:\.[0-9]+)+)(_\([^\)]+\))?\.exe$",
    )
    .case_insensitive(true)
    .build()
    .expect("valid regex")
});

/// Whether a file name looks like a GOG offline installer
pub fn is_installer_name(file_name: &str) -> bool {
    INSTALLER_NAME.is_match(file_name)
}

/// Check that every search root exists and is a directory
pub fn validate_roots(roots: &[PathBuf]) -> Result<()> {
    for root in roots {
        if !root.exists() {
            return Err(Error::InvalidPath {
                path: root.display().to_string(),
                reason: "does not exist".to_string(),
            });
        }
        if !root.is_dir() {
            return Err(Error::InvalidPath {
                path: root.display().to_string(),
                reason: "is not a directory".to_string(),
            });
        }
    }
    Ok(())
}

/// Find installers under `roots`, sorted and without duplicates
pub fn find_installers(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    validate_roots(roots)?;
    info!("Retrieving executables from given paths...");

    let mut installers = Vec::new();
    for root in roots {
        let before = installers.len();
        collect_installers(root, &mut installers);
        debug!(
            "{} installers under {}",
            installers.len() - before,
            root.display()
        );
    }

    installers.sort();
    installers.dedup();

    if installers.is_empty() {
        return Err(Error::NoInstallers);
    }

    info!("Found {} installers", installers.len());
    Ok(installers)
}

fn collect_installers(root: &Path, installers: &mut Vec<PathBuf>) {
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let is_exe = Path::new(name.as_ref())
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));
        if !is_exe {
            continue;
        }

        if is_installer_name(&name) {
            installers.push(entry.into_path());
        } else {
            debug!("Ignoring executable {}", entry.path().display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_installer_names() {
        assert!(is_installer_name("setup_great_game_2.0_(1234).exe"));
        assert!(is_installer_name("setup_great_game_1.2_hotfix_(64bit)_(5678).exe"));
        assert!(is_installer_name("setup_old_game_2.0.0.3.exe"));
        assert!(is_installer_name("SETUP_Señor_Juego_1.0_(99).EXE"));
        assert!(is_installer_name("setup_game_(french)_1.0_(99)_(french).exe"));

        assert!(!is_installer_name("patch_great_game_2.0_to_2.1.exe"));
        assert!(!is_installer_name("setup.exe"));
        assert!(!is_installer_name("setup_great_game.exe"));
        assert!(!is_installer_name("setup_great_game_2.0_(1234).bin"));
    }

    #[test]
    fn test_find_installers_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("b").join("deeper");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();

        fs::write(nested.join("setup_zeta_1.0_(2).exe"), b"").unwrap();
        fs::write(dir.path().join("a").join("setup_alpha_1.0.0.1.exe"), b"").unwrap();
        fs::write(dir.path().join("a").join("setup_alpha_1.0.0.1-1.bin"), b"").unwrap();
        fs::write(dir.path().join("a").join("patch_alpha.exe"), b"").unwrap();

        let found = find_installers(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("a").join("setup_alpha_1.0.0.1.exe"),
                nested.join("setup_zeta_1.0_(2).exe"),
            ]
        );
    }

    #[test]
    fn test_overlapping_roots_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("setup_game_1.0_(2).exe"), b"").unwrap();

        let found = find_installers(&[dir.path().to_path_buf(), sub.clone()]).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_no_installers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        assert!(matches!(
            find_installers(&[dir.path().to_path_buf()]),
            Err(Error::NoInstallers)
        ));
    }

    #[test]
    fn test_invalid_roots() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, b"").unwrap();

        assert!(matches!(
            find_installers(&[dir.path().join("missing")]),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            find_installers(&[file]),
            Err(Error::InvalidPath { .. })
        ));
    }
}

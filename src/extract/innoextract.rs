// src/extract/innoextract.rs

//! Metadata extraction through `innoextract` and `7z`
//!
//! - `innoextract -l` lists the installer contents; the GOG product id is
//!   recovered from the names of the files GOG embeds (`goggame-<id>.info`,
//!   `tmp/<id>.ini`, ...).
//! - `innoextract -e -I goggame-<id>.info` pulls the game info file out.
//! - Legacy installers split into `.bin` parts keep that file inside a RAR
//!   volume encrypted with the MD5 of the product id, which `7z` can open.

use super::version_info::read_version_strings;
use super::{ExtractionError, MetadataExtractor};
use crate::error::{Error, Result};
use crate::metadata::{GameInfo, InstallerGeneration, RawInstallerMetadata};
use md5::{Digest, Md5};
use regex::{Regex, RegexBuilder};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

static PRODUCT_ID_TMP_INI: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r#"^.+?"tmp[\\/]([0-9]+)\.ini""#)
        .case_insensitive(true)
        .build()
        .expect("valid regex")
});

static PRODUCT_ID_GOGGAME: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r#"^.+?"(?:.+?[\\/])?goggame-([0-9]+)\.(?:hashdb|info|script|id)""#)
        .case_insensitive(true)
        .build()
        .expect("valid regex")
});

const INNOEXTRACT: &str = "innoextract";
const SEVEN_ZIP: &str = "7-zip";

/// Locations of the external tools
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub innoextract: PathBuf,
    /// Only needed for legacy installers split into `.bin` parts
    pub seven_zip: Option<PathBuf>,
}

impl ToolPaths {
    /// Resolve tool locations, falling back to `PATH` lookups
    ///
    /// innoextract is mandatory. 7-zip is optional: without it, split legacy
    /// installers are handed to innoextract, which cannot read their info file.
    pub fn discover(innoextract: Option<PathBuf>, seven_zip: Option<PathBuf>) -> Result<Self> {
        let innoextract = match innoextract {
            Some(path) => path,
            None => which::which("innoextract").map_err(|_| {
                Error::ToolUnavailable(
                    "innoextract not found in PATH and not specified".to_string(),
                )
            })?,
        };
        check_tool(&innoextract, INNOEXTRACT)?;

        let seven_zip = match seven_zip {
            Some(path) => {
                check_tool(&path, SEVEN_ZIP)?;
                Some(path)
            }
            None => which::which("7z").ok(),
        };
        if seven_zip.is_none() {
            warn!("7-zip not found; info files of split legacy installers will not be read");
        }

        debug!("innoextract: {}", innoextract.display());
        Ok(Self {
            innoextract,
            seven_zip,
        })
    }
}

fn check_tool(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::ToolUnavailable(format!(
            "{} path '{}' does not exist",
            name,
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(Error::ToolUnavailable(format!(
            "{} path '{}' is not a file, it should be the path to the executable",
            name,
            path.display()
        )));
    }
    Ok(())
}

/// Production extractor backed by external tools
#[derive(Debug, Clone)]
pub struct InnoExtractor {
    tools: ToolPaths,
}

impl InnoExtractor {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    /// Product id embedded in the installer, if any
    fn product_id(&self, installer: &Path) -> std::result::Result<Option<String>, ExtractionError> {
        let output = run_tool(
            INNOEXTRACT,
            &self.tools.innoextract,
            [OsStr::new("-l"), installer.as_os_str()],
        )?;
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(parse_product_id(&listing))
    }

    /// Extract and parse `goggame-<id>.info`
    ///
    /// Failures are logged and yield `None`; the info file only refines what
    /// the executable already told us.
    fn game_info(
        &self,
        installer: &Path,
        product_id: &str,
        generation: InstallerGeneration,
    ) -> Option<GameInfo> {
        let info_file = format!("goggame-{product_id}.info");
        let tmp_dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Could not create temporary directory: {}", e);
                return None;
            }
        };

        let legacy_bin = match generation {
            InstallerGeneration::Old if self.tools.seven_zip.is_some() => {
                self.split_legacy_archive(installer)
            }
            InstallerGeneration::Old | InstallerGeneration::Current => None,
        };
        let extracted = match legacy_bin {
            Some(bin) => self.extract_info_from_bin(&bin, product_id, &info_file, tmp_dir.path()),
            None => self.extract_info_with_innoextract(installer, &info_file, tmp_dir.path()),
        };
        if let Err(e) = extracted {
            warn!("Couldn't extract info file from {}: {}", installer.display(), e);
            return None;
        }

        // 7-zip keeps the archive's directory layout, so search below the root.
        let found = WalkDir::new(tmp_dir.path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .find(|entry| entry.file_type().is_file() && entry.file_name() == info_file.as_str())?;

        let bytes = match std::fs::read(found.path()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Couldn't read {}: {}", info_file, e);
                return None;
            }
        };
        match serde_json::from_str::<GameInfo>(&String::from_utf8_lossy(&bytes)) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Malformed {} in {}: {}", info_file, installer.display(), e);
                None
            }
        }
    }

    fn extract_info_with_innoextract(
        &self,
        installer: &Path,
        info_file: &str,
        out_dir: &Path,
    ) -> std::result::Result<(), ExtractionError> {
        run_tool(
            INNOEXTRACT,
            &self.tools.innoextract,
            [
                OsStr::new("-e"),
                OsStr::new("-I"),
                OsStr::new(info_file),
                OsStr::new("-d"),
                out_dir.as_os_str(),
                installer.as_os_str(),
            ],
        )
        .map(|_| ())
    }

    fn extract_info_from_bin(
        &self,
        bin: &Path,
        product_id: &str,
        info_file: &str,
        out_dir: &Path,
    ) -> std::result::Result<(), ExtractionError> {
        let Some(seven_zip) = &self.tools.seven_zip else {
            return Err(ExtractionError::ToolFailed {
                tool: SEVEN_ZIP.to_string(),
                path: bin.display().to_string(),
                stderr: "7-zip is not available".to_string(),
            });
        };

        let password = hex::encode(Md5::digest(product_id.as_bytes()));
        let output_arg = format!("-o{}", out_dir.display());
        let member = format!("game/{info_file}");
        let password_arg = format!("-p{password}");

        run_tool(
            SEVEN_ZIP,
            seven_zip,
            [
                OsStr::new("e"),
                bin.as_os_str(),
                OsStr::new(&output_arg),
                OsStr::new(&member),
                OsStr::new("-aoa"),
                OsStr::new("-y"),
                OsStr::new(&password_arg),
            ],
        )
        .map(|_| ())
    }

    /// First `.bin` part next to a legacy installer (`<stem>-1.bin` or `<stem>.bin`)
    fn split_legacy_archive(&self, installer: &Path) -> Option<PathBuf> {
        let dir = installer.parent()?;
        let stem = installer.file_stem()?.to_string_lossy();
        let dir = glob::Pattern::escape(&dir.to_string_lossy());
        let stem = glob::Pattern::escape(&stem);

        for pattern in [format!("{dir}/{stem}-*.bin"), format!("{dir}/{stem}.bin")] {
            let mut parts: Vec<PathBuf> = glob::glob(&pattern)
                .ok()?
                .filter_map(|entry| entry.ok())
                .collect();
            parts.sort();
            if let Some(first) = parts.into_iter().next() {
                return Some(first);
            }
        }

        info!(
            "{} is not using the old RAR compression, trying with innoextract",
            installer.display()
        );
        None
    }
}

impl MetadataExtractor for InnoExtractor {
    fn extract(
        &self,
        installer: &Path,
    ) -> std::result::Result<RawInstallerMetadata, ExtractionError> {
        let mut meta = RawInstallerMetadata::new(installer);

        meta.embedded_catalog_id = self.product_id(installer)?;
        match &meta.embedded_catalog_id {
            Some(id) => debug!("Product ID for {}: {}", meta.file_name(), id),
            None => info!(
                "Could not find the product ID of {} with innoextract",
                meta.file_name()
            ),
        }

        meta.properties = read_version_strings(installer)?;

        if let Some(id) = meta.embedded_catalog_id.clone() {
            meta.game_info = self.game_info(installer, &id, meta.generation);
        }

        Ok(meta)
    }
}

/// Run a tool to completion, mapping spawn and exit failures
fn run_tool<I, S>(
    name: &str,
    program: &Path,
    args: I,
) -> std::result::Result<Output, ExtractionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    debug!(
        "Running {} {}",
        program.display(),
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(program)
        .args(&args)
        .output()
        .map_err(|source| ExtractionError::ToolUnavailable {
            tool: name.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ExtractionError::ToolFailed {
            tool: name.to_string(),
            path: args
                .last()
                .map(|a| a.as_ref().to_string_lossy().into_owned())
                .unwrap_or_default(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Find the GOG product id in an `innoextract -l` listing
pub fn parse_product_id(listing: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        PRODUCT_ID_TMP_INI
            .captures(line)
            .or_else(|| PRODUCT_ID_GOGGAME.captures(line))
            .map(|caps| caps[1].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_from_goggame_file() {
        let listing = r#"Listing "Great Game" - setup data version 6.0.0 (unicode)
 - "app/Great Game.exe" [temp] (12.3 MiB)
 - "app/goggame-1207658924.info" (1.1 KiB)
 - "app/goggame-1207658924.hashdb" (2 KiB)
Done."#;
        assert_eq!(parse_product_id(listing).as_deref(), Some("1207658924"));
    }

    #[test]
    fn test_product_id_from_windows_style_tmp_ini() {
        let listing = r#" - "tmp\1435827232.ini" [temp] (1 KiB)"#;
        assert_eq!(parse_product_id(listing).as_deref(), Some("1435827232"));
    }

    #[test]
    fn test_product_id_first_line_wins() {
        let listing = " - \"goggame-111.script\"\n - \"goggame-222.info\"";
        assert_eq!(parse_product_id(listing).as_deref(), Some("111"));
    }

    #[test]
    fn test_no_product_id() {
        let listing = " - \"app/readme.txt\"\n - \"app/goggame-galaxyFileList.ini\"";
        assert_eq!(parse_product_id(listing), None);
    }

    #[test]
    fn test_missing_tool_is_fatal() {
        let extractor = InnoExtractor::new(ToolPaths {
            innoextract: PathBuf::from("/nonexistent/innoextract"),
            seven_zip: None,
        });
        let err = extractor
            .extract(Path::new("/nonexistent/setup_game_1.0_(1).exe"))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_discover_rejects_bad_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ToolPaths::discover(Some(dir.path().join("missing")), None).is_err());
        assert!(ToolPaths::discover(Some(dir.path().to_path_buf()), None).is_err());
    }

    #[test]
    fn test_split_legacy_archive_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let installer = dir.path().join("setup_old_game_1.0.0.1.exe");
        std::fs::write(&installer, b"").unwrap();
        std::fs::write(dir.path().join("setup_old_game_1.0.0.1-2.bin"), b"").unwrap();
        std::fs::write(dir.path().join("setup_old_game_1.0.0.1-1.bin"), b"").unwrap();

        let extractor = InnoExtractor::new(ToolPaths {
            innoextract: PathBuf::from("innoextract"),
            seven_zip: None,
        });
        let bin = extractor.split_legacy_archive(&installer).unwrap();
        assert_eq!(
            bin.file_name().unwrap().to_string_lossy(),
            "setup_old_game_1.0.0.1-1.bin"
        );
    }
}

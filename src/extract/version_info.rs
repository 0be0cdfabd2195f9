// src/extract/version_info.rs

//! PE version-resource reader
//!
//! Offline installers are routinely several gigabytes, nearly all of it
//! overlay data appended after the last section. Only the mapped image is
//! read from disk; goblin then walks the resource tree down to the
//! `StringFileInfo` table.

use super::ExtractionError;
use goblin::pe::PE;
use goblin::pe::header::{Header, SIZEOF_COFF_HEADER, SIZEOF_PE_MAGIC};
use goblin::pe::options::ParseOptions;
use goblin::pe::resource::StringFileInfo;
use goblin::pe::section_table::SectionTable;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Bytes read up front for the DOS/PE headers and the section table
const HEADER_READ_SIZE: u64 = 64 * 1024;

/// Upper bound for the image we are willing to load
const MAX_IMAGE_SIZE: u64 = 64 * 1024 * 1024;

/// Read the version-resource strings of an executable
///
/// Returns an empty map for executables without version information. Blank
/// values are dropped.
pub fn read_version_strings(path: &Path) -> Result<BTreeMap<String, String>, ExtractionError> {
    let shown = path.display().to_string();
    let io_err = |source| ExtractionError::Io {
        path: shown.clone(),
        source,
    };
    let bad_exe = |reason: String| ExtractionError::Executable {
        path: shown.clone(),
        reason,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut head = Vec::new();
    (&mut file)
        .take(HEADER_READ_SIZE)
        .read_to_end(&mut head)
        .map_err(io_err)?;

    let header = Header::parse(&head).map_err(|e| bad_exe(e.to_string()))?;
    let mut offset = header.dos_header.pe_pointer as usize
        + SIZEOF_PE_MAGIC
        + SIZEOF_COFF_HEADER
        + header.coff_header.size_of_optional_header as usize;
    let sections = header
        .coff_header
        .sections(&head, &mut offset)
        .map_err(|e| bad_exe(format!("bad section table: {e}")))?;

    let end = image_end(&sections).max(head.len() as u64);
    if end > MAX_IMAGE_SIZE {
        return Err(bad_exe(format!("image of {end} bytes is too large")));
    }

    let mut image = Vec::with_capacity(end as usize);
    file.seek(SeekFrom::Start(0)).map_err(io_err)?;
    file.take(end).read_to_end(&mut image).map_err(io_err)?;

    // the overlay is not part of the image, and a signature sits past it
    let mut opts = ParseOptions::default();
    opts.parse_attribute_certificates = false;
    opts.parse_imports = false;
    opts.parse_tls_data = false;

    let pe = PE::parse_with_opts(&image, &opts).map_err(|e| bad_exe(e.to_string()))?;
    let Some(info) = pe.resource_data.and_then(|r| r.version_info) else {
        debug!("{} has no version information", shown);
        return Ok(BTreeMap::new());
    };

    let strings = collect_strings(string_pairs(&info.string_info));
    debug!("Read {} version strings from {}", strings.len(), shown);
    Ok(strings)
}

/// End of the last section's raw data, where the overlay begins
fn image_end(sections: &[SectionTable]) -> u64 {
    sections
        .iter()
        .map(|s| u64::from(s.pointer_to_raw_data) + u64::from(s.size_of_raw_data))
        .max()
        .unwrap_or(0)
}

fn string_pairs(info: &StringFileInfo<'_>) -> [(&'static str, Option<String>); 12] {
    [
        ("Comments", info.comments()),
        ("InternalName", info.internal_name()),
        ("ProductName", info.product_name()),
        ("CompanyName", info.company_name()),
        ("LegalCopyright", info.legal_copyright()),
        ("ProductVersion", info.product_version()),
        ("FileDescription", info.file_description()),
        ("LegalTrademarks", info.legal_trademarks()),
        ("PrivateBuild", info.private_build()),
        ("FileVersion", info.file_version()),
        ("OriginalFilename", info.original_filename()),
        ("SpecialBuild", info.special_build()),
    ]
}

fn collect_strings<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.trim().to_string();
            (!value.is_empty()).then(|| (key.to_string(), value))
        })
        .collect()
}

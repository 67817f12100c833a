//! Source file detection and size-limited reading

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Default maximum file size for parsing (1MB).
/// Larger files are still listed but their declarations are not extracted.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Extension of the files whose declarations are extracted.
pub const SOURCE_EXTENSION: &str = "py";

/// Check whether a path names a Python source file.
///
/// Matching is exact and case-sensitive, so `setup.PY` and `stubs.pyi`
/// are treated as plain files.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Read a source file as UTF-8 if it is no larger than `max_size` bytes.
///
/// A leading byte order mark is stripped so it does not reach the parser.
pub fn read_source_file(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > max_size {
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_size,
        });
    }

    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
pub fn parse_file_size(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

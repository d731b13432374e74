//! Centralized validation and helper functions.

use std::path::Path;

use regex::Regex;

/// Maximum number of partitions a collection may be split into
pub const MAX_PARTITIONS: usize = 65_536;

/// Path that stands for stdin or stdout
pub const STDIO_PATH: &str = "-";

/// Check a requested partition count against the maximum allowed.
///
/// Returns an error message if the count exceeds the limit, None if it is acceptable.
///
/// # Example
/// ```
/// use bigseq::utils::validation::{check_partition_limit, MAX_PARTITIONS};
///
/// assert!(check_partition_limit(8).is_none());
/// assert!(check_partition_limit(MAX_PARTITIONS + 1).is_some());
/// ```
#[must_use]
pub fn check_partition_limit(count: usize) -> Option<String> {
    if count > MAX_PARTITIONS {
        Some(format!(
            "Too many partitions: {count} exceeds maximum of {MAX_PARTITIONS}"
        ))
    } else {
        None
    }
}

/// Check that an identifier pattern compiles and has a capture group
///
/// # Errors
///
/// Returns a description of the problem if the pattern is unusable.
pub fn check_capture_group(pattern: &str) -> Result<(), String> {
    let regex = Regex::new(pattern).map_err(|e| e.to_string())?;
    // Group 0 is the whole match
    if regex.captures_len() < 2 {
        return Err(format!("'{pattern}' has no capture group"));
    }
    Ok(())
}

/// Check if the path names stdin/stdout
#[must_use]
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

/// Check if the path is a gzipped file
#[must_use]
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Check for the gzip magic bytes
#[must_use]
pub fn has_gzip_magic(content: &[u8]) -> bool {
    content.starts_with(&[0x1f, 0x8b])
}

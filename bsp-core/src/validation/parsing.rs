//! Parsing and validation of short textual fields
//!
//! Version strings from metadata and entry names in the container.

use crate::{BspError, Result};

/// Longest name accepted for a group, dataset or attribute
pub const MAX_NAME_LEN: usize = 1024;

/// Parse a version string in the format "major.minor[.patch]"
///
/// Returns (major, minor, patch); the patch component defaults to 0.
pub fn parse_version(version_str: &str) -> Result<(u8, u8, u8)> {
    let invalid = || BspError::Parse(format!("invalid version string `{version_str}`"));

    if version_str.is_empty() {
        return Err(invalid());
    }

    let mut version_parts = [0u8; 3];
    let mut count = 0;

    for part in version_str.split('.') {
        if count >= 3 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        version_parts[count] = part.parse().map_err(|_| invalid())?;
        count += 1;
    }

    // Need at least major.minor
    if count < 2 {
        return Err(invalid());
    }

    Ok((version_parts[0], version_parts[1], version_parts[2]))
}

/// Validate a single path component of a container entry
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |why: &str| BspError::Storage(format!("invalid entry name `{name}`: {why}"));

    if name.is_empty() {
        return Err(invalid("empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("too long"));
    }
    if name.contains('/') {
        return Err(invalid("contains `/`"));
    }
    if name.bytes().any(|b| b < 32) {
        return Err(invalid("contains control characters"));
    }

    Ok(())
}

/// Split a `/`-separated group path into validated components
///
/// Leading, trailing and repeated separators are ignored, so `""` and `"/"`
/// both name the root.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    for part in &parts {
        validate_name(part)?;
    }
    Ok(parts)
}

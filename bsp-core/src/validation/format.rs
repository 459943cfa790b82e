//! Layout helpers for the binary container
//!
//! Pure functions over offsets and fixed-size byte fields.

use crate::{BspError, Result};

/// Align an offset to a power-of-two boundary
pub const fn align_to_boundary(offset: usize, boundary: usize) -> usize {
    (offset + boundary - 1) & !(boundary - 1)
}

/// Bytes of padding needed to reach the next boundary
pub const fn calculate_padding(offset: usize, boundary: usize) -> usize {
    align_to_boundary(offset, boundary) - offset
}

/// Compare magic bytes against the expected pattern
pub fn validate_magic_bytes(actual: &[u8; 4], expected: &[u8; 4]) -> Result<()> {
    if actual != expected {
        return Err(BspError::Storage(format!(
            "bad magic bytes {actual:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

/// Read a little-endian u64 at `offset`
pub fn read_u64_le(bytes: &[u8], offset: usize) -> Result<u64> {
    let field = bytes
        .get(offset..offset + 8)
        .ok_or_else(|| BspError::Storage(format!("truncated u64 field at offset {offset}")))?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(field);
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian u32 at `offset`
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    let field = bytes
        .get(offset..offset + 4)
        .ok_or_else(|| BspError::Storage(format!("truncated u32 field at offset {offset}")))?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(field);
    Ok(u32::from_le_bytes(buf))
}

//! Array bounds validation for typed byte runs
//!
//! Pure arithmetic on lengths, no I/O.

use crate::{BspError, Result};

/// Validate that `byte_len` bytes hold a whole number of `T`
///
/// Returns the element count.
pub fn validate_array_bounds<T>(byte_len: usize) -> Result<usize> {
    let element_size = core::mem::size_of::<T>();

    if byte_len % element_size != 0 {
        return Err(BspError::Storage(format!(
            "byte length {byte_len} is not a multiple of element size {element_size}"
        )));
    }

    let count = byte_len / element_size;

    // Conservative overflow protection for downstream offset arithmetic
    if count > usize::MAX / 8 {
        return Err(BspError::Storage(format!("array of {count} elements is too large")));
    }

    Ok(count)
}

/// Validate that `offset..offset + len` lies inside a buffer of `total` bytes
pub fn validate_region(offset: u64, len: u64, total: usize) -> Result<core::ops::Range<usize>> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| BspError::Storage(format!("region {offset}+{len} overflows")))?;
    if end > total as u64 {
        return Err(BspError::Storage(format!(
            "region {offset}..{end} exceeds container size {total}"
        )));
    }
    Ok(offset as usize..end as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_array_bounds() {
        assert_eq!(validate_array_bounds::<u32>(16).unwrap(), 4);
        assert_eq!(validate_array_bounds::<u64>(24).unwrap(), 3);
        assert_eq!(validate_array_bounds::<u32>(0).unwrap(), 0);

        assert!(matches!(
            validate_array_bounds::<u32>(15),
            Err(BspError::Storage(_))
        ));
        assert!(validate_array_bounds::<u64>(23).is_err());
    }

    #[test]
    fn test_validate_region() {
        assert_eq!(validate_region(8, 16, 32).unwrap(), 8..24);
        assert_eq!(validate_region(32, 0, 32).unwrap(), 32..32);
        assert!(validate_region(24, 16, 32).is_err());
        assert!(validate_region(u64::MAX, 2, 32).is_err());
    }
}

//! In-memory matrix representations
//!
//! Every representation owns its backing arrays and validates the Binsparse
//! invariants on construction, so a value of these types is always
//! consistent with the metadata it would produce.

pub mod compressed;
pub mod coo;
pub mod dense;

pub use compressed::{CscMatrix, CsrMatrix};
pub use coo::CooMatrix;
pub use dense::{DenseMatrix, DenseVector, Order};

use crate::format::Structure;
use crate::traits::Index;
use crate::{BspError, Result};

/// Stored values must match the entry count, or be a single iso value
pub(crate) fn check_values_len(values_len: usize, expected: usize, iso: bool) -> Result<()> {
    if iso {
        if values_len != 1 {
            return Err(BspError::invalid(format!(
                "iso-valued matrix must store exactly 1 value, got {values_len}"
            )));
        }
    } else if values_len != expected {
        return Err(BspError::invalid(format!(
            "len(values) = {values_len} but number_of_stored_values = {expected}"
        )));
    }
    Ok(())
}

/// Non-general structures describe a triangle and need a square shape
pub(crate) fn check_structure(structure: Structure, nrows: usize, ncols: usize) -> Result<()> {
    if !structure.is_general() && nrows != ncols {
        return Err(BspError::invalid(format!(
            "structure {:?} requires a square matrix, got {nrows}x{ncols}",
            structure
        )));
    }
    Ok(())
}

/// Every index in `indices` must be below `bound`
pub(crate) fn check_indices<I: Index>(indices: &[I], bound: usize, field: &str) -> Result<()> {
    for (k, index) in indices.iter().enumerate() {
        match index.to_usize() {
            Some(i) if i < bound => {}
            _ => {
                return Err(BspError::invalid(format!(
                    "{field}[{k}] = {} is out of bounds for dimension {bound}",
                    index.to_i128()
                )))
            }
        }
    }
    Ok(())
}

/// Value stored at position `k`, honouring the iso flag
pub(crate) fn value_at<T: Copy>(values: &[T], iso: bool, k: usize) -> Option<T> {
    if iso {
        values.first().copied()
    } else {
        values.get(k).copied()
    }
}

//! Compressed sparse row and column representations
//!
//! CSR and CSC share one layout: a pointer array over the major axis
//! (`pointers_to_1`), minor-axis indices (`indices_1`) and values. They
//! differ only in which axis is major.

use super::{check_indices, check_structure, check_values_len, value_at};
use crate::format::{fields, FormatName, Structure};
use crate::traits::{Element, Index, Matrix};
use crate::{BspError, Result};

/// Shared storage for CSR and CSC
#[derive(Debug, Clone, PartialEq)]
struct Compressed<T, I> {
    major: usize,
    minor: usize,
    pointers: Vec<I>,
    indices: Vec<I>,
    values: Vec<T>,
    structure: Structure,
    iso: bool,
}

impl<T: Element, I: Index> Compressed<T, I> {
    fn new(
        major: usize,
        minor: usize,
        pointers: Vec<I>,
        indices: Vec<I>,
        values: Vec<T>,
        structure: Structure,
        iso: bool,
    ) -> Result<Self> {
        if pointers.len() != major + 1 {
            return Err(BspError::invalid(format!(
                "len(pointers_to_1) = {} but expected {}",
                pointers.len(),
                major + 1
            )));
        }
        if pointers[0].to_i128() != 0 {
            return Err(BspError::invalid(format!(
                "pointers_to_1[0] = {} but must be 0",
                pointers[0].to_i128()
            )));
        }
        if let Some(k) = pointers.windows(2).position(|w| w[0] > w[1]) {
            return Err(BspError::invalid(format!(
                "pointers_to_1 must be non-decreasing, but pointers_to_1[{}] > pointers_to_1[{}]",
                k,
                k + 1
            )));
        }
        let last = pointers[major].to_i128();
        if last != indices.len() as i128 {
            return Err(BspError::invalid(format!(
                "pointers_to_1[{major}] = {last} but number_of_stored_values = {}",
                indices.len()
            )));
        }
        check_values_len(values.len(), indices.len(), iso)?;
        check_indices(&indices, minor, fields::INDICES_1)?;

        Ok(Self {
            major,
            minor,
            pointers,
            indices,
            values,
            structure,
            iso,
        })
    }

    /// Position range of major slot `i`
    fn slot(&self, i: usize) -> Option<core::ops::Range<usize>> {
        let start = self.pointers.get(i)?.to_usize()?;
        let end = self.pointers.get(i + 1)?.to_usize()?;
        Some(start..end)
    }

    fn get(&self, major: usize, minor: usize) -> Option<T> {
        let range = self.slot(major)?;
        let k = range.clone().find(|&k| self.indices[k].to_usize() == Some(minor))?;
        value_at(&self.values, self.iso, k)
    }
}

macro_rules! compressed_matrix {
    ($(#[$doc:meta])* $name:ident, $format:expr, column_major: $column_major:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T, I> {
            inner: Compressed<T, I>,
        }

        impl<T: Element, I: Index> $name<T, I> {
            /// General, non-iso matrix from raw arrays
            pub fn new(
                nrows: usize,
                ncols: usize,
                pointers: Vec<I>,
                indices: Vec<I>,
                values: Vec<T>,
            ) -> Result<Self> {
                Self::from_parts(nrows, ncols, pointers, indices, values, Structure::General, false)
            }

            /// Iso-valued matrix: every stored entry holds `value`
            pub fn new_iso(
                nrows: usize,
                ncols: usize,
                pointers: Vec<I>,
                indices: Vec<I>,
                value: T,
            ) -> Result<Self> {
                Self::from_parts(nrows, ncols, pointers, indices, vec![value], Structure::General, true)
            }

            /// Fully specified constructor; validates every invariant
            pub fn from_parts(
                nrows: usize,
                ncols: usize,
                pointers: Vec<I>,
                indices: Vec<I>,
                values: Vec<T>,
                structure: Structure,
                iso: bool,
            ) -> Result<Self> {
                check_structure(structure, nrows, ncols)?;
                let (major, minor) = if $column_major { (ncols, nrows) } else { (nrows, ncols) };
                let inner =
                    Compressed::new(major, minor, pointers, indices, values, structure, iso)?;
                Ok(Self { inner })
            }

            pub fn with_structure(mut self, structure: Structure) -> Result<Self> {
                let (nrows, ncols) = self.dimensions();
                check_structure(structure, nrows, ncols)?;
                self.inner.structure = structure;
                Ok(self)
            }

            pub fn pointers(&self) -> &[I] {
                &self.inner.pointers
            }

            pub fn indices(&self) -> &[I] {
                &self.inner.indices
            }

            /// Stored values; a single element when iso-valued
            pub fn values(&self) -> &[T] {
                &self.inner.values
            }

            /// Minor indices and values of major slot `i`
            pub fn slot(&self, i: usize) -> Option<(&[I], Vec<T>)> {
                let range = self.inner.slot(i)?;
                let values = range
                    .clone()
                    .filter_map(|k| value_at(&self.inner.values, self.inner.iso, k))
                    .collect();
                Some((&self.inner.indices[range], values))
            }

            /// Consume the matrix, returning `(pointers, indices, values)`
            pub fn into_parts(self) -> (Vec<I>, Vec<I>, Vec<T>) {
                (self.inner.pointers, self.inner.indices, self.inner.values)
            }
        }

        impl<T: Element, I: Index> Matrix for $name<T, I> {
            type Element = T;

            fn format(&self) -> FormatName {
                $format
            }

            fn dimensions(&self) -> (usize, usize) {
                let (major, minor) = (self.inner.major, self.inner.minor);
                if $column_major {
                    (minor, major)
                } else {
                    (major, minor)
                }
            }

            fn number_of_stored_values(&self) -> usize {
                self.inner.indices.len()
            }

            fn structure(&self) -> Structure {
                self.inner.structure
            }

            fn is_iso(&self) -> bool {
                self.inner.iso
            }

            fn get(&self, row: usize, col: usize) -> Option<T> {
                if $column_major {
                    self.inner.get(col, row)
                } else {
                    self.inner.get(row, col)
                }
            }
        }
    };
}

compressed_matrix!(
    /// Compressed sparse row: one pointer slot per row, column indices
    CsrMatrix,
    FormatName::Csr,
    column_major: false
);

compressed_matrix!(
    /// Compressed sparse column: one pointer slot per column, row indices
    CscMatrix,
    FormatName::Csc,
    column_major: true
);

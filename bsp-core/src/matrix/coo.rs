//! Coordinate (COO) representation

use super::{check_indices, check_structure, check_values_len, value_at};
use crate::format::{fields, FormatName, Structure};
use crate::traits::{Element, Index, Matrix};
use crate::{BspError, Result};

/// Parallel row, column and value arrays
///
/// Entry order is whatever the caller supplied; [`CooMatrix::canonicalize`]
/// sorts row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix<T, I> {
    nrows: usize,
    ncols: usize,
    rows: Vec<I>,
    cols: Vec<I>,
    values: Vec<T>,
    structure: Structure,
    iso: bool,
}

impl<T: Element, I: Index> CooMatrix<T, I> {
    /// General, non-iso matrix from raw arrays
    pub fn new(nrows: usize, ncols: usize, rows: Vec<I>, cols: Vec<I>, values: Vec<T>) -> Result<Self> {
        Self::from_parts(nrows, ncols, rows, cols, values, Structure::General, false)
    }

    /// Iso-valued matrix: every listed coordinate holds `value`
    pub fn new_iso(nrows: usize, ncols: usize, rows: Vec<I>, cols: Vec<I>, value: T) -> Result<Self> {
        Self::from_parts(nrows, ncols, rows, cols, vec![value], Structure::General, true)
    }

    /// Fully specified constructor; validates every invariant
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        rows: Vec<I>,
        cols: Vec<I>,
        values: Vec<T>,
        structure: Structure,
        iso: bool,
    ) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(BspError::invalid(format!(
                "len(indices_0) = {} but len(indices_1) = {}",
                rows.len(),
                cols.len()
            )));
        }
        check_values_len(values.len(), rows.len(), iso)?;
        check_indices(&rows, nrows, fields::INDICES_0)?;
        check_indices(&cols, ncols, fields::INDICES_1)?;
        check_structure(structure, nrows, ncols)?;

        Ok(Self {
            nrows,
            ncols,
            rows,
            cols,
            values,
            structure,
            iso,
        })
    }

    /// Replace the structure tag, checking the shape allows it
    pub fn with_structure(mut self, structure: Structure) -> Result<Self> {
        check_structure(structure, self.nrows, self.ncols)?;
        self.structure = structure;
        Ok(self)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn rows(&self) -> &[I] {
        &self.rows
    }

    pub fn cols(&self) -> &[I] {
        &self.cols
    }

    /// Stored values; a single element when iso-valued
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Iterate `(row, col, value)` triplets in stored order
    pub fn iter(&self) -> impl Iterator<Item = (I, I, T)> + '_ {
        (0..self.rows.len()).filter_map(move |k| {
            value_at(&self.values, self.iso, k).map(|v| (self.rows[k], self.cols[k], v))
        })
    }

    /// Whether entries are sorted row-major with no repeated coordinate
    pub fn is_canonical(&self) -> bool {
        self.rows
            .iter()
            .zip(&self.cols)
            .zip(self.rows.iter().zip(&self.cols).skip(1))
            .all(|(a, b)| a < b)
    }

    /// Whether some coordinate appears more than once
    pub fn has_duplicates(&self) -> bool {
        let mut coords: Vec<(I, I)> = self.rows.iter().copied().zip(self.cols.iter().copied()).collect();
        coords.sort_unstable();
        coords.windows(2).any(|w| w[0] == w[1])
    }

    /// Sort entries by (row, col); ties keep their relative order
    pub fn canonicalize(&mut self) {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by_key(|&k| (self.rows[k], self.cols[k]));
        self.rows = order.iter().map(|&k| self.rows[k]).collect();
        self.cols = order.iter().map(|&k| self.cols[k]).collect();
        if !self.iso {
            self.values = order.iter().map(|&k| self.values[k]).collect();
        }
    }

    /// Consume the matrix, returning `(rows, cols, values)`
    pub fn into_parts(self) -> (Vec<I>, Vec<I>, Vec<T>) {
        (self.rows, self.cols, self.values)
    }
}

impl<T: Element, I: Index> Matrix for CooMatrix<T, I> {
    type Element = T;

    fn format(&self) -> FormatName {
        FormatName::Coo
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    fn number_of_stored_values(&self) -> usize {
        self.rows.len()
    }

    fn structure(&self) -> Structure {
        self.structure
    }

    fn is_iso(&self) -> bool {
        self.iso
    }

    fn get(&self, row: usize, col: usize) -> Option<T> {
        let k = self
            .rows
            .iter()
            .zip(&self.cols)
            .position(|(r, c)| r.to_usize() == Some(row) && c.to_usize() == Some(col))?;
        value_at(&self.values, self.iso, k)
    }
}

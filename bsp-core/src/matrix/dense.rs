//! Dense matrix and vector representations

use super::{check_structure, check_values_len};
use crate::format::{FormatName, Structure};
use crate::traits::{Element, Matrix};
use crate::{BspError, Result};

/// Storage order of a dense matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    RowMajor,
    ColumnMajor,
}

/// Dense matrix in row- or column-major order
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    nrows: usize,
    ncols: usize,
    order: Order,
    values: Vec<T>,
    structure: Structure,
    iso: bool,
}

fn element_count(nrows: usize, ncols: usize) -> Result<usize> {
    nrows
        .checked_mul(ncols)
        .ok_or_else(|| BspError::invalid(format!("shape {nrows}x{ncols} overflows")))
}

impl<T: Element> DenseMatrix<T> {
    pub fn new(nrows: usize, ncols: usize, order: Order, values: Vec<T>) -> Result<Self> {
        Self::from_parts(nrows, ncols, order, values, Structure::General, false)
    }

    /// Every entry equal to `value`, stored once
    pub fn new_iso(nrows: usize, ncols: usize, order: Order, value: T) -> Result<Self> {
        Self::from_parts(nrows, ncols, order, vec![value], Structure::General, true)
    }

    /// Fully specified constructor; validates every invariant
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        order: Order,
        values: Vec<T>,
        structure: Structure,
        iso: bool,
    ) -> Result<Self> {
        check_values_len(values.len(), element_count(nrows, ncols)?, iso)?;
        check_structure(structure, nrows, ncols)?;
        Ok(Self {
            nrows,
            ncols,
            order,
            values,
            structure,
            iso,
        })
    }

    pub fn with_structure(mut self, structure: Structure) -> Result<Self> {
        check_structure(structure, self.nrows, self.ncols)?;
        self.structure = structure;
        Ok(self)
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Stored values; a single element when iso-valued
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// All `nrows * ncols` values in storage order, expanding iso storage
    pub fn logical_values(&self) -> Vec<T> {
        if self.iso {
            vec![self.values[0]; self.nrows * self.ncols]
        } else {
            self.values.clone()
        }
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T: Element> Matrix for DenseMatrix<T> {
    type Element = T;

    fn format(&self) -> FormatName {
        match self.order {
            Order::RowMajor => FormatName::DenseRowMajor,
            Order::ColumnMajor => FormatName::DenseColMajor,
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    fn number_of_stored_values(&self) -> usize {
        self.nrows * self.ncols
    }

    fn structure(&self) -> Structure {
        self.structure
    }

    fn is_iso(&self) -> bool {
        self.iso
    }

    fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        if self.iso {
            return self.values.first().copied();
        }
        let k = match self.order {
            Order::RowMajor => row * self.ncols + col,
            Order::ColumnMajor => col * self.nrows + row,
        };
        self.values.get(k).copied()
    }
}

/// Dense one-dimensional vector
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVector<T> {
    len: usize,
    values: Vec<T>,
    iso: bool,
}

impl<T: Element> DenseVector<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            len: values.len(),
            values,
            iso: false,
        }
    }

    pub fn new_iso(len: usize, value: T) -> Self {
        Self {
            len,
            values: vec![value],
            iso: true,
        }
    }

    /// Validating constructor used when reading stored data
    pub fn from_parts(len: usize, values: Vec<T>, iso: bool) -> Result<Self> {
        check_values_len(values.len(), len, iso)?;
        Ok(Self { len, values, iso })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn logical_values(&self) -> Vec<T> {
        if self.iso {
            vec![self.values[0]; self.len]
        } else {
            self.values.clone()
        }
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T: Element> Matrix for DenseVector<T> {
    type Element = T;

    fn format(&self) -> FormatName {
        FormatName::DenseVector
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.len, 1)
    }

    fn number_of_stored_values(&self) -> usize {
        self.len
    }

    fn structure(&self) -> Structure {
        Structure::General
    }

    fn is_iso(&self) -> bool {
        self.iso
    }

    fn get(&self, row: usize, col: usize) -> Option<T> {
        if col != 0 || row >= self.len {
            return None;
        }
        if self.iso {
            self.values.first().copied()
        } else {
            self.values.get(row).copied()
        }
    }

    fn shape(&self) -> Vec<u64> {
        vec![self.len as u64]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders() {
        let values = vec![1, 2, 3, 4, 5, 6];
        let row = DenseMatrix::new(2, 3, Order::RowMajor, values.clone()).unwrap();
        let col = DenseMatrix::new(2, 3, Order::ColumnMajor, values).unwrap();
        assert_eq!(row.get(1, 0), Some(4));
        assert_eq!(col.get(1, 0), Some(2));
        assert_eq!(row.get(2, 0), None);
        assert_eq!(row.format().as_str(), "DMATR");
        assert_eq!(col.format().as_str(), "DMATC");
        assert_eq!(row.number_of_stored_values(), 6);
    }

    #[test]
    fn test_len_invariant() {
        let err = DenseMatrix::new(2, 2, Order::RowMajor, vec![1.0f32; 3]).unwrap_err();
        assert!(matches!(err, BspError::InvalidMatrix(ref m) if m.contains("len(values) = 3")));
        assert!(DenseMatrix::new(usize::MAX, 2, Order::RowMajor, vec![0u8]).is_err());
    }

    #[test]
    fn test_iso_dense() {
        let m = DenseMatrix::new_iso(2, 2, Order::RowMajor, 1.0f32).unwrap();
        assert_eq!(m.values().len(), 1);
        assert_eq!(m.number_of_stored_values(), 4);
        assert_eq!(m.logical_values(), vec![1.0; 4]);
        assert_eq!(m.get(1, 1), Some(1.0));
    }

    #[test]
    fn test_vector() {
        let v = DenseVector::new(vec![3i16, 4]);
        assert_eq!(v.shape(), vec![2]);
        assert_eq!(v.get(1, 0), Some(4));
        assert_eq!(v.get(1, 1), None);

        let iso = DenseVector::new_iso(3, false);
        assert_eq!(iso.logical_values(), vec![false; 3]);
        assert!(DenseVector::<u8>::from_parts(3, vec![1, 2], false).is_err());
    }
}

//! Capability shared by every matrix representation
//!
//! Each representation has a shape, a stored-value count, a structure tag
//! and an iso flag. Codecs are written against this trait, not against the
//! concrete types.

use super::element::Element;
use crate::format::{FormatName, Structure};

/// Core matrix trait for format-agnostic access
pub trait Matrix {
    /// The element type stored in this matrix
    type Element: Element;

    /// Canonical format of this representation
    fn format(&self) -> FormatName;

    /// Get matrix dimensions as (rows, cols); vectors report (len, 1)
    fn dimensions(&self) -> (usize, usize);

    /// Number of explicitly stored entries (logical count when iso-valued)
    fn number_of_stored_values(&self) -> usize;

    fn structure(&self) -> Structure;

    /// Whether a single stored value stands for every entry
    fn is_iso(&self) -> bool;

    /// Get an element at the specified position
    ///
    /// Returns `None` if nothing is stored there or the position is out of
    /// bounds.
    fn get(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Shape as written to metadata
    fn shape(&self) -> Vec<u64> {
        let (rows, cols) = self.dimensions();
        vec![rows as u64, cols as u64]
    }
}

/// Canonical format name of a representation
pub fn format_name<M: Matrix + ?Sized>(matrix: &M) -> &'static str {
    matrix.format().as_str()
}

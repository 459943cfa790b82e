//! Read a container without knowing its types in advance

use std::path::Path;

use bsp_core::{
    dispatch_kinds, dispatch_unified, BspError, CooMatrix, CscMatrix, CsrMatrix, DenseMatrix,
    DenseVector, Element, FormatMetadata, FormatName, Index, KindVisitor, Matrix, Result,
    StorageSource,
};

use super::{inspect, read_with_metadata};
use crate::storage::BspFile;

/// One stored entry, value rendered as text
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEntry {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

/// Descriptor plus the first few stored entries
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSummary {
    pub metadata: FormatMetadata,
    pub preview: Vec<PreviewEntry>,
}

/// Inspect `source` and read up to `limit` entries
///
/// The element and index types are discovered from the metadata. Sparse
/// formats are read with a single index type, the wider of the two stored
/// index kinds.
pub fn summarize<S: StorageSource + ?Sized>(source: &S, limit: usize) -> Result<MatrixSummary> {
    let metadata = inspect(source)?;
    let kinds = metadata.dispatch_kinds()?;
    let visitor = Preview {
        metadata: &metadata,
        source,
        limit,
    };
    let preview = match kinds.as_slice() {
        &[index_0, index_1, value] => dispatch_unified(index_0, index_1, value, visitor)?,
        _ => dispatch_kinds(&kinds, visitor)?,
    };
    Ok(MatrixSummary { metadata, preview })
}

/// [`summarize`] the matrix in `group` of a container file
pub fn summarize_path<P: AsRef<Path>>(
    path: P,
    group: Option<&str>,
    limit: usize,
) -> Result<MatrixSummary> {
    let file = BspFile::open(path)?;
    let view = file.group(group.unwrap_or(""))?;
    summarize(&view, limit)
}

struct Preview<'a, S: ?Sized> {
    metadata: &'a FormatMetadata,
    source: &'a S,
    limit: usize,
}

fn entry<T: Element>(row: usize, col: usize, value: T) -> PreviewEntry {
    PreviewEntry {
        row,
        col,
        value: format!("{value:?}"),
    }
}

fn to_usize<I: Index>(index: I) -> Result<usize> {
    index.to_usize().ok_or_else(|| match index.to_u64() {
        Some(value) => BspError::IndexOverflow {
            value,
            label: "usize",
        },
        None => BspError::InvalidMatrix(format!("negative index {}", index.to_i128())),
    })
}

impl<S: StorageSource + ?Sized> Preview<'_, S> {
    /// Walk a compressed matrix slot by slot
    fn compressed<I: Index, T: Element>(
        &self,
        major: usize,
        slot: impl Fn(usize) -> Option<(Vec<I>, Vec<T>)>,
        column_major: bool,
    ) -> Result<Vec<PreviewEntry>> {
        let mut out = Vec::new();
        for i in 0..major {
            let Some((indices, values)) = slot(i) else {
                continue;
            };
            for (j, value) in indices.into_iter().zip(values) {
                if out.len() == self.limit {
                    return Ok(out);
                }
                let j = to_usize(j)?;
                let (row, col) = if column_major { (j, i) } else { (i, j) };
                out.push(entry(row, col, value));
            }
        }
        Ok(out)
    }
}

impl<S: StorageSource + ?Sized> KindVisitor for Preview<'_, S> {
    type Output = Vec<PreviewEntry>;

    fn visit_values<T: Element>(self) -> Result<Self::Output> {
        match self.metadata.format {
            FormatName::DenseVector => {
                let vector: DenseVector<T> = read_with_metadata(self.metadata, self.source)?;
                Ok(vector
                    .logical_values()
                    .into_iter()
                    .take(self.limit)
                    .enumerate()
                    .map(|(i, value)| entry(i, 0, value))
                    .collect())
            }
            _ => {
                let matrix: DenseMatrix<T> = read_with_metadata(self.metadata, self.source)?;
                let (nrows, ncols) = matrix.dimensions();
                Ok((0..nrows)
                    .flat_map(|row| (0..ncols).map(move |col| (row, col)))
                    .filter_map(|(row, col)| matrix.get(row, col).map(|v| entry(row, col, v)))
                    .take(self.limit)
                    .collect())
            }
        }
    }

    fn visit_indexed<I: Index, T: Element>(self) -> Result<Self::Output> {
        match self.metadata.format {
            FormatName::Coo | FormatName::CooColMajor => {
                let matrix: CooMatrix<T, I> = read_with_metadata(self.metadata, self.source)?;
                matrix
                    .iter()
                    .take(self.limit)
                    .map(|(row, col, value)| Ok(entry(to_usize(row)?, to_usize(col)?, value)))
                    .collect()
            }
            FormatName::Csr => {
                let matrix: CsrMatrix<T, I> = read_with_metadata(self.metadata, self.source)?;
                let (nrows, _) = matrix.dimensions();
                self.compressed(
                    nrows,
                    |i| matrix.slot(i).map(|(idx, vals)| (idx.to_vec(), vals)),
                    false,
                )
            }
            FormatName::Csc => {
                let matrix: CscMatrix<T, I> = read_with_metadata(self.metadata, self.source)?;
                let (_, ncols) = matrix.dimensions();
                self.compressed(
                    ncols,
                    |i| matrix.slot(i).map(|(idx, vals)| (idx.to_vec(), vals)),
                    true,
                )
            }
            other => Err(BspError::UnsupportedType(format!(
                "{other} does not have index arrays"
            ))),
        }
    }
}

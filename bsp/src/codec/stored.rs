//! Mapping between representations and their stored arrays

use bsp_core::format::fields;
use bsp_core::{
    BspError, CooMatrix, CscMatrix, CsrMatrix, DenseMatrix, DenseVector, Element, FormatMetadata,
    FormatName, Index, Kind, Matrix, Order, Result, StorageSink, StorageSource, TypeLabel,
};
use tracing::trace;

use crate::config::CodecConfig;

/// A representation the codec knows how to persist and rebuild
pub trait StoredMatrix: Matrix + Sized {
    /// Format names accepted on read, for error messages
    const EXPECTED: &'static str;

    /// Whether stored data in `format` can be read as `Self`
    fn accepts(format: FormatName) -> bool;

    /// Index fields and their kinds, in dispatch order
    fn index_types() -> Vec<(&'static str, Kind)>;

    /// Write every backing array under its field name
    fn write_arrays<S: StorageSink>(&self, sink: &mut S, config: &CodecConfig) -> Result<()>;

    /// Rebuild from parsed metadata and the arrays in `source`
    fn read_arrays<S: StorageSource + ?Sized>(metadata: &FormatMetadata, source: &S)
        -> Result<Self>;

    /// Descriptor for this matrix
    fn metadata(&self) -> FormatMetadata {
        let value_label = TypeLabel {
            kind: <Self::Element as Element>::KIND,
            iso: self.is_iso(),
        };
        Self::index_types().into_iter().fold(
            FormatMetadata::new(
                self.format(),
                self.shape(),
                self.number_of_stored_values() as u64,
            )
            .with_structure(self.structure())
            .with_data_type(fields::VALUES, value_label),
            |metadata, (field, kind)| metadata.with_data_type(field, TypeLabel::new(kind)),
        )
    }
}

/// Read a value array whose kind must match `T` exactly
fn read_field<T: Element, S: StorageSource + ?Sized>(
    metadata: &FormatMetadata,
    source: &S,
    field: &str,
) -> Result<Vec<T>> {
    let declared = metadata.data_type(field)?.kind;
    if declared != T::KIND {
        return Err(BspError::TypeMismatch {
            field: field.to_string(),
            expected: T::KIND.label().to_string(),
            found: declared.label().to_string(),
        });
    }
    check_stored_kind(source, field, declared)?;
    source.read_dataset(field)?.into_vec(field)
}

/// Read an index array, widening narrower stored kinds into `I`
fn read_index_field<I: Index, S: StorageSource + ?Sized>(
    metadata: &FormatMetadata,
    source: &S,
    field: &str,
) -> Result<Vec<I>> {
    let declared = metadata.data_type(field)?.kind;
    if declared != I::KIND && !declared.widens_to(I::KIND) {
        return Err(BspError::TypeMismatch {
            field: field.to_string(),
            expected: I::KIND.label().to_string(),
            found: declared.label().to_string(),
        });
    }
    check_stored_kind(source, field, declared)?;
    source.read_dataset(field)?.into_index_vec(field)
}

fn check_stored_kind<S: StorageSource + ?Sized>(source: &S, field: &str, declared: Kind) -> Result<()> {
    let stored = source.dataset_kind(field)?;
    if stored != declared {
        return Err(BspError::Storage(format!(
            "dataset `{field}` holds {stored} but metadata declares {declared}"
        )));
    }
    trace!(field, kind = %stored, "reading field");
    Ok(())
}

fn dimension(value: u64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| BspError::InvalidMatrix(format!("dimension {value} does not fit in memory")))
}

fn check_count(metadata: &FormatMetadata, actual: usize) -> Result<()> {
    if metadata.number_of_stored_values != actual as u64 {
        return Err(BspError::InvalidMatrix(format!(
            "number_of_stored_values = {} but {actual} entries are stored",
            metadata.number_of_stored_values
        )));
    }
    Ok(())
}

fn duplicate(row: i128, col: i128) -> BspError {
    BspError::InvalidMatrix(format!("duplicate coordinate ({row}, {col})"))
}

/// First repeated coordinate of a row-major sorted entry list
fn find_duplicate<I: Index>(rows: &[I], cols: &[I]) -> Option<(i128, i128)> {
    (1..rows.len())
        .find(|&k| rows[k] == rows[k - 1] && cols[k] == cols[k - 1])
        .map(|k| (rows[k].to_i128(), cols[k].to_i128()))
}

impl<T: Element, I: Index> StoredMatrix for CooMatrix<T, I> {
    const EXPECTED: &'static str = "COO or COOC";

    /// Column-major COO is read as-is; its entries keep their stored order
    fn accepts(format: FormatName) -> bool {
        format.is_coo()
    }

    fn index_types() -> Vec<(&'static str, Kind)> {
        vec![(fields::INDICES_0, I::KIND), (fields::INDICES_1, I::KIND)]
    }

    fn write_arrays<S: StorageSink>(&self, sink: &mut S, config: &CodecConfig) -> Result<()> {
        let sorted;
        let matrix = if self.is_canonical() {
            self
        } else if config.canonicalize_coo {
            let mut copy = self.clone();
            copy.canonicalize();
            sorted = copy;
            &sorted
        } else {
            let mut copy = self.clone();
            copy.canonicalize();
            if let Some((row, col)) = find_duplicate(copy.rows(), copy.cols()) {
                return Err(duplicate(row, col));
            }
            return Err(BspError::InvalidMatrix(
                "COO entries are not sorted by (row, col)".into(),
            ));
        };
        if let Some((row, col)) = find_duplicate(matrix.rows(), matrix.cols()) {
            return Err(duplicate(row, col));
        }

        sink.write_array(fields::INDICES_0, matrix.rows().to_vec())?;
        sink.write_array(fields::INDICES_1, matrix.cols().to_vec())?;
        sink.write_array(fields::VALUES, matrix.values().to_vec())
    }

    fn read_arrays<S: StorageSource + ?Sized>(
        metadata: &FormatMetadata,
        source: &S,
    ) -> Result<Self> {
        let rows: Vec<I> = read_index_field(metadata, source, fields::INDICES_0)?;
        let cols: Vec<I> = read_index_field(metadata, source, fields::INDICES_1)?;
        let values: Vec<T> = read_field(metadata, source, fields::VALUES)?;
        check_count(metadata, rows.len())?;
        CooMatrix::from_parts(
            dimension(metadata.nrows())?,
            dimension(metadata.ncols())?,
            rows,
            cols,
            values,
            metadata.structure,
            metadata.is_iso(),
        )
    }
}

macro_rules! stored_compressed {
    ($name:ident, $format:expr, $expected:literal, column_major: $column_major:expr) => {
        impl<T: Element, I: Index> StoredMatrix for $name<T, I> {
            const EXPECTED: &'static str = $expected;

            fn accepts(format: FormatName) -> bool {
                format == $format
            }

            fn index_types() -> Vec<(&'static str, Kind)> {
                vec![(fields::POINTERS_TO_1, I::KIND), (fields::INDICES_1, I::KIND)]
            }

            fn write_arrays<S: StorageSink>(&self, sink: &mut S, _config: &CodecConfig) -> Result<()> {
                let major = self.pointers().len() - 1;
                for i in 0..major {
                    if let Some((indices, _)) = self.slot(i) {
                        let mut minor = indices.to_vec();
                        minor.sort_unstable();
                        if let Some(w) = minor.windows(2).find(|w| w[0] == w[1]) {
                            let (i, j) = (i as i128, w[0].to_i128());
                            let (row, col) = if $column_major { (j, i) } else { (i, j) };
                            return Err(duplicate(row, col));
                        }
                    }
                }

                sink.write_array(fields::POINTERS_TO_1, self.pointers().to_vec())?;
                sink.write_array(fields::INDICES_1, self.indices().to_vec())?;
                sink.write_array(fields::VALUES, self.values().to_vec())
            }

            fn read_arrays<S: StorageSource + ?Sized>(
                metadata: &FormatMetadata,
                source: &S,
            ) -> Result<Self> {
                let pointers: Vec<I> = read_index_field(metadata, source, fields::POINTERS_TO_1)?;
                let indices: Vec<I> = read_index_field(metadata, source, fields::INDICES_1)?;
                let values: Vec<T> = read_field(metadata, source, fields::VALUES)?;
                check_count(metadata, indices.len())?;
                Self::from_parts(
                    dimension(metadata.nrows())?,
                    dimension(metadata.ncols())?,
                    pointers,
                    indices,
                    values,
                    metadata.structure,
                    metadata.is_iso(),
                )
            }
        }
    };
}

stored_compressed!(CsrMatrix, FormatName::Csr, "CSR", column_major: false);
stored_compressed!(CscMatrix, FormatName::Csc, "CSC", column_major: true);

impl<T: Element> StoredMatrix for DenseMatrix<T> {
    const EXPECTED: &'static str = "DMATR or DMATC";

    fn accepts(format: FormatName) -> bool {
        matches!(format, FormatName::DenseRowMajor | FormatName::DenseColMajor)
    }

    fn index_types() -> Vec<(&'static str, Kind)> {
        Vec::new()
    }

    fn write_arrays<S: StorageSink>(&self, sink: &mut S, _config: &CodecConfig) -> Result<()> {
        sink.write_array(fields::VALUES, self.values().to_vec())
    }

    fn read_arrays<S: StorageSource + ?Sized>(
        metadata: &FormatMetadata,
        source: &S,
    ) -> Result<Self> {
        let values: Vec<T> = read_field(metadata, source, fields::VALUES)?;
        let nrows = dimension(metadata.nrows())?;
        let ncols = dimension(metadata.ncols())?;
        check_count(metadata, nrows.saturating_mul(ncols))?;
        let order = match metadata.format {
            FormatName::DenseColMajor => Order::ColumnMajor,
            _ => Order::RowMajor,
        };
        DenseMatrix::from_parts(
            nrows,
            ncols,
            order,
            values,
            metadata.structure,
            metadata.is_iso(),
        )
    }
}

impl<T: Element> StoredMatrix for DenseVector<T> {
    const EXPECTED: &'static str = "DVEC";

    fn accepts(format: FormatName) -> bool {
        format == FormatName::DenseVector
    }

    fn index_types() -> Vec<(&'static str, Kind)> {
        Vec::new()
    }

    fn write_arrays<S: StorageSink>(&self, sink: &mut S, _config: &CodecConfig) -> Result<()> {
        sink.write_array(fields::VALUES, self.values().to_vec())
    }

    fn read_arrays<S: StorageSource + ?Sized>(
        metadata: &FormatMetadata,
        source: &S,
    ) -> Result<Self> {
        let values: Vec<T> = read_field(metadata, source, fields::VALUES)?;
        let len = dimension(metadata.nrows())?;
        check_count(metadata, len)?;
        DenseVector::from_parts(len, values, metadata.is_iso())
    }
}

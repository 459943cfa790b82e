//! Matrix Market to Binsparse conversion
//!
//! The value kind comes from the banner's field and the index kind is the
//! narrowest unsigned kind that can hold every row, column and pointer
//! value. Both are chosen at runtime and dispatched to the typed readers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bsp_core::{
    dispatch_kinds, BspError, DenseVector, Element, FormatMetadata, Index, Kind, KindVisitor,
    Result,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::codec::write_to_path;
use crate::config::{CodecConfig, MatrixMarketOptions};
use crate::matrix_market::{
    assemble_coo, assemble_csr, read_array, read_entries, read_info_path, Layout, MatrixMarketInfo,
    Symmetry,
};

/// Sparse representation written for coordinate files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    #[default]
    Coo,
    Csr,
}

impl std::str::FromStr for TargetFormat {
    type Err = BspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "COO" | "COOR" => Ok(TargetFormat::Coo),
            "CSR" => Ok(TargetFormat::Csr),
            _ => Err(BspError::UnsupportedMatrixMarketFormat(format!(
                "cannot convert to `{s}`, expected COO or CSR"
            ))),
        }
    }
}

/// Options for [`convert_matrix_market`]
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub target: TargetFormat,
    pub codec: CodecConfig,
    pub matrix_market: MatrixMarketOptions,
}

impl ConvertOptions {
    pub fn with_target(mut self, target: TargetFormat) -> Self {
        self.target = target;
        self
    }

    /// Write into the named group of the output container
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.codec = self.codec.with_group(group);
        self
    }

    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_matrix_market(mut self, options: MatrixMarketOptions) -> Self {
        self.matrix_market = options;
        self
    }
}

/// Narrowest index kind for the rows, columns and stored entries of a file
pub fn index_kind_for(info: &MatrixMarketInfo) -> Kind {
    let stored = if info.banner.symmetry == Symmetry::Symmetric {
        info.nnz.saturating_mul(2)
    } else {
        info.nnz
    };
    let max = info.nrows.max(info.ncols).max(stored);
    Kind::smallest_index_for(max as u64)
}

/// Convert the Matrix Market file at `input` into a container at `output`
///
/// The file's comment block is stored under the user key `comment`.
/// Coordinate files become COO or CSR per `options.target`; single-column
/// array files become a dense vector.
pub fn convert_matrix_market<P, Q>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<FormatMetadata>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input, output) = (input.as_ref(), output.as_ref());
    let info = read_info_path(input)?;
    let value_kind = info.banner.field.value_kind()?;

    let mut user_keys = Map::new();
    user_keys.insert("comment".to_string(), Value::String(info.comment.clone()));

    let converter = Converter {
        input,
        output,
        options,
        user_keys,
    };
    let metadata = match info.banner.layout {
        Layout::Coordinate => {
            let index_kind = index_kind_for(&info);
            debug!(%index_kind, %value_kind, "dispatching coordinate conversion");
            dispatch_kinds(&[index_kind, value_kind], converter)?
        }
        Layout::Array => dispatch_kinds(&[value_kind], converter)?,
    };

    info!(
        input = %input.display(),
        output = %output.display(),
        format = %metadata.format,
        nnz = metadata.number_of_stored_values,
        "converted Matrix Market file"
    );
    Ok(metadata)
}

struct Converter<'a> {
    input: &'a Path,
    output: &'a Path,
    options: &'a ConvertOptions,
    user_keys: Map<String, Value>,
}

impl Converter<'_> {
    fn open(&self) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(self.input)?))
    }
}

impl KindVisitor for Converter<'_> {
    type Output = FormatMetadata;

    fn visit_values<T: Element>(self) -> Result<FormatMetadata> {
        let (_, values) = read_array::<T, _>(self.open()?)?;
        let vector = DenseVector::new(values);
        write_to_path(self.output, &vector, self.user_keys, &self.options.codec)
    }

    fn visit_indexed<I: Index, T: Element>(self) -> Result<FormatMetadata> {
        let (info, entries) = read_entries::<T, _>(self.open()?, &self.options.matrix_market)?;
        match self.options.target {
            TargetFormat::Coo => {
                let matrix = assemble_coo::<T, I>(info.nrows, info.ncols, entries)?;
                write_to_path(self.output, &matrix, self.user_keys, &self.options.codec)
            }
            TargetFormat::Csr => {
                let matrix = assemble_csr::<T, I>(info.nrows, info.ncols, entries)?;
                write_to_path(self.output, &matrix, self.user_keys, &self.options.codec)
            }
        }
    }
}

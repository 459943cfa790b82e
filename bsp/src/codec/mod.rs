//! Read and write orchestration
//!
//! The codec builds a [`FormatMetadata`] for a representation, writes its
//! arrays through a [`StorageSink`] and attaches the JSON descriptor as the
//! `binsparse` attribute. Reading reverses this against a
//! [`StorageSource`]. The `*_path` helpers run the same protocol against a
//! [`BspFile`] on disk.

mod stored;
mod summary;

pub use stored::StoredMatrix;
pub use summary::{summarize, summarize_path, MatrixSummary, PreviewEntry};

use std::path::Path;

use bsp_core::format::constants::BINSPARSE_KEY;
use bsp_core::{BspError, FormatMetadata, Result, StorageSink, StorageSource};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::CodecConfig;
use crate::storage::{BspFile, Group};

/// Write `matrix` and its descriptor into `sink`
///
/// `user_keys` are merged into the top level of the metadata document; the
/// reserved `binsparse` key is rejected. Nothing is written if the
/// descriptor cannot be built.
pub fn write_matrix<S, M>(
    sink: &mut S,
    matrix: &M,
    user_keys: Map<String, Value>,
    config: &CodecConfig,
) -> Result<FormatMetadata>
where
    S: StorageSink,
    M: StoredMatrix,
{
    let metadata = matrix.metadata().with_user_keys(user_keys)?;
    let document = metadata.to_json(config.pretty_metadata)?;

    debug!(
        format = %metadata.format,
        nnz = metadata.number_of_stored_values,
        "writing matrix"
    );
    matrix.write_arrays(sink, config)?;
    sink.set_attribute(BINSPARSE_KEY, &document)?;
    Ok(metadata)
}

/// Parse the descriptor without touching any array
pub fn inspect<S: StorageSource + ?Sized>(source: &S) -> Result<FormatMetadata> {
    let document = source.attribute(BINSPARSE_KEY)?;
    let metadata = FormatMetadata::parse(&document)?;
    debug!(format = %metadata.format, shape = ?metadata.shape, "parsed metadata");
    Ok(metadata)
}

/// Read a matrix of a statically known representation
///
/// Fails with [`BspError::FormatMismatch`] if the stored format is not one
/// `M` can hold and with [`BspError::TypeMismatch`] if the stored kinds do
/// not fit `M`'s element and index types.
pub fn read_matrix<M, S>(source: &S) -> Result<M>
where
    M: StoredMatrix,
    S: StorageSource + ?Sized,
{
    let metadata = inspect(source)?;
    read_with_metadata(&metadata, source)
}

/// Like [`read_matrix`] with metadata already parsed
pub fn read_with_metadata<M, S>(metadata: &FormatMetadata, source: &S) -> Result<M>
where
    M: StoredMatrix,
    S: StorageSource + ?Sized,
{
    if !M::accepts(metadata.format) {
        return Err(BspError::FormatMismatch {
            expected: M::EXPECTED.to_string(),
            found: metadata.format.as_str().to_string(),
        });
    }
    M::read_arrays(metadata, source)
}

/// Write `matrix` to a container file
///
/// Without a group the file is replaced by a container holding only this
/// matrix. With `config.group` set, the matrix goes into a new group of the
/// existing container (created if missing); an existing group of that name
/// is an error.
pub fn write_to_path<P, M>(
    path: P,
    matrix: &M,
    user_keys: Map<String, Value>,
    config: &CodecConfig,
) -> Result<FormatMetadata>
where
    P: AsRef<Path>,
    M: StoredMatrix,
{
    let path = path.as_ref();
    match config.group.as_deref() {
        None => {
            let mut root = Group::new();
            let metadata = write_matrix(&mut root, matrix, user_keys, config)?;
            BspFile::save(path, &root)?;
            Ok(metadata)
        }
        Some(group) => BspFile::update(path, |root| {
            let target = root.create_group(group)?;
            write_matrix(target, matrix, user_keys, config)
        }),
    }
}

/// Read a matrix from `group` of a container file (`None` for the root)
pub fn read_from_path<M, P>(path: P, group: Option<&str>) -> Result<M>
where
    M: StoredMatrix,
    P: AsRef<Path>,
{
    let file = BspFile::open(path)?;
    let view = file.group(group.unwrap_or(""))?;
    read_matrix(&view)
}

/// Parse the descriptor of `group` in a container file
pub fn inspect_path<P: AsRef<Path>>(path: P, group: Option<&str>) -> Result<FormatMetadata> {
    let file = BspFile::open(path)?;
    let view = file.group(group.unwrap_or(""))?;
    inspect(&view)
}

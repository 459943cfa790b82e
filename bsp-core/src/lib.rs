//! bsp-core - Binsparse format definitions
//!
//! This crate provides the pure, I/O-free half of Binsparse: the type
//! registry, the metadata descriptor, the in-memory matrix representations,
//! the binary container layout and the storage traits that the I/O crate
//! implements.

pub mod error;
pub mod format;
pub mod matrix;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::{BspError, ErrorCategory, Result};
pub use format::{fields, resolve_alias, FormatMetadata, FormatName, Structure};
pub use matrix::{CooMatrix, CscMatrix, CsrMatrix, DenseMatrix, DenseVector, Order};
pub use traits::{format_name, Element, Index, Matrix, StorageSink, StorageSource};
pub use types::{
    dispatch, dispatch_kinds, dispatch_unified, ArrayData, Kind, KindVisitor, TypeLabel,
};

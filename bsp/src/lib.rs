//! bsp - Binsparse containers, codec and Matrix Market ingestion
//!
//! This crate provides the I/O half of Binsparse on top of the format
//! definitions in `bsp-core`.
//!
//! ## Architecture
//!
//! - **bsp-core**: type registry, metadata descriptor, matrix
//!   representations, container layout and validation (no I/O)
//! - **bsp**: storage backends, the read/write codec, Matrix Market
//!   ingestion and the conversion pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bsp::{read_from_path, write_to_path, CodecConfig, CooMatrix, Matrix};
//!
//! fn example() -> bsp::Result<()> {
//!     let matrix = CooMatrix::new(3, 3, vec![0u32, 2], vec![1u32, 0], vec![1.5f64, -2.0])?;
//!     write_to_path("matrix.bsp", &matrix, Default::default(), &CodecConfig::default())?;
//!
//!     let back: CooMatrix<f64, u64> = read_from_path("matrix.bsp", None)?;
//!     assert_eq!(back.get(0, 1), Some(1.5));
//!     Ok(())
//! }
//! ```
//!
//! Containers of unknown type are discovered with [`inspect_path`] and read
//! with [`dispatch`] or [`summarize_path`].

pub use bsp_core::{
    dispatch, dispatch_kinds, dispatch_unified, fields, format_name, resolve_alias, ArrayData,
    BspError, CooMatrix, CscMatrix, CsrMatrix, DenseMatrix, DenseVector, Element, ErrorCategory,
    FormatMetadata, FormatName, Index, Kind, KindVisitor, Matrix, Order, Result, StorageSink,
    StorageSource, Structure, TypeLabel,
};

pub mod codec;
pub mod config;
pub mod convert;
pub mod matrix_market;
pub mod storage;

pub use codec::{
    inspect, inspect_path, read_from_path, read_matrix, read_with_metadata, summarize,
    summarize_path, write_matrix, write_to_path, MatrixSummary, PreviewEntry, StoredMatrix,
};
pub use config::{CodecConfig, MatrixMarketOptions};
pub use convert::{convert_matrix_market, ConvertOptions, TargetFormat};
pub use storage::{BspFile, Group, GroupView};

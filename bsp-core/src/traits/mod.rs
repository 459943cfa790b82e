//! Abstract interfaces
//!
//! Element constraints, the matrix capability set and the storage seams.

pub mod backend;
pub mod element;
pub mod matrix;

pub use backend::{StorageSink, StorageSource};
pub use element::{Element, Index};
pub use matrix::{format_name, Matrix};

//! Storage backend traits
//!
//! The codec talks to storage only through these two traits: a source that
//! yields typed one-dimensional datasets and string attributes, and a sink
//! that accepts them. Implementations decide how bytes are laid out.

use super::element::Element;
use crate::types::{ArrayData, Kind};
use crate::Result;

/// Read side of a hierarchical key/array store, scoped to one group
pub trait StorageSource {
    /// Read a whole dataset
    fn read_dataset(&self, name: &str) -> Result<ArrayData>;

    /// Element kind of a dataset without reading its contents
    fn dataset_kind(&self, name: &str) -> Result<Kind>;

    /// Element count of a dataset without reading its contents
    fn dataset_len(&self, name: &str) -> Result<usize>;

    fn has_dataset(&self, name: &str) -> bool;

    /// Get a string attribute
    fn attribute(&self, name: &str) -> Result<String>;

    /// Names of the datasets in this group, sorted
    fn dataset_names(&self) -> Vec<String>;
}

/// Write side of a hierarchical key/array store, scoped to one group
pub trait StorageSink {
    /// Create or replace a dataset
    fn write_dataset(&mut self, name: &str, data: ArrayData) -> Result<()>;

    /// Create or replace a string attribute
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()>;

    /// Typed convenience over [`StorageSink::write_dataset`]
    fn write_array<T: Element>(&mut self, name: &str, values: Vec<T>) -> Result<()>
    where
        Self: Sized,
    {
        self.write_dataset(name, T::into_array(values))
    }
}

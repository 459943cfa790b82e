//! Storage backends
//!
//! [`Group`] is the in-memory tree the codec writes into; [`BspFile`]
//! persists such a tree as a single file and reads it back lazily through
//! [`GroupView`].

mod file;
mod memory;

pub use file::{BspFile, GroupView};
pub use memory::Group;

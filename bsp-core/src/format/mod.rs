//! Format model: metadata descriptor, names and container layout
//!
//! Pure data structure definitions and their validation. No I/O.

pub mod constants;
pub mod header;
pub mod metadata;
pub mod names;

pub use constants::fields;
pub use header::{ContainerHeader, EntryRecord, EntryType};
pub use metadata::FormatMetadata;
pub use names::{resolve_alias, FormatName, Structure};

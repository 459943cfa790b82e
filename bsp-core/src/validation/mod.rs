//! Validation utilities
//!
//! Pure functions with no I/O dependencies: array length arithmetic,
//! container layout and short textual fields.

pub mod bounds;
pub mod format;
pub mod parsing;

pub use bounds::{validate_array_bounds, validate_region};
pub use format::{align_to_boundary, calculate_padding, read_u32_le, read_u64_le, validate_magic_bytes};
pub use parsing::{parse_version, split_path, validate_name};

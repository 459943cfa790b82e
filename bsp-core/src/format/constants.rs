//! Format constants for Binsparse metadata and the binary container

/// Top-level JSON key holding the format descriptor
pub const BINSPARSE_KEY: &str = "binsparse";

/// Version written by this crate
pub const VERSION: &str = "0.1";

/// Oldest version this crate reads
pub const MIN_VERSION: (u8, u8, u8) = (0, 1, 0);

/// Default alignment boundary for container payloads
pub const ALIGNMENT_BOUNDARY: usize = 8;

/// Field names used as dataset names and `data_types` keys
pub mod fields {
    pub const VALUES: &str = "values";
    pub const INDICES_0: &str = "indices_0";
    pub const INDICES_1: &str = "indices_1";
    pub const POINTERS_TO_1: &str = "pointers_to_1";
}

/// Binary container constants
pub mod container {
    /// Magic bytes at the start of a container file
    pub const MAGIC: [u8; 4] = *b"BSPF";

    /// Current container layout version
    pub const VERSION: u8 = 1;

    /// Fixed size of the container header
    pub const HEADER_SIZE: usize = 32;

    /// Fixed prefix of an entry record, before the path bytes
    pub const ENTRY_PREFIX_SIZE: usize = 32;
}

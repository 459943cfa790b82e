//! Error types for Binsparse operations

use thiserror::Error;

/// Errors that can occur while encoding, decoding or validating Binsparse data
#[derive(Debug, Error)]
pub enum BspError {
    /// Matrix Market banner or size line does not follow the grammar
    #[error("malformed Matrix Market header: {0}")]
    MalformedHeader(String),

    /// Text (JSON metadata or Matrix Market entries) could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// A type label is not one of the registered labels
    #[error("unknown type label `{0}`")]
    UnknownLabel(String),

    /// A recognised type cannot be used here (complex values, float indices, ...)
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A structure name is not supported by this operation
    #[error("unsupported structure `{0}`")]
    UnsupportedStructure(String),

    /// Matrix Market layout this pipeline does not ingest
    #[error("unsupported Matrix Market format: {0}")]
    UnsupportedMatrixMarketFormat(String),

    /// An entry lies outside the declared shape
    #[error("entry ({row}, {col}) out of bounds for shape {nrows}x{ncols}")]
    OutOfBounds {
        row: u64,
        col: u64,
        nrows: u64,
        ncols: u64,
    },

    /// More entries than the size line declared
    #[error("more entries than the declared {declared}")]
    TooManyEntries { declared: u64 },

    /// Fewer entries than the size line declared
    #[error("expected {declared} entries, found {found}")]
    TooFewEntries { declared: u64, found: u64 },

    /// Array lengths, pointers or indices violate a representation invariant
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),

    /// A value does not fit in the requested index kind
    #[error("value {value} does not fit index type {label}")]
    IndexOverflow { value: u64, label: &'static str },

    /// Stored format differs from the requested representation
    #[error("format mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: String, found: String },

    /// Stored element kind differs from the requested one
    #[error("type mismatch for `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// User metadata tried to use the reserved top-level key
    #[error("user key `{0}` collides with a reserved key")]
    ReservedKey(String),

    /// Storage backend structural failure (missing dataset, corrupt container)
    #[error("storage error: {0}")]
    Storage(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse grouping of errors, useful for callers deciding how to report them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input does not conform to a grammar or a declared capability
    Input,
    /// Declared metadata is inconsistent with the actual data
    Consistency,
    /// The caller's expectation disagrees with what storage holds
    Expectation,
    /// Backend or I/O failure
    Storage,
}

impl BspError {
    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            BspError::MalformedHeader(_)
            | BspError::Parse(_)
            | BspError::UnknownLabel(_)
            | BspError::UnsupportedType(_)
            | BspError::UnsupportedStructure(_)
            | BspError::UnsupportedMatrixMarketFormat(_) => ErrorCategory::Input,
            BspError::OutOfBounds { .. }
            | BspError::TooManyEntries { .. }
            | BspError::TooFewEntries { .. }
            | BspError::InvalidMatrix(_)
            | BspError::IndexOverflow { .. } => ErrorCategory::Consistency,
            BspError::FormatMismatch { .. }
            | BspError::TypeMismatch { .. }
            | BspError::ReservedKey(_) => ErrorCategory::Expectation,
            BspError::Storage(_) | BspError::Io(_) => ErrorCategory::Storage,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BspError::InvalidMatrix(msg.into())
    }
}

/// Result type for Binsparse operations
pub type Result<T> = core::result::Result<T, BspError>;

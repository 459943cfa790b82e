//! Format names, legacy aliases and structure tags

use super::constants::fields;
use crate::{BspError, Result};

/// Legacy spellings and their canonical replacements
const ALIASES: [(&str, &str); 2] = [("DMAT", "DMATR"), ("COO", "COOR")];

/// Resolve a legacy format name; unknown names pass through unchanged
pub fn resolve_alias(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |&(_, canonical)| canonical)
}

/// Storage formats a descriptor can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatName {
    /// Coordinate: parallel row, column and value arrays, sorted row-major
    Coo,
    /// Coordinate with entries sorted column-major; same arrays as `Coo`
    CooColMajor,
    /// Compressed sparse row
    Csr,
    /// Compressed sparse column
    Csc,
    /// Dense, row-major
    DenseRowMajor,
    /// Dense, column-major
    DenseColMajor,
    /// Dense vector
    DenseVector,
}

impl FormatName {
    /// Name written to metadata
    pub const fn as_str(self) -> &'static str {
        match self {
            FormatName::Coo => "COO",
            FormatName::CooColMajor => "COOC",
            FormatName::Csr => "CSR",
            FormatName::Csc => "CSC",
            FormatName::DenseRowMajor => "DMATR",
            FormatName::DenseColMajor => "DMATC",
            FormatName::DenseVector => "DVEC",
        }
    }

    /// Parse a format name, resolving aliases first
    pub fn from_name(name: &str) -> Result<Self> {
        match resolve_alias(name) {
            "COOR" => Ok(FormatName::Coo),
            "COOC" => Ok(FormatName::CooColMajor),
            "CSR" => Ok(FormatName::Csr),
            "CSC" => Ok(FormatName::Csc),
            "DMATR" => Ok(FormatName::DenseRowMajor),
            "DMATC" => Ok(FormatName::DenseColMajor),
            "DVEC" => Ok(FormatName::DenseVector),
            other => Err(BspError::Parse(format!("unknown format `{other}`"))),
        }
    }

    /// Number of entries in `shape`
    pub const fn rank(self) -> usize {
        match self {
            FormatName::DenseVector => 1,
            _ => 2,
        }
    }

    /// Fields this format stores, in dispatch order (indices first, values last)
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            FormatName::Coo | FormatName::CooColMajor => {
                &[fields::INDICES_0, fields::INDICES_1, fields::VALUES]
            }
            FormatName::Csr | FormatName::Csc => {
                &[fields::POINTERS_TO_1, fields::INDICES_1, fields::VALUES]
            }
            FormatName::DenseRowMajor | FormatName::DenseColMajor | FormatName::DenseVector => {
                &[fields::VALUES]
            }
        }
    }

    /// Either coordinate ordering
    pub const fn is_coo(self) -> bool {
        matches!(self, FormatName::Coo | FormatName::CooColMajor)
    }

    pub const fn is_dense(self) -> bool {
        matches!(
            self,
            FormatName::DenseRowMajor | FormatName::DenseColMajor | FormatName::DenseVector
        )
    }
}

impl core::fmt::Display for FormatName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for FormatName {
    type Err = BspError;

    fn from_str(s: &str) -> Result<Self> {
        FormatName::from_name(s)
    }
}

/// Declared symmetry class
///
/// Non-general structures mean only the lower triangle is stored. The codec
/// round-trips the tag and never reconstructs the other half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Structure {
    #[default]
    General,
    Symmetric,
    SkewSymmetric,
    Hermitian,
}

impl Structure {
    /// Metadata name; `None` for general, which is never written
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Structure::General => None,
            Structure::Symmetric => Some("symmetric_lower"),
            Structure::SkewSymmetric => Some("skew_symmetric_lower"),
            Structure::Hermitian => Some("hermitian"),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "general" => Ok(Structure::General),
            "symmetric_lower" => Ok(Structure::Symmetric),
            "skew_symmetric_lower" => Ok(Structure::SkewSymmetric),
            "hermitian" => Ok(Structure::Hermitian),
            other => Err(BspError::UnsupportedStructure(other.to_string())),
        }
    }

    pub const fn is_general(self) -> bool {
        matches!(self, Structure::General)
    }
}

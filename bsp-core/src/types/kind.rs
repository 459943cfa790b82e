//! Primitive element kinds and their canonical labels
//!
//! Every array persisted in a Binsparse container holds one of these kinds.
//! The label table is the only place where kinds are spelled as strings.

use crate::{BspError, Result};

/// Primitive numeric kinds supported for values and indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Kind {
    /// 8-bit unsigned integer
    Uint8 = 0,
    /// 16-bit unsigned integer
    Uint16 = 1,
    /// 32-bit unsigned integer
    Uint32 = 2,
    /// 64-bit unsigned integer
    Uint64 = 3,
    /// 8-bit signed integer
    Int8 = 4,
    /// 16-bit signed integer
    Int16 = 5,
    /// 32-bit signed integer
    Int32 = 6,
    /// 64-bit signed integer
    Int64 = 7,
    /// 32-bit floating point
    Float32 = 8,
    /// 64-bit floating point
    Float64 = 9,
    /// Boolean stored as one byte
    Bint8 = 10,
}

/// Labels reserved for complex values; recognised but not implemented
const COMPLEX_LABELS: [&str; 2] = ["complex[float32]", "complex[float64]"];

impl Kind {
    /// Every supported kind, in tag order
    pub const ALL: [Kind; 11] = [
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Float32,
        Kind::Float64,
        Kind::Bint8,
    ];

    /// Canonical label written to metadata
    pub const fn label(self) -> &'static str {
        match self {
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Bint8 => "bint8",
        }
    }

    /// Resolve a label back to its kind
    ///
    /// Complex labels are recognised and rejected with `UnsupportedType`;
    /// anything else unknown yields `UnknownLabel`.
    pub fn from_label(label: &str) -> Result<Self> {
        if let Some(kind) = Self::ALL.iter().find(|k| k.label() == label) {
            return Ok(*kind);
        }
        if COMPLEX_LABELS.contains(&label) {
            return Err(BspError::UnsupportedType(format!(
                "{label} values are not implemented"
            )));
        }
        Err(BspError::UnknownLabel(label.to_string()))
    }

    /// Convert from the on-disk tag
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Kind::Uint8),
            1 => Some(Kind::Uint16),
            2 => Some(Kind::Uint32),
            3 => Some(Kind::Uint64),
            4 => Some(Kind::Int8),
            5 => Some(Kind::Int16),
            6 => Some(Kind::Int32),
            7 => Some(Kind::Int64),
            8 => Some(Kind::Float32),
            9 => Some(Kind::Float64),
            10 => Some(Kind::Bint8),
            _ => None,
        }
    }

    /// Convert to the on-disk tag
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Fixed encoded width in bytes
    pub const fn size_bytes(self) -> usize {
        match self {
            Kind::Uint8 | Kind::Int8 | Kind::Bint8 => 1,
            Kind::Uint16 | Kind::Int16 => 2,
            Kind::Uint32 | Kind::Int32 | Kind::Float32 => 4,
            Kind::Uint64 | Kind::Int64 | Kind::Float64 => 8,
        }
    }

    /// Integer kinds, signed or unsigned; the only kinds usable as indices
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Uint8
                | Kind::Uint16
                | Kind::Uint32
                | Kind::Uint64
                | Kind::Int8
                | Kind::Int16
                | Kind::Int32
                | Kind::Int64
        )
    }

    /// Largest representable value, as f64 for cross-kind comparison
    pub fn max_value(self) -> f64 {
        match self {
            Kind::Uint8 => u8::MAX as f64,
            Kind::Uint16 => u16::MAX as f64,
            Kind::Uint32 => u32::MAX as f64,
            Kind::Uint64 => u64::MAX as f64,
            Kind::Int8 => i8::MAX as f64,
            Kind::Int16 => i16::MAX as f64,
            Kind::Int32 => i32::MAX as f64,
            Kind::Int64 => i64::MAX as f64,
            Kind::Float32 => f32::MAX as f64,
            Kind::Float64 => f64::MAX,
            Kind::Bint8 => 1.0,
        }
    }

    /// The kind with the larger maximum; ties keep `self`
    pub fn wider(self, other: Kind) -> Kind {
        if self.max_value() < other.max_value() {
            other
        } else {
            self
        }
    }

    /// Whether every non-negative value of `self` is representable in
    /// `target` as an index
    ///
    /// Indices are never negative, so `int64` widens into `uint64` but
    /// `uint8` does not widen into `int8`.
    pub fn widens_to(self, target: Kind) -> bool {
        self.is_integer() && target.is_integer() && self.max_value() <= target.max_value()
    }

    /// Narrowest unsigned kind that can hold every value in `0..=max` with
    /// one value of headroom
    pub fn smallest_index_for(max: u64) -> Kind {
        let needed = max.saturating_add(1);
        if needed <= u8::MAX as u64 {
            Kind::Uint8
        } else if needed <= u16::MAX as u64 {
            Kind::Uint16
        } else if needed <= u32::MAX as u64 {
            Kind::Uint32
        } else {
            Kind::Uint64
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for Kind {
    type Err = BspError;

    fn from_str(s: &str) -> Result<Self> {
        Kind::from_label(s)
    }
}

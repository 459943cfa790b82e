//! Element type constraints for Binsparse arrays
//!
//! This module defines the traits that tie a Rust primitive to its
//! registered [`Kind`], its little-endian encoding and its slot in
//! [`ArrayData`].

use crate::types::{ArrayData, Kind};
use crate::validation::validate_array_bounds;
use crate::Result;

/// Trait for types that can be stored in a Binsparse array
///
/// All element types must be:
/// - Copy: values are passed through without allocation
/// - PartialEq + Debug: representations can be compared and printed
/// - Send + Sync + 'static: owned buffers move freely between callers
pub trait Element: Copy + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// Registered kind of this element type
    const KIND: Kind;

    /// Multiplicative one, used for pattern entries
    fn one() -> Self;

    /// Parse a single textual token (Matrix Market values)
    fn parse_text(token: &str) -> Option<Self>;

    /// Append the little-endian encoding of `values` to `out`
    fn encode_le(values: &[Self], out: &mut Vec<u8>);

    /// Decode a little-endian byte run into owned values
    fn decode_le(bytes: &[u8]) -> Result<Vec<Self>>;

    /// Move a typed vector into the matching [`ArrayData`] variant
    fn into_array(values: Vec<Self>) -> ArrayData;

    /// Take the typed vector back out, returning the array untouched when
    /// the variant does not match
    fn from_array(data: ArrayData) -> core::result::Result<Vec<Self>, ArrayData>;
}

/// Trait for element types usable as indices and pointers
///
/// Any integer kind qualifies. Signed kinds can hold negative values, which
/// are never valid positions: conversions are checked so that an index
/// never silently wraps or goes negative.
pub trait Index: Element + Ord + core::hash::Hash {
    /// Exact value; `i128` holds every signed and unsigned 64-bit value
    fn to_i128(self) -> i128;

    /// Narrow from `i128`, `None` when the value does not fit
    fn from_i128(value: i128) -> Option<Self>;

    /// `None` for negative values
    fn to_u64(self) -> Option<u64> {
        u64::try_from(self.to_i128()).ok()
    }

    /// Narrow from u64, `None` when the value does not fit
    fn from_u64(value: u64) -> Option<Self> {
        Self::from_i128(i128::from(value))
    }

    /// `None` for negative values and, on 32-bit targets, out-of-range ones
    fn to_usize(self) -> Option<usize> {
        usize::try_from(self.to_i128()).ok()
    }

    /// Narrow from usize
    fn from_usize(value: usize) -> Option<Self> {
        Self::from_u64(value as u64)
    }
}

#[cfg(target_endian = "little")]
fn cast_from_bytes<T: bytemuck::Pod>(bytes: &[u8]) -> Option<&[T]> {
    bytemuck::try_cast_slice(bytes).ok()
}

#[cfg(not(target_endian = "little"))]
fn cast_from_bytes<T: bytemuck::Pod>(_bytes: &[u8]) -> Option<&[T]> {
    None
}

#[cfg(target_endian = "little")]
fn cast_to_bytes<T: bytemuck::Pod>(values: &[T]) -> Option<&[u8]> {
    Some(bytemuck::cast_slice(values))
}

#[cfg(not(target_endian = "little"))]
fn cast_to_bytes<T: bytemuck::Pod>(_values: &[T]) -> Option<&[u8]> {
    None
}

macro_rules! numeric_element {
    ($t:ty, $kind:ident, $one:expr) => {
        impl Element for $t {
            const KIND: Kind = Kind::$kind;

            fn one() -> Self {
                $one
            }

            fn parse_text(token: &str) -> Option<Self> {
                token.parse().ok()
            }

            fn encode_le(values: &[Self], out: &mut Vec<u8>) {
                match cast_to_bytes(values) {
                    Some(bytes) => out.extend_from_slice(bytes),
                    None => {
                        for v in values {
                            out.extend_from_slice(&v.to_le_bytes());
                        }
                    }
                }
            }

            fn decode_le(bytes: &[u8]) -> Result<Vec<Self>> {
                let count = validate_array_bounds::<$t>(bytes.len())?;
                if let Some(slice) = cast_from_bytes::<$t>(bytes) {
                    return Ok(slice.to_vec());
                }
                let mut values = Vec::with_capacity(count);
                for chunk in bytes.chunks_exact(core::mem::size_of::<$t>()) {
                    let mut buf = [0u8; core::mem::size_of::<$t>()];
                    buf.copy_from_slice(chunk);
                    values.push(<$t>::from_le_bytes(buf));
                }
                Ok(values)
            }

            fn into_array(values: Vec<Self>) -> ArrayData {
                ArrayData::$kind(values)
            }

            fn from_array(data: ArrayData) -> core::result::Result<Vec<Self>, ArrayData> {
                match data {
                    ArrayData::$kind(values) => Ok(values),
                    other => Err(other),
                }
            }
        }
    };
}

numeric_element!(u8, Uint8, 1);
numeric_element!(u16, Uint16, 1);
numeric_element!(u32, Uint32, 1);
numeric_element!(u64, Uint64, 1);
numeric_element!(i8, Int8, 1);
numeric_element!(i16, Int16, 1);
numeric_element!(i32, Int32, 1);
numeric_element!(i64, Int64, 1);
numeric_element!(f32, Float32, 1.0);
numeric_element!(f64, Float64, 1.0);

impl Element for bool {
    const KIND: Kind = Kind::Bint8;

    fn one() -> Self {
        true
    }

    fn parse_text(token: &str) -> Option<Self> {
        match token {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            other => other.parse::<f64>().ok().map(|v| v != 0.0),
        }
    }

    fn encode_le(values: &[Self], out: &mut Vec<u8>) {
        out.extend(values.iter().map(|&v| v as u8));
    }

    fn decode_le(bytes: &[u8]) -> Result<Vec<Self>> {
        Ok(bytes.iter().map(|&b| b != 0).collect())
    }

    fn into_array(values: Vec<Self>) -> ArrayData {
        ArrayData::Bint8(values)
    }

    fn from_array(data: ArrayData) -> core::result::Result<Vec<Self>, ArrayData> {
        match data {
            ArrayData::Bint8(values) => Ok(values),
            other => Err(other),
        }
    }
}

macro_rules! integer_index {
    ($($t:ty),*) => {
        $(
            impl Index for $t {
                fn to_i128(self) -> i128 {
                    i128::from(self)
                }

                fn from_i128(value: i128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }
        )*
    };
}

integer_index!(u8, u16, u32, u64, i8, i16, i32, i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_le() {
        let mut bytes = Vec::new();
        u32::encode_le(&[1, 0x0102_0304], &mut bytes);
        assert_eq!(bytes, vec![1, 0, 0, 0, 4, 3, 2, 1]);
        assert_eq!(u32::decode_le(&bytes).unwrap(), vec![1, 0x0102_0304]);
    }

    #[test]
    fn test_decode_unaligned_length() {
        assert!(u64::decode_le(&[0u8; 7]).is_err());
        assert_eq!(u16::decode_le(&[]).unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn test_decode_from_unaligned_start() {
        let mut buffer = vec![0u8];
        f64::encode_le(&[1.5, -2.0], &mut buffer);
        assert_eq!(f64::decode_le(&buffer[1..]).unwrap(), vec![1.5, -2.0]);
    }

    #[test]
    fn test_bool_encoding() {
        let mut bytes = Vec::new();
        bool::encode_le(&[true, false, true], &mut bytes);
        assert_eq!(bytes, vec![1, 0, 1]);
        assert_eq!(bool::decode_le(&bytes).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(f32::parse_text("5.0"), Some(5.0));
        assert_eq!(f64::parse_text("-1e-3"), Some(-1e-3));
        assert_eq!(i64::parse_text("-17"), Some(-17));
        assert_eq!(u8::parse_text("300"), None);
        assert_eq!(bool::parse_text("0"), Some(false));
        assert_eq!(bool::parse_text("2.5"), Some(true));
    }

    #[test]
    fn test_index_conversions() {
        assert_eq!(u8::from_u64(255), Some(255u8));
        assert_eq!(u8::from_u64(256), None);
        assert_eq!(u16::from_usize(7), Some(7u16));
        assert_eq!(40u32.to_usize(), Some(40));
        assert_eq!(u64::MAX.to_u64(), Some(u64::MAX));
    }

    #[test]
    fn test_signed_index_conversions() {
        assert_eq!(i64::from_u64(7), Some(7i64));
        assert_eq!(i8::from_u64(128), None);
        assert_eq!(i64::from_u64(u64::MAX), None);
        assert_eq!((-1i32).to_u64(), None);
        assert_eq!((-1i16).to_usize(), None);
        assert_eq!(300i16.to_usize(), Some(300));
        assert_eq!(i32::from_i128(-5), Some(-5));
    }

    #[test]
    fn test_array_variant_round_trip() {
        let data = i16::into_array(vec![-1, 2]);
        assert_eq!(data.kind(), Kind::Int16);
        assert_eq!(i16::from_array(data.clone()).unwrap(), vec![-1, 2]);
        assert!(u16::from_array(data).is_err());
    }
}

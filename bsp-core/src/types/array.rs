//! Kind-tagged owned arrays
//!
//! [`ArrayData`] is what storage backends hand back: a vector whose element
//! type is only known at runtime. Typed code recovers a `Vec<T>` through
//! [`ArrayData::into_vec`] or, for index arrays, [`ArrayData::into_index_vec`].

use super::Kind;
use crate::traits::{Element, Index};
use crate::{BspError, Result};

/// One-dimensional array of a runtime-selected kind
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Uint64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bint8(Vec<bool>),
}

/// Apply `$body` to the inner vector of every variant
macro_rules! each_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Uint8($v) => $body,
            ArrayData::Uint16($v) => $body,
            ArrayData::Uint32($v) => $body,
            ArrayData::Uint64($v) => $body,
            ArrayData::Int8($v) => $body,
            ArrayData::Int16($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
            ArrayData::Bint8($v) => $body,
        }
    };
}

impl ArrayData {
    /// Element kind of this array
    pub fn kind(&self) -> Kind {
        match self {
            ArrayData::Uint8(_) => Kind::Uint8,
            ArrayData::Uint16(_) => Kind::Uint16,
            ArrayData::Uint32(_) => Kind::Uint32,
            ArrayData::Uint64(_) => Kind::Uint64,
            ArrayData::Int8(_) => Kind::Int8,
            ArrayData::Int16(_) => Kind::Int16,
            ArrayData::Int32(_) => Kind::Int32,
            ArrayData::Int64(_) => Kind::Int64,
            ArrayData::Float32(_) => Kind::Float32,
            ArrayData::Float64(_) => Kind::Float64,
            ArrayData::Bint8(_) => Kind::Bint8,
        }
    }

    pub fn len(&self) -> usize {
        each_variant!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encoded size in bytes
    pub fn byte_len(&self) -> usize {
        self.len() * self.kind().size_bytes()
    }

    /// Fixed-width little-endian encoding
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        self.write_le(&mut out);
        out
    }

    /// Append the little-endian encoding to `out`
    pub fn write_le(&self, out: &mut Vec<u8>) {
        each_variant!(self, v => Element::encode_le(v.as_slice(), out))
    }

    /// Decode a little-endian byte run of the given kind
    pub fn from_le_bytes(kind: Kind, bytes: &[u8]) -> Result<Self> {
        Ok(match kind {
            Kind::Uint8 => ArrayData::Uint8(u8::decode_le(bytes)?),
            Kind::Uint16 => ArrayData::Uint16(u16::decode_le(bytes)?),
            Kind::Uint32 => ArrayData::Uint32(u32::decode_le(bytes)?),
            Kind::Uint64 => ArrayData::Uint64(u64::decode_le(bytes)?),
            Kind::Int8 => ArrayData::Int8(i8::decode_le(bytes)?),
            Kind::Int16 => ArrayData::Int16(i16::decode_le(bytes)?),
            Kind::Int32 => ArrayData::Int32(i32::decode_le(bytes)?),
            Kind::Int64 => ArrayData::Int64(i64::decode_le(bytes)?),
            Kind::Float32 => ArrayData::Float32(f32::decode_le(bytes)?),
            Kind::Float64 => ArrayData::Float64(f64::decode_le(bytes)?),
            Kind::Bint8 => ArrayData::Bint8(bool::decode_le(bytes)?),
        })
    }

    /// Take the typed vector, requiring an exact kind match
    pub fn into_vec<T: Element>(self, field: &str) -> Result<Vec<T>> {
        T::from_array(self).map_err(|other| BspError::TypeMismatch {
            field: field.to_string(),
            expected: T::KIND.label().to_string(),
            found: other.kind().label().to_string(),
        })
    }

    /// Take an index vector, converting between integer kinds
    ///
    /// The conversion is allowed when `I` can hold every non-negative value
    /// of the stored kind. Each value is still checked: a negative entry or
    /// one that does not fit `I` is an error naming its position.
    pub fn into_index_vec<I: Index>(self, field: &str) -> Result<Vec<I>> {
        let found = self.kind();
        if found == I::KIND {
            return self.into_vec(field);
        }
        if !found.widens_to(I::KIND) {
            return Err(BspError::TypeMismatch {
                field: field.to_string(),
                expected: I::KIND.label().to_string(),
                found: found.label().to_string(),
            });
        }
        match self {
            ArrayData::Uint8(v) => convert_indices(v, field),
            ArrayData::Uint16(v) => convert_indices(v, field),
            ArrayData::Uint32(v) => convert_indices(v, field),
            ArrayData::Uint64(v) => convert_indices(v, field),
            ArrayData::Int8(v) => convert_indices(v, field),
            ArrayData::Int16(v) => convert_indices(v, field),
            ArrayData::Int32(v) => convert_indices(v, field),
            ArrayData::Int64(v) => convert_indices(v, field),
            other => Err(BspError::TypeMismatch {
                field: field.to_string(),
                expected: I::KIND.label().to_string(),
                found: other.kind().label().to_string(),
            }),
        }
    }
}

fn convert_indices<S: Index, I: Index>(values: Vec<S>, field: &str) -> Result<Vec<I>> {
    values
        .into_iter()
        .enumerate()
        .map(|(k, v)| {
            let value = v.to_i128();
            if value < 0 {
                return Err(BspError::InvalidMatrix(format!(
                    "{field}[{k}] = {value} is negative"
                )));
            }
            I::from_i128(value).ok_or(BspError::IndexOverflow {
                value: value as u64,
                label: I::KIND.label(),
            })
        })
        .collect()
}

impl<T: Element> From<Vec<T>> for ArrayData {
    fn from(values: Vec<T>) -> Self {
        T::into_array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_len() {
        let data = ArrayData::from(vec![1.0f64, 2.0, 3.0]);
        assert_eq!(data.kind(), Kind::Float64);
        assert_eq!(data.len(), 3);
        assert_eq!(data.byte_len(), 24);
        assert!(!data.is_empty());
    }

    #[test]
    fn test_le_round_trip_every_kind() {
        let arrays = vec![
            ArrayData::from(vec![1u8, 255]),
            ArrayData::from(vec![1u16, 65535]),
            ArrayData::from(vec![7u32]),
            ArrayData::from(vec![u64::MAX]),
            ArrayData::from(vec![-8i8]),
            ArrayData::from(vec![-300i16]),
            ArrayData::from(vec![i32::MIN]),
            ArrayData::from(vec![-1i64, 1]),
            ArrayData::from(vec![0.5f32]),
            ArrayData::from(vec![-0.25f64]),
            ArrayData::from(vec![true, false]),
        ];
        for array in arrays {
            let bytes = array.to_le_bytes();
            assert_eq!(bytes.len(), array.byte_len());
            assert_eq!(ArrayData::from_le_bytes(array.kind(), &bytes).unwrap(), array);
        }
    }

    #[test]
    fn test_into_vec_exact() {
        let data = ArrayData::from(vec![1.5f32]);
        assert_eq!(data.clone().into_vec::<f32>("values").unwrap(), vec![1.5]);
        let err = data.into_vec::<f64>("values").unwrap_err();
        assert!(matches!(
            err,
            BspError::TypeMismatch { ref field, ref expected, ref found }
                if field == "values" && expected == "float64" && found == "float32"
        ));
    }

    #[test]
    fn test_into_index_vec_widens() {
        let data = ArrayData::from(vec![0u8, 200]);
        assert_eq!(data.into_index_vec::<u64>("indices_0").unwrap(), vec![0u64, 200]);

        let data = ArrayData::from(vec![70_000u32]);
        assert!(matches!(
            data.into_index_vec::<u16>("indices_1"),
            Err(BspError::TypeMismatch { .. })
        ));

        let data = ArrayData::from(vec![1.0f32]);
        assert!(matches!(
            data.into_index_vec::<u64>("indices_1"),
            Err(BspError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_into_index_vec_signed() {
        let data = ArrayData::from(vec![0i64, 9]);
        assert_eq!(data.into_index_vec::<u64>("indices_0").unwrap(), vec![0u64, 9]);

        let data = ArrayData::from(vec![3u16, 4]);
        assert_eq!(data.into_index_vec::<i32>("indices_0").unwrap(), vec![3i32, 4]);

        let data = ArrayData::from(vec![2i32, -1]);
        assert!(matches!(
            data.into_index_vec::<u32>("indices_1"),
            Err(BspError::InvalidMatrix(ref m)) if m == "indices_1[1] = -1 is negative"
        ));

        let data = ArrayData::from(vec![5u32]);
        assert!(matches!(
            data.into_index_vec::<i32>("indices_0"),
            Err(BspError::TypeMismatch { .. })
        ));
    }
}

//! Type labels as they appear in `data_types`

use super::Kind;
use crate::{BspError, Result};

const ISO_PREFIX: &str = "iso[";
const ISO_SUFFIX: &str = "]";

/// A kind plus the iso-valued flag, spelled `float32` or `iso[float32]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeLabel {
    pub kind: Kind,
    pub iso: bool,
}

impl TypeLabel {
    pub const fn new(kind: Kind) -> Self {
        Self { kind, iso: false }
    }

    pub const fn iso(kind: Kind) -> Self {
        Self { kind, iso: true }
    }

    /// Parse a label, unwrapping one `iso[...]` layer
    pub fn parse(label: &str) -> Result<Self> {
        match label
            .strip_prefix(ISO_PREFIX)
            .and_then(|rest| rest.strip_suffix(ISO_SUFFIX))
        {
            Some(inner) => Ok(Self::iso(Kind::from_label(inner)?)),
            None if label.starts_with(ISO_PREFIX) => {
                Err(BspError::UnknownLabel(label.to_string()))
            }
            None => Ok(Self::new(Kind::from_label(label)?)),
        }
    }
}

impl core::fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.iso {
            write!(f, "{ISO_PREFIX}{}{ISO_SUFFIX}", self.kind)
        } else {
            f.write_str(self.kind.label())
        }
    }
}

impl From<Kind> for TypeLabel {
    fn from(kind: Kind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_iso() {
        assert_eq!(TypeLabel::parse("uint32").unwrap(), TypeLabel::new(Kind::Uint32));
        let iso = TypeLabel::parse("iso[float32]").unwrap();
        assert_eq!(iso, TypeLabel::iso(Kind::Float32));
        assert_eq!(iso.to_string(), "iso[float32]");
        assert_eq!(TypeLabel::new(Kind::Bint8).to_string(), "bint8");
    }

    #[test]
    fn test_malformed_iso() {
        assert!(matches!(
            TypeLabel::parse("iso[float32"),
            Err(BspError::UnknownLabel(_))
        ));
        assert!(matches!(
            TypeLabel::parse("iso[iso[float32]]"),
            Err(BspError::UnknownLabel(_))
        ));
        assert!(matches!(
            TypeLabel::parse("iso[complex[float32]]"),
            Err(BspError::UnsupportedType(_))
        ));
    }
}

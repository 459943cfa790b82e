//! Matrix Market banner and size line

use std::fmt;
use std::str::FromStr;

use bsp_core::{BspError, Kind, Result, Structure};

const BANNER: &str = "%%MatrixMarket";

/// `coordinate` (sparse triplets) or `array` (dense column-major values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Coordinate,
    Array,
}

/// Element field declared in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Real,
    Integer,
    Complex,
    Pattern,
}

impl Field {
    /// Kind values of this field are stored as
    ///
    /// `complex` is recognised but has no stored kind.
    pub fn value_kind(self) -> Result<Kind> {
        match self {
            Field::Real => Ok(Kind::Float32),
            Field::Integer => Ok(Kind::Int64),
            Field::Pattern => Ok(Kind::Uint8),
            Field::Complex => Err(BspError::UnsupportedType(
                "complex Matrix Market values".into(),
            )),
        }
    }
}

/// Symmetry declared in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    General,
    Symmetric,
    SkewSymmetric,
    Hermitian,
}

impl Symmetry {
    pub fn structure(self) -> Structure {
        match self {
            Symmetry::General => Structure::General,
            Symmetry::Symmetric => Structure::Symmetric,
            Symmetry::SkewSymmetric => Structure::SkewSymmetric,
            Symmetry::Hermitian => Structure::Hermitian,
        }
    }
}

macro_rules! keyword_enum {
    ($ty:ident { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = BspError;

            fn from_str(s: &str) -> Result<Self> {
                $(
                    if s.eq_ignore_ascii_case($name) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(BspError::MalformedHeader(format!(
                    "`{s}` is not a valid {} keyword",
                    stringify!($ty).to_ascii_lowercase()
                )))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(Layout {
    "coordinate" => Coordinate,
    "array" => Array,
});

keyword_enum!(Field {
    "real" => Real,
    "integer" => Integer,
    "complex" => Complex,
    "pattern" => Pattern,
});

keyword_enum!(Symmetry {
    "general" => General,
    "symmetric" => Symmetric,
    "skew-symmetric" => SkewSymmetric,
    "hermitian" => Hermitian,
});

/// The parsed `%%MatrixMarket matrix <layout> <field> <symmetry>` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    pub layout: Layout,
    pub field: Field,
    pub symmetry: Symmetry,
}

impl Banner {
    /// Parse the first line of a file
    ///
    /// Exactly five whitespace-separated tokens are required. Keywords after
    /// the `%%MatrixMarket` marker are case-insensitive.
    pub fn parse(line: &str) -> Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let &[marker, object, layout, field, symmetry] = tokens.as_slice() else {
            return Err(BspError::MalformedHeader(format!(
                "expected 5 tokens in banner, found {}",
                tokens.len()
            )));
        };
        if marker != BANNER {
            return Err(BspError::MalformedHeader(format!(
                "banner must start with {BANNER}, found `{marker}`"
            )));
        }
        if !object.eq_ignore_ascii_case("matrix") {
            return Err(BspError::MalformedHeader(format!(
                "only `matrix` objects are supported, found `{object}`"
            )));
        }
        Ok(Self {
            layout: layout.parse()?,
            field: field.parse()?,
            symmetry: symmetry.parse()?,
        })
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BANNER} matrix {} {} {}", self.layout, self.field, self.symmetry)
    }
}

/// Dimensions from the size line
///
/// For `array` files `nnz` is `rows * cols`.
pub fn parse_size_line(line: &str, layout: Layout) -> Result<(usize, usize, usize)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let parse = |token: &str| {
        token.parse::<usize>().map_err(|_| {
            BspError::MalformedHeader(format!("`{token}` in size line is not a count"))
        })
    };
    match (layout, tokens.as_slice()) {
        (Layout::Coordinate, &[rows, cols, nnz]) => Ok((parse(rows)?, parse(cols)?, parse(nnz)?)),
        (Layout::Array, &[rows, cols]) => {
            let (rows, cols) = (parse(rows)?, parse(cols)?);
            let nnz = rows.checked_mul(cols).ok_or_else(|| {
                BspError::MalformedHeader(format!("array of {rows}x{cols} is too large"))
            })?;
            Ok((rows, cols, nnz))
        }
        (layout, _) => Err(BspError::MalformedHeader(format!(
            "size line `{}` does not match {layout} layout",
            line.trim()
        ))),
    }
}

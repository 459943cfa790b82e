//! Runtime dispatch from type labels to monomorphised code
//!
//! A [`KindVisitor`] is handed concrete type parameters once every label in
//! the sequence has been resolved. By convention the last label is the value
//! kind and the preceding ones are index kinds in declaration order, so a
//! CSR matrix dispatches on `[pointers_to_1, indices_1, values]`.
//!
//! Resolution failures are always reported; nothing is invoked on error.

use super::{Kind, TypeLabel};
use crate::traits::{Element, Index};
use crate::{BspError, Result};

/// Generic continuation invoked with the resolved kinds
///
/// Implement only the arities you need; the defaults report an arity error.
pub trait KindVisitor: Sized {
    type Output;

    fn visit_values<T: Element>(self) -> Result<Self::Output> {
        Err(arity_error(1))
    }

    fn visit_indexed<I: Index, T: Element>(self) -> Result<Self::Output> {
        Err(arity_error(2))
    }

    fn visit_doubly_indexed<I0: Index, I1: Index, T: Element>(self) -> Result<Self::Output> {
        Err(arity_error(3))
    }
}

fn arity_error(count: usize) -> BspError {
    BspError::UnsupportedType(format!("visitor does not accept {count} type labels"))
}

/// Bind `$T` to the Rust type of `$kind` and evaluate `$body`
macro_rules! with_element {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            Kind::Uint8 => {
                type $T = u8;
                $body
            }
            Kind::Uint16 => {
                type $T = u16;
                $body
            }
            Kind::Uint32 => {
                type $T = u32;
                $body
            }
            Kind::Uint64 => {
                type $T = u64;
                $body
            }
            Kind::Int8 => {
                type $T = i8;
                $body
            }
            Kind::Int16 => {
                type $T = i16;
                $body
            }
            Kind::Int32 => {
                type $T = i32;
                $body
            }
            Kind::Int64 => {
                type $T = i64;
                $body
            }
            Kind::Float32 => {
                type $T = f32;
                $body
            }
            Kind::Float64 => {
                type $T = f64;
                $body
            }
            Kind::Bint8 => {
                type $T = bool;
                $body
            }
        }
    };
}

/// Like `with_element!` but restricted to integer index kinds
macro_rules! with_index {
    ($kind:expr, $I:ident => $body:expr) => {
        match $kind {
            Kind::Uint8 => {
                type $I = u8;
                $body
            }
            Kind::Uint16 => {
                type $I = u16;
                $body
            }
            Kind::Uint32 => {
                type $I = u32;
                $body
            }
            Kind::Uint64 => {
                type $I = u64;
                $body
            }
            Kind::Int8 => {
                type $I = i8;
                $body
            }
            Kind::Int16 => {
                type $I = i16;
                $body
            }
            Kind::Int32 => {
                type $I = i32;
                $body
            }
            Kind::Int64 => {
                type $I = i64;
                $body
            }
            other => Err(not_an_index(other)),
        }
    };
}

fn not_an_index(kind: Kind) -> BspError {
    BspError::UnsupportedType(format!("{kind} cannot be used as an index type"))
}

/// Resolve `labels` left to right and invoke the matching visitor method
///
/// The value label may carry an `iso[...]` wrapper; index labels may not.
pub fn dispatch<V: KindVisitor>(labels: &[&str], visitor: V) -> Result<V::Output> {
    let Some((value, indices)) = labels.split_last() else {
        return Err(BspError::Parse("dispatch needs at least one type label".into()));
    };
    if indices.len() > 2 {
        return Err(BspError::Parse(format!(
            "dispatch takes at most 3 type labels, got {}",
            labels.len()
        )));
    }
    let mut kinds = Vec::with_capacity(labels.len());
    for label in indices {
        let kind = Kind::from_label(label)?;
        if !kind.is_integer() {
            return Err(not_an_index(kind));
        }
        kinds.push(kind);
    }
    kinds.push(TypeLabel::parse(value)?.kind);
    dispatch_kinds(&kinds, visitor)
}

/// Dispatch on already-resolved kinds
pub fn dispatch_kinds<V: KindVisitor>(kinds: &[Kind], visitor: V) -> Result<V::Output> {
    match *kinds {
        [value] => with_element!(value, T => visitor.visit_values::<T>()),
        [index, value] => with_index!(index, I => {
            with_element!(value, T => visitor.visit_indexed::<I, T>())
        }),
        [index_0, index_1, value] => with_index!(index_0, I0 => {
            with_index!(index_1, I1 => {
                with_element!(value, T => visitor.visit_doubly_indexed::<I0, I1, T>())
            })
        }),
        _ => Err(BspError::Parse(format!(
            "dispatch takes 1 to 3 type labels, got {}",
            kinds.len()
        ))),
    }
}

/// Dispatch with both index kinds coalesced into the wider one
///
/// Used when a caller needs one index type for two axes, e.g. COO rows and
/// columns stored with different widths.
pub fn dispatch_unified<V: KindVisitor>(
    index_0: Kind,
    index_1: Kind,
    value: Kind,
    visitor: V,
) -> Result<V::Output> {
    dispatch_kinds(&[index_0.wider(index_1), value], visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the kinds it was instantiated with
    struct KindsSeen;

    impl KindVisitor for KindsSeen {
        type Output = Vec<Kind>;

        fn visit_values<T: Element>(self) -> Result<Self::Output> {
            Ok(vec![T::KIND])
        }

        fn visit_indexed<I: Index, T: Element>(self) -> Result<Self::Output> {
            Ok(vec![I::KIND, T::KIND])
        }

        fn visit_doubly_indexed<I0: Index, I1: Index, T: Element>(self) -> Result<Self::Output> {
            Ok(vec![I0::KIND, I1::KIND, T::KIND])
        }
    }

    /// Only supports the two-label form
    struct IndexedOnly;

    impl KindVisitor for IndexedOnly {
        type Output = ();

        fn visit_indexed<I: Index, T: Element>(self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_arities() {
        assert_eq!(dispatch(&["float64"], KindsSeen).unwrap(), vec![Kind::Float64]);
        assert_eq!(
            dispatch(&["uint16", "iso[int8]"], KindsSeen).unwrap(),
            vec![Kind::Uint16, Kind::Int8]
        );
        assert_eq!(
            dispatch(&["uint64", "uint8", "bint8"], KindsSeen).unwrap(),
            vec![Kind::Uint64, Kind::Uint8, Kind::Bint8]
        );
    }

    #[test]
    fn test_dispatch_unknown_label_fails() {
        assert!(matches!(
            dispatch(&["uint32", "float16"], KindsSeen),
            Err(BspError::UnknownLabel(l)) if l == "float16"
        ));
        assert!(matches!(
            dispatch(&["nope", "uint32", "float32"], KindsSeen),
            Err(BspError::UnknownLabel(l)) if l == "nope"
        ));
    }

    #[test]
    fn test_dispatch_signed_index_kinds() {
        assert_eq!(
            dispatch(&["int32", "float32"], KindsSeen).unwrap(),
            vec![Kind::Int32, Kind::Float32]
        );
        assert_eq!(
            dispatch(&["int64", "uint8", "int8"], KindsSeen).unwrap(),
            vec![Kind::Int64, Kind::Uint8, Kind::Int8]
        );
        assert_eq!(
            dispatch_unified(Kind::Int64, Kind::Uint32, Kind::Float64, KindsSeen).unwrap(),
            vec![Kind::Int64, Kind::Float64]
        );
    }

    #[test]
    fn test_dispatch_rejects_non_index_kinds() {
        assert!(matches!(
            dispatch(&["float32", "float32"], KindsSeen),
            Err(BspError::UnsupportedType(_))
        ));
        assert!(matches!(
            dispatch_kinds(&[Kind::Bint8, Kind::Uint8, Kind::Int32], KindsSeen),
            Err(BspError::UnsupportedType(_))
        ));
        assert!(matches!(
            dispatch(&["iso[uint32]", "float32"], KindsSeen),
            Err(BspError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_dispatch_bad_arity() {
        assert!(dispatch(&[], KindsSeen).is_err());
        assert!(dispatch(&["uint8", "uint8", "uint8", "uint8"], KindsSeen).is_err());
        assert!(dispatch(&["float32"], IndexedOnly).is_err());
        assert!(dispatch(&["uint8", "float32"], IndexedOnly).is_ok());
    }

    #[test]
    fn test_dispatch_unified_picks_wider() {
        assert_eq!(
            dispatch_unified(Kind::Uint8, Kind::Uint32, Kind::Float32, KindsSeen).unwrap(),
            vec![Kind::Uint32, Kind::Float32]
        );
        assert_eq!(
            dispatch_unified(Kind::Uint64, Kind::Uint16, Kind::Int64, KindsSeen).unwrap(),
            vec![Kind::Uint64, Kind::Int64]
        );
    }
}

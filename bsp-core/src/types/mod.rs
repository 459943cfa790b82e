//! Type registry: element kinds, labels and runtime dispatch

pub mod array;
pub mod dispatch;
pub mod kind;
pub mod label;

pub use array::ArrayData;
pub use dispatch::{dispatch, dispatch_kinds, dispatch_unified, KindVisitor};
pub use kind::Kind;
pub use label::TypeLabel;

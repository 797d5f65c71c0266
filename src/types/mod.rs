//! Primitive type and value definitions for the query-option compiler.

pub mod value;

pub use value::{PrimitiveKind, PrimitiveValue, TypeRef};

//! `PrimitiveKind`, `PrimitiveValue` and `TypeRef` definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primitive types known to the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Boolean.
    Boolean,
    /// 8-bit signed integer.
    SByte,
    /// 8-bit unsigned integer.
    Byte,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Single,
    /// 64-bit floating point.
    Double,
    /// Arbitrary-precision decimal.
    Decimal,
    /// UTF-8 string.
    String,
    /// 128-bit GUID.
    Guid,
    /// Point in time with offset.
    DateTimeOffset,
}

impl PrimitiveKind {
    /// Returns the qualified EDM name of this kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Edm.Boolean",
            PrimitiveKind::SByte => "Edm.SByte",
            PrimitiveKind::Byte => "Edm.Byte",
            PrimitiveKind::Int16 => "Edm.Int16",
            PrimitiveKind::Int32 => "Edm.Int32",
            PrimitiveKind::Int64 => "Edm.Int64",
            PrimitiveKind::Single => "Edm.Single",
            PrimitiveKind::Double => "Edm.Double",
            PrimitiveKind::Decimal => "Edm.Decimal",
            PrimitiveKind::String => "Edm.String",
            PrimitiveKind::Guid => "Edm.Guid",
            PrimitiveKind::DateTimeOffset => "Edm.DateTimeOffset",
        }
    }

    /// Returns whether this kind is a signed or unsigned integral type.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::SByte
                | PrimitiveKind::Byte
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
        )
    }

    /// Returns whether this kind is numeric (integral, floating or decimal).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integral()
            || matches!(
                self,
                PrimitiveKind::Single | PrimitiveKind::Double | PrimitiveKind::Decimal
            )
    }

    /// Returns whether relational operators (`gt`, `ge`, `lt`, `le`) accept
    /// operands of this kind.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.is_numeric()
            || matches!(self, PrimitiveKind::String | PrimitiveKind::DateTimeOffset)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Literal value container carried by constant tokens and nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    /// Boolean literal.
    Boolean(bool),
    /// 32-bit integer literal.
    Int32(i32),
    /// 64-bit integer literal (`L` suffix or out of `Int32` range).
    Int64(i64),
    /// 32-bit float literal (`f` suffix).
    Single(f32),
    /// 64-bit float literal (`d` suffix or unsuffixed fractional).
    Double(f64),
    /// Decimal literal (`m` suffix); kept as its raw digits.
    Decimal(String),
    /// String literal with quote doubling already resolved.
    String(String),
    /// GUID literal.
    Guid(Uuid),
    /// The `null` literal.
    Null,
}

// Manual Hash because f32/f64 do not implement Hash.
impl std::hash::Hash for PrimitiveValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            PrimitiveValue::Boolean(v) => v.hash(state),
            PrimitiveValue::Int32(v) => v.hash(state),
            PrimitiveValue::Int64(v) => v.hash(state),
            PrimitiveValue::Single(v) => v.to_bits().hash(state),
            PrimitiveValue::Double(v) => v.to_bits().hash(state),
            PrimitiveValue::Decimal(v) | PrimitiveValue::String(v) => v.hash(state),
            PrimitiveValue::Guid(v) => v.hash(state),
            PrimitiveValue::Null => {}
        }
    }
}

// Manual Eq because f64 does not implement Eq.
impl Eq for PrimitiveValue {}

impl PrimitiveValue {
    /// Returns true if this value is the `null` literal.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, PrimitiveValue::Null)
    }

    /// Returns the primitive kind of this value, or None for `null`.
    #[must_use]
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            PrimitiveValue::Boolean(_) => Some(PrimitiveKind::Boolean),
            PrimitiveValue::Int32(_) => Some(PrimitiveKind::Int32),
            PrimitiveValue::Int64(_) => Some(PrimitiveKind::Int64),
            PrimitiveValue::Single(_) => Some(PrimitiveKind::Single),
            PrimitiveValue::Double(_) => Some(PrimitiveKind::Double),
            PrimitiveValue::Decimal(_) => Some(PrimitiveKind::Decimal),
            PrimitiveValue::String(_) => Some(PrimitiveKind::String),
            PrimitiveValue::Guid(_) => Some(PrimitiveKind::Guid),
            PrimitiveValue::Null => None,
        }
    }

    /// Attempts to extract a bool value.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PrimitiveValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PrimitiveValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to extract an i32 value.
    #[must_use]
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            PrimitiveValue::Int32(i) => Some(*i),
            _ => None,
        }
    }
}

/// Reference to a resolved type: primitive, entity (by qualified name) or
/// collection-of-X.
///
/// Entity references carry the type *name* only; the entity model owns the
/// type definitions, nodes never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Entity type, referenced by qualified name.
    Entity(String),
    /// Collection of an element type.
    Collection(Box<TypeRef>),
}

impl TypeRef {
    /// Creates a primitive type reference.
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }

    /// Creates an entity type reference.
    #[must_use]
    pub fn entity(name: impl Into<String>) -> Self {
        TypeRef::Entity(name.into())
    }

    /// Creates a collection type reference.
    #[must_use]
    pub fn collection(element: TypeRef) -> Self {
        TypeRef::Collection(Box::new(element))
    }

    /// Returns true for collection types.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::Collection(_))
    }

    /// Returns the element type of a collection, or None otherwise.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Collection(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the primitive kind for primitive references, or None.
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns the entity type name for entity references, or None.
    #[must_use]
    pub fn entity_name(&self) -> Option<&str> {
        match self {
            TypeRef::Entity(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the qualified name of this type reference.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            TypeRef::Primitive(kind) => kind.name().to_string(),
            TypeRef::Entity(name) => name.clone(),
            TypeRef::Collection(element) => format!("Collection({})", element.name()),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

//! In-memory entity model the binder resolves identifiers against.

pub mod schema;

pub use schema::{
    EntityModel, EntitySet, EntityType, FunctionSignature, NavigationProperty,
    PropertyResolution, StructuralProperty,
};

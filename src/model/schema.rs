//! Entity model schema: entity types, entity sets and function signatures.
//!
//! The model is read-only during binding; `&EntityModel` receivers make
//! concurrent binds of independent query options safe without locking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UriqError};
use crate::types::{PrimitiveKind, TypeRef};

/// A declared structural (value-typed) property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralProperty {
    /// Property name.
    pub name: String,
    /// Declared type; `Collection(Primitive)` for multi-valued properties.
    pub type_ref: TypeRef,
}

/// A declared navigation property pointing at another entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationProperty {
    /// Property name.
    pub name: String,
    /// Qualified name of the target entity type.
    pub target: String,
    /// True for collection-valued navigations.
    pub collection: bool,
}

impl NavigationProperty {
    /// Returns the resolved type reference for this navigation.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        let target = TypeRef::entity(self.target.clone());
        if self.collection {
            TypeRef::collection(target)
        } else {
            target
        }
    }
}

/// An entity type with structural and navigation properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    /// Qualified type name.
    pub name: String,
    /// Base type name for single-inheritance chains.
    pub base_type: Option<String>,
    /// Open types accept properties not declared in the schema.
    pub open: bool,
    /// Declared structural properties.
    pub structural: Vec<StructuralProperty>,
    /// Declared navigation properties.
    pub navigations: Vec<NavigationProperty>,
}

impl EntityType {
    /// Creates a new closed entity type with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        EntityType {
            name: name.into(),
            base_type: None,
            open: false,
            structural: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    /// Marks the type as open.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Adds a structural property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.structural.push(StructuralProperty {
            name: name.into(),
            type_ref,
        });
        self
    }

    /// Adds a navigation property.
    #[must_use]
    pub fn with_navigation(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        collection: bool,
    ) -> Self {
        self.navigations.push(NavigationProperty {
            name: name.into(),
            target: target.into(),
            collection,
        });
        self
    }
}

/// A named collection of entities of one element type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    /// Entity set name.
    pub name: String,
    /// Qualified name of the element entity type.
    pub element_type: String,
}

/// One overload of a callable function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name.
    pub name: String,
    /// Declared parameter types, in order.
    pub parameters: Vec<TypeRef>,
    /// Declared return type.
    pub return_type: TypeRef,
}

impl FunctionSignature {
    /// Creates a function signature.
    #[must_use]
    pub fn new(name: impl Into<String>, parameters: Vec<TypeRef>, return_type: TypeRef) -> Self {
        FunctionSignature {
            name: name.into(),
            parameters,
            return_type,
        }
    }
}

/// Resolution of a property name against an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyResolution<'a> {
    /// A declared structural property.
    Structural(&'a StructuralProperty),
    /// A declared navigation property.
    Navigation(&'a NavigationProperty),
}

/// The entity model: entity types, entity sets and function overloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityModel {
    entity_types: HashMap<String, EntityType>,
    entity_sets: HashMap<String, EntitySet>,
    functions: HashMap<String, Vec<FunctionSignature>>,
}

impl EntityModel {
    /// Creates an empty model with the canonical string and math functions
    /// pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let mut model = EntityModel::default();
        model.register_canonical_functions();
        model
    }

    /// Adds an entity type to the model.
    ///
    /// Rejects duplicate type names and base types that have not been added
    /// yet, so inheritance chains are acyclic by construction.
    pub fn add_entity_type(&mut self, entity_type: EntityType) -> Result<()> {
        if self.entity_types.contains_key(&entity_type.name) {
            return Err(UriqError::ModelError(format!(
                "entity type '{}' already defined",
                entity_type.name
            )));
        }
        if let Some(base) = &entity_type.base_type {
            if !self.entity_types.contains_key(base) {
                return Err(UriqError::ModelError(format!(
                    "base type '{}' of '{}' is not defined",
                    base, entity_type.name
                )));
            }
        }
        self.entity_types
            .insert(entity_type.name.clone(), entity_type);
        Ok(())
    }

    /// Adds an entity set to the model.
    pub fn add_entity_set(
        &mut self,
        name: impl Into<String>,
        element_type: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let element_type = element_type.into();
        if self.entity_sets.contains_key(&name) {
            return Err(UriqError::ModelError(format!(
                "entity set '{name}' already defined"
            )));
        }
        if !self.entity_types.contains_key(&element_type) {
            return Err(UriqError::ModelError(format!(
                "element type '{element_type}' of entity set '{name}' is not defined"
            )));
        }
        self.entity_sets.insert(
            name.clone(),
            EntitySet { name, element_type },
        );
        Ok(())
    }

    /// Registers a function overload.
    pub fn add_function(&mut self, signature: FunctionSignature) {
        self.functions
            .entry(signature.name.clone())
            .or_default()
            .push(signature);
    }

    /// Looks up an entity type by qualified name.
    #[must_use]
    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.get(name)
    }

    /// Looks up an entity set by name.
    #[must_use]
    pub fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.get(name)
    }

    /// Returns the overloads registered under a function name.
    #[must_use]
    pub fn functions(&self, name: &str) -> &[FunctionSignature] {
        self.functions.get(name).map_or(&[], Vec::as_slice)
    }

    /// Resolves a property name against an entity type, walking the base-type
    /// chain from the most derived type upward.
    #[must_use]
    pub fn resolve_property<'a>(
        &'a self,
        type_name: &str,
        property: &str,
    ) -> Option<PropertyResolution<'a>> {
        let mut current = self.entity_types.get(type_name);
        while let Some(entity_type) = current {
            if let Some(p) = entity_type.structural.iter().find(|p| p.name == property) {
                return Some(PropertyResolution::Structural(p));
            }
            if let Some(n) = entity_type.navigations.iter().find(|n| n.name == property) {
                return Some(PropertyResolution::Navigation(n));
            }
            current = entity_type
                .base_type
                .as_deref()
                .and_then(|b| self.entity_types.get(b));
        }
        None
    }

    /// Returns true if the type or any of its base types is open.
    #[must_use]
    pub fn is_open(&self, type_name: &str) -> bool {
        let mut current = self.entity_types.get(type_name);
        while let Some(entity_type) = current {
            if entity_type.open {
                return true;
            }
            current = entity_type
                .base_type
                .as_deref()
                .and_then(|b| self.entity_types.get(b));
        }
        false
    }

    /// Returns true if `candidate` is `base` or derives from it.
    #[must_use]
    pub fn is_assignable(&self, candidate: &str, base: &str) -> bool {
        let mut current = Some(candidate);
        while let Some(name) = current {
            if name == base {
                return true;
            }
            current = self
                .entity_types
                .get(name)
                .and_then(|t| t.base_type.as_deref());
        }
        false
    }

    fn register_canonical_functions(&mut self) {
        use PrimitiveKind::{Boolean, Double, Int32, String as Str};
        let s = || TypeRef::primitive(Str);
        let i = || TypeRef::primitive(Int32);
        let b = || TypeRef::primitive(Boolean);
        let d = || TypeRef::primitive(Double);

        self.add_function(FunctionSignature::new("concat", vec![s(), s()], s()));
        self.add_function(FunctionSignature::new("contains", vec![s(), s()], b()));
        self.add_function(FunctionSignature::new("endswith", vec![s(), s()], b()));
        self.add_function(FunctionSignature::new("startswith", vec![s(), s()], b()));
        self.add_function(FunctionSignature::new("length", vec![s()], i()));
        self.add_function(FunctionSignature::new("indexof", vec![s(), s()], i()));
        self.add_function(FunctionSignature::new("substring", vec![s(), i()], s()));
        self.add_function(FunctionSignature::new("substring", vec![s(), i(), i()], s()));
        self.add_function(FunctionSignature::new("tolower", vec![s()], s()));
        self.add_function(FunctionSignature::new("toupper", vec![s()], s()));
        self.add_function(FunctionSignature::new("trim", vec![s()], s()));
        self.add_function(FunctionSignature::new("round", vec![d()], d()));
        self.add_function(FunctionSignature::new("floor", vec![d()], d()));
        self.add_function(FunctionSignature::new("ceiling", vec![d()], d()));
    }
}

//! The typed, model-resolved node tree produced by binding.
//!
//! Nodes are immutable after construction and each carries its resolved type
//! reference; a node's type never changes once it is built. A None type
//! reference marks a dynamic (open-property) value.

use crate::parser::token::{
    BinaryOperatorKind, LambdaKind, OrderByDirection, UnaryOperatorKind,
};
use crate::types::{PrimitiveKind, PrimitiveValue, TypeRef};

use super::state::RangeVariable;

const BOOLEAN: TypeRef = TypeRef::Primitive(PrimitiveKind::Boolean);

/// Typed expression-tree node.
///
/// Variants are partitioned by cardinality: `EntitySet`,
/// `CollectionPropertyAccess`, `CollectionFunctionCall` and `CollectionCast`
/// are collection-valued, everything else is single-valued.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A constant value from a literal.
    Constant {
        value: PrimitiveValue,
        /// None for the `null` literal.
        type_ref: Option<TypeRef>,
    },
    /// Implicit conversion widening the source to a broader type.
    Convert {
        source: Box<QueryNode>,
        type_ref: TypeRef,
    },
    /// Access to a declared single-valued property.
    PropertyAccess {
        source: Box<QueryNode>,
        property: String,
        type_ref: TypeRef,
    },
    /// Access to an undeclared property of an open type; dynamically typed.
    OpenPropertyAccess {
        source: Box<QueryNode>,
        property: String,
    },
    /// A bound unary operator.
    UnaryOperator {
        op: UnaryOperatorKind,
        operand: Box<QueryNode>,
        type_ref: Option<TypeRef>,
    },
    /// A bound binary operator over promoted operands.
    BinaryOperator {
        op: BinaryOperatorKind,
        left: Box<QueryNode>,
        right: Box<QueryNode>,
        type_ref: Option<TypeRef>,
    },
    /// A call to a single-valued function overload.
    SingleValueFunctionCall {
        name: String,
        arguments: Vec<QueryNode>,
        type_ref: TypeRef,
    },
    /// A cast of a single entity to a derived type.
    SingleEntityCast {
        source: Box<QueryNode>,
        type_ref: TypeRef,
    },
    /// A reference to a range variable in scope.
    RangeVariableReference {
        name: String,
        type_ref: TypeRef,
    },
    /// A bound `any`/`all` lambda; boolean-valued.
    ///
    /// The lambda owns both the bound source collection and the range
    /// variable it introduced (None for parameterless `any()`).
    Lambda {
        kind: LambdaKind,
        source: Box<QueryNode>,
        body: Box<QueryNode>,
        range_variable: Option<RangeVariable>,
    },
    /// The collection of entities in an entity set.
    EntitySet {
        name: String,
        /// Always `Collection(Entity)`.
        type_ref: TypeRef,
    },
    /// Access to a collection-valued structural or navigation property.
    CollectionPropertyAccess {
        source: Box<QueryNode>,
        property: String,
        /// Always a collection type.
        type_ref: TypeRef,
    },
    /// A call to a collection-valued function overload.
    CollectionFunctionCall {
        name: String,
        arguments: Vec<QueryNode>,
        type_ref: TypeRef,
    },
    /// A cast of a collection to a collection of a derived type.
    CollectionCast {
        source: Box<QueryNode>,
        type_ref: TypeRef,
    },
}

impl QueryNode {
    /// Returns the resolved type reference, or None for dynamic values.
    #[must_use]
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            QueryNode::Constant { type_ref, .. }
            | QueryNode::UnaryOperator { type_ref, .. }
            | QueryNode::BinaryOperator { type_ref, .. } => type_ref.as_ref(),
            QueryNode::Convert { type_ref, .. }
            | QueryNode::PropertyAccess { type_ref, .. }
            | QueryNode::SingleValueFunctionCall { type_ref, .. }
            | QueryNode::SingleEntityCast { type_ref, .. }
            | QueryNode::RangeVariableReference { type_ref, .. }
            | QueryNode::EntitySet { type_ref, .. }
            | QueryNode::CollectionPropertyAccess { type_ref, .. }
            | QueryNode::CollectionFunctionCall { type_ref, .. }
            | QueryNode::CollectionCast { type_ref, .. } => Some(type_ref),
            QueryNode::OpenPropertyAccess { .. } => None,
            QueryNode::Lambda { .. } => Some(&BOOLEAN),
        }
    }

    /// Returns true for collection-valued nodes.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            QueryNode::EntitySet { .. }
                | QueryNode::CollectionPropertyAccess { .. }
                | QueryNode::CollectionFunctionCall { .. }
                | QueryNode::CollectionCast { .. }
        )
    }

    /// Returns true for single-valued nodes.
    #[must_use]
    pub fn is_single_value(&self) -> bool {
        !self.is_collection()
    }

    /// Returns the variant name, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            QueryNode::Constant { .. } => "Constant",
            QueryNode::Convert { .. } => "Convert",
            QueryNode::PropertyAccess { .. } => "PropertyAccess",
            QueryNode::OpenPropertyAccess { .. } => "OpenPropertyAccess",
            QueryNode::UnaryOperator { .. } => "UnaryOperator",
            QueryNode::BinaryOperator { .. } => "BinaryOperator",
            QueryNode::SingleValueFunctionCall { .. } => "SingleValueFunctionCall",
            QueryNode::SingleEntityCast { .. } => "SingleEntityCast",
            QueryNode::RangeVariableReference { .. } => "RangeVariableReference",
            QueryNode::Lambda { .. } => "Lambda",
            QueryNode::EntitySet { .. } => "EntitySet",
            QueryNode::CollectionPropertyAccess { .. } => "CollectionPropertyAccess",
            QueryNode::CollectionFunctionCall { .. } => "CollectionFunctionCall",
            QueryNode::CollectionCast { .. } => "CollectionCast",
        }
    }

    /// Returns the display name of this node's type, with the `<null>`
    /// placeholder for dynamic values.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.type_ref()
            .map_or_else(|| "<null>".to_string(), TypeRef::name)
    }
}

/// Bound `$filter`: a boolean expression over one range variable.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// The bound boolean expression.
    pub expression: QueryNode,
    /// The implicit range variable the expression ranges over.
    pub range_variable: RangeVariable,
}

/// Bound `$orderby`: ordered sort items.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    /// Sort items in source order.
    pub items: Vec<OrderByItem>,
}

/// One bound `$orderby` item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    /// The bound sort expression.
    pub expression: QueryNode,
    /// Sort direction.
    pub direction: OrderByDirection,
}

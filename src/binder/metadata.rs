//! The metadata binder: the polymorphic dispatch from tokens to nodes.

use tracing::debug;

use crate::error::{Result, UriqError};
use crate::model::{EntityModel, PropertyResolution};
use crate::parser::token::{OrderByToken, QueryToken};
use crate::types::TypeRef;

use super::node::{FilterClause, OrderByClause, OrderByItem, QueryNode};
use super::state::{BindingState, RangeVariable};

/// Binds token trees to node trees against an entity model.
///
/// The model is only read during binding, so one binder can serve concurrent
/// binds of independent query options.
pub struct MetadataBinder<'a> {
    model: &'a EntityModel,
    /// Element type of the collection the implicit range variable ranges over.
    element_type: TypeRef,
}

impl<'a> MetadataBinder<'a> {
    /// Creates a binder targeting a collection of `element_type` instances.
    #[must_use]
    pub fn new(model: &'a EntityModel, element_type: TypeRef) -> Self {
        MetadataBinder {
            model,
            element_type,
        }
    }

    /// Returns the entity model the binder resolves against.
    #[must_use]
    pub fn model(&self) -> &EntityModel {
        self.model
    }

    /// Returns the element type the implicit range variable ranges over.
    #[must_use]
    pub fn element_type(&self) -> &TypeRef {
        &self.element_type
    }

    /// Creates the binding state for one top-level bind, seeded with the
    /// implicit `$it` range variable.
    #[must_use]
    pub fn new_state(&self) -> BindingState {
        BindingState::new(RangeVariable::new("$it", self.element_type.clone()))
    }

    /// Binds a `$filter` token tree; the expression must be boolean-valued
    /// (or dynamically typed).
    pub fn bind_filter(&self, token: &QueryToken) -> Result<FilterClause> {
        debug!(target: "uriq::binder", "binding $filter");
        let mut state = self.new_state();
        let expression = self.bind(token, &mut state)?;
        if !expression.is_single_value() {
            return Err(UriqError::OperandNotSingleValue {
                operator: "$filter".to_string(),
            });
        }
        if !is_boolean_or_unknown(&expression) {
            return Err(UriqError::FilterExpressionNotBoolean {
                type_name: expression.type_name(),
            });
        }
        let range_variable = state.implicit().clone();
        Ok(FilterClause {
            expression,
            range_variable,
        })
    }

    /// Binds `$orderby` items; every expression must be single-valued.
    pub fn bind_orderby(&self, tokens: &[OrderByToken]) -> Result<OrderByClause> {
        debug!(target: "uriq::binder", items = tokens.len(), "binding $orderby");
        let mut items = Vec::with_capacity(tokens.len());
        for token in tokens {
            let mut state = self.new_state();
            let expression = self.bind(&token.expression, &mut state)?;
            if !expression.is_single_value() {
                return Err(UriqError::OperandNotSingleValue {
                    operator: "$orderby".to_string(),
                });
            }
            items.push(OrderByItem {
                expression,
                direction: token.direction,
            });
        }
        Ok(OrderByClause { items })
    }

    /// Binds a path token chain rooted at the implicit range variable.
    pub fn bind_path(&self, token: &QueryToken) -> Result<QueryNode> {
        debug!(target: "uriq::binder", "binding path");
        let mut state = self.new_state();
        self.bind(token, &mut state)
    }

    /// The single polymorphic entry point: total dispatch over every token
    /// variant. Children are bound in declared left-to-right order (parent
    /// before body for lambdas) because scope effects are order-dependent.
    pub fn bind(&self, token: &QueryToken, state: &mut BindingState) -> Result<QueryNode> {
        match token {
            QueryToken::Literal(literal) => Ok(QueryNode::Constant {
                type_ref: literal.value.kind().map(TypeRef::primitive),
                value: literal.value.clone(),
            }),
            QueryToken::BinaryOperator { op, left, right } => {
                self.bind_binary_operator(*op, left, right, state)
            }
            QueryToken::UnaryOperator { op, operand } => {
                self.bind_unary_operator(*op, operand, state)
            }
            QueryToken::FunctionCall { name, arguments } => {
                self.bind_function_call(name, arguments, state)
            }
            QueryToken::Lambda {
                kind,
                parent,
                parameter,
                body,
            } => self.bind_lambda(*kind, parent, parameter.as_deref(), body, state),
            QueryToken::EndPath { identifier, parent }
            | QueryToken::InnerPath { identifier, parent } => {
                let source = self.bind_parent(parent.as_deref(), state)?;
                self.bind_property_access(source, identifier)
            }
            QueryToken::DottedIdentifier { name, parent } => {
                let source = self.bind_parent(parent.as_deref(), state)?;
                self.bind_type_cast(source, name)
            }
            QueryToken::RangeVariable { name } => {
                let variable = state.lookup(name).ok_or_else(|| {
                    UriqError::UnresolvedIdentifier {
                        identifier: name.clone(),
                        context: "range variable".to_string(),
                    }
                })?;
                Ok(QueryNode::RangeVariableReference {
                    name: variable.name.clone(),
                    type_ref: variable.element_type.clone(),
                })
            }
            // These bind through their dedicated entry points; reaching the
            // expression dispatcher is a caller error, reported, never dropped.
            QueryToken::FunctionParameter { .. }
            | QueryToken::Star
            | QueryToken::Select(_)
            | QueryToken::OrderBy(_)
            | QueryToken::Expand(_)
            | QueryToken::ExpandTerm(_)
            | QueryToken::CustomQueryOption(_) => Err(UriqError::UnsupportedToken {
                kind: token.kind_name(),
                context: "expression",
            }),
        }
    }

    /// Binds the parent of a path segment. A missing parent means the
    /// segment is relative to the implicit range variable.
    pub(crate) fn bind_parent(
        &self,
        parent: Option<&QueryToken>,
        state: &mut BindingState,
    ) -> Result<QueryNode> {
        match parent {
            Some(token) => self.bind(token, state),
            None => {
                let implicit = state.implicit();
                Ok(QueryNode::RangeVariableReference {
                    name: implicit.name.clone(),
                    type_ref: implicit.element_type.clone(),
                })
            }
        }
    }

    /// Resolves one property name against the bound source node.
    fn bind_property_access(&self, source: QueryNode, property: &str) -> Result<QueryNode> {
        if source.is_collection() {
            return Err(UriqError::InvalidPropertyAccess {
                property: property.to_string(),
                source_type: source.type_name(),
            });
        }
        let Some(source_type) = source.type_ref() else {
            // Property of an open property stays dynamically typed.
            return Ok(QueryNode::OpenPropertyAccess {
                source: Box::new(source),
                property: property.to_string(),
            });
        };
        let Some(entity_name) = source_type.entity_name().map(str::to_string) else {
            return Err(UriqError::InvalidPropertyAccess {
                property: property.to_string(),
                source_type: source.type_name(),
            });
        };

        match self.model.resolve_property(&entity_name, property) {
            Some(PropertyResolution::Structural(declared)) => {
                let type_ref = declared.type_ref.clone();
                Ok(if type_ref.is_collection() {
                    QueryNode::CollectionPropertyAccess {
                        source: Box::new(source),
                        property: property.to_string(),
                        type_ref,
                    }
                } else {
                    QueryNode::PropertyAccess {
                        source: Box::new(source),
                        property: property.to_string(),
                        type_ref,
                    }
                })
            }
            Some(PropertyResolution::Navigation(declared)) => {
                let type_ref = declared.type_ref();
                Ok(if declared.collection {
                    QueryNode::CollectionPropertyAccess {
                        source: Box::new(source),
                        property: property.to_string(),
                        type_ref,
                    }
                } else {
                    QueryNode::PropertyAccess {
                        source: Box::new(source),
                        property: property.to_string(),
                        type_ref,
                    }
                })
            }
            None if self.model.is_open(&entity_name) => Ok(QueryNode::OpenPropertyAccess {
                source: Box::new(source),
                property: property.to_string(),
            }),
            None => Err(UriqError::UnresolvedIdentifier {
                identifier: property.to_string(),
                context: format!("property of {entity_name}"),
            }),
        }
    }

    /// Binds a dotted identifier segment as a type cast.
    fn bind_type_cast(&self, source: QueryNode, target: &str) -> Result<QueryNode> {
        if self.model.entity_type(target).is_none() {
            return Err(UriqError::UnresolvedIdentifier {
                identifier: target.to_string(),
                context: "entity type".to_string(),
            });
        }

        let source_entity = match source.type_ref() {
            Some(TypeRef::Entity(name)) => name.clone(),
            Some(TypeRef::Collection(element)) => match element.as_ref() {
                TypeRef::Entity(name) => {
                    let name = name.clone();
                    if !self.model.is_assignable(target, &name)
                        && !self.model.is_assignable(&name, target)
                    {
                        return Err(UriqError::InvalidTypeCast {
                            target: target.to_string(),
                            source: source.type_name(),
                        });
                    }
                    return Ok(QueryNode::CollectionCast {
                        source: Box::new(source),
                        type_ref: TypeRef::collection(TypeRef::entity(target)),
                    });
                }
                _ => {
                    return Err(UriqError::InvalidTypeCast {
                        target: target.to_string(),
                        source: source.type_name(),
                    })
                }
            },
            _ => {
                return Err(UriqError::InvalidTypeCast {
                    target: target.to_string(),
                    source: source.type_name(),
                })
            }
        };

        if !self.model.is_assignable(target, &source_entity)
            && !self.model.is_assignable(&source_entity, target)
        {
            return Err(UriqError::InvalidTypeCast {
                target: target.to_string(),
                source: source_entity,
            });
        }
        Ok(QueryNode::SingleEntityCast {
            source: Box::new(source),
            type_ref: TypeRef::entity(target),
        })
    }
}

/// Returns true when the node is boolean-valued or dynamically typed.
pub(crate) fn is_boolean_or_unknown(node: &QueryNode) -> bool {
    match node.type_ref() {
        None => true,
        Some(type_ref) => {
            type_ref.primitive_kind() == Some(crate::types::PrimitiveKind::Boolean)
        }
    }
}

//! Unary and binary operator binders.
//!
//! Operands are bound through the dispatcher first, checked to be single
//! values, then pushed through type promotion. A `Convert` node wraps any
//! operand whose promoted type is wider than its own.

use crate::error::{Result, UriqError};
use crate::parser::token::{BinaryOperatorKind, QueryToken, UnaryOperatorKind};
use crate::types::{PrimitiveKind, TypeRef};

use super::metadata::MetadataBinder;
use super::node::QueryNode;
use super::promote::{promote_binary, promote_unary};
use super::state::BindingState;

impl MetadataBinder<'_> {
    pub(crate) fn bind_binary_operator(
        &self,
        op: BinaryOperatorKind,
        left: &QueryToken,
        right: &QueryToken,
        state: &mut BindingState,
    ) -> Result<QueryNode> {
        let left = self.bind(left, state)?;
        let right = self.bind(right, state)?;

        if !left.is_single_value() || !right.is_single_value() {
            return Err(UriqError::OperandNotSingleValue {
                operator: op.text().to_string(),
            });
        }

        let incompatible = || UriqError::IncompatibleOperandTypes {
            operator: op.text().to_string(),
            left: left.type_name(),
            right: right.type_name(),
        };

        // Only primitive types participate in promotion; an entity-typed
        // operand has no legal widening.
        let left_kind = operand_kind(&left).map_err(|()| incompatible())?;
        let right_kind = operand_kind(&right).map_err(|()| incompatible())?;

        let promoted = promote_binary(op, left_kind, right_kind).ok_or_else(incompatible)?;

        let result_type = promoted.result.map(TypeRef::primitive);
        let left = convert_if_widened(left, left_kind, promoted.left);
        let right = convert_if_widened(right, right_kind, promoted.right);

        Ok(QueryNode::BinaryOperator {
            op,
            left: Box::new(left),
            right: Box::new(right),
            type_ref: result_type,
        })
    }

    pub(crate) fn bind_unary_operator(
        &self,
        op: UnaryOperatorKind,
        operand: &QueryToken,
        state: &mut BindingState,
    ) -> Result<QueryNode> {
        let operand = self.bind(operand, state)?;
        if !operand.is_single_value() {
            return Err(UriqError::OperandNotSingleValue {
                operator: op.text().to_string(),
            });
        }

        let incompatible = || UriqError::IncompatibleOperandTypes {
            operator: op.text().to_string(),
            left: operand.type_name(),
            right: "<null>".to_string(),
        };

        let kind = operand_kind(&operand).map_err(|()| incompatible())?;
        let promoted = promote_unary(op, kind).ok_or_else(incompatible)?;

        let result_type = promoted.result.map(TypeRef::primitive);
        let operand = convert_if_widened(operand, kind, promoted.operand);

        Ok(QueryNode::UnaryOperator {
            op,
            operand: Box::new(operand),
            type_ref: result_type,
        })
    }
}

/// Extracts the operand's primitive kind: None for dynamic values, Err for
/// entity-typed operands, which never promote.
fn operand_kind(node: &QueryNode) -> std::result::Result<Option<PrimitiveKind>, ()> {
    match node.type_ref() {
        None => Ok(None),
        Some(type_ref) => type_ref.primitive_kind().map(Some).ok_or(()),
    }
}

/// Wraps the operand in a `Convert` node when promotion selected a type the
/// operand does not already have.
fn convert_if_widened(
    node: QueryNode,
    current: Option<PrimitiveKind>,
    target: Option<PrimitiveKind>,
) -> QueryNode {
    match target {
        Some(target_kind) if current != Some(target_kind) => QueryNode::Convert {
            source: Box::new(node),
            type_ref: TypeRef::primitive(target_kind),
        },
        _ => node,
    }
}

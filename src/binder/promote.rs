//! Type promotion rules for operator binding.
//!
//! Pure functions over (operator kind, operand primitive kinds). Binders call
//! these speculatively, so the functions hold no state and the same inputs
//! always yield the same result. Promotion is idempotent: feeding a promoted
//! result back in yields the same types.
//!
//! Numeric widening follows a fixed order: SByte/Byte widen to Int16, then
//! Int32, Int64, Single, Double. Every integral also widens to Decimal, but
//! Decimal does not mix with Single or Double. When neither operand widens to
//! the other, the common type is the first type in the order both widen to,
//! so SByte vs Byte promotes to Int16 rather than anything wider.
//!
//! A None operand kind is an unknown type (an open property or the `null`
//! literal); it promotes to whatever the known side fixes.

use crate::parser::token::{BinaryOperatorKind, UnaryOperatorKind};
use crate::types::PrimitiveKind;

/// Target operand types and result type selected for a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotedOperands {
    /// Type the left operand must be widened to (None = stays unknown).
    pub left: Option<PrimitiveKind>,
    /// Type the right operand must be widened to (None = stays unknown).
    pub right: Option<PrimitiveKind>,
    /// Result type of the operation (None = undecidable, both sides unknown).
    pub result: Option<PrimitiveKind>,
}

/// Target operand type and result type selected for a unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotedOperand {
    /// Type the operand must be widened to (None = stays unknown).
    pub operand: Option<PrimitiveKind>,
    /// Result type of the operation.
    pub result: Option<PrimitiveKind>,
}

/// Selects operand and result types for a binary operator, or None when no
/// widening makes the operands legal.
#[must_use]
pub fn promote_binary(
    op: BinaryOperatorKind,
    left: Option<PrimitiveKind>,
    right: Option<PrimitiveKind>,
) -> Option<PromotedOperands> {
    if op.is_logical() {
        let ok = |side: Option<PrimitiveKind>| {
            side.is_none() || side == Some(PrimitiveKind::Boolean)
        };
        if ok(left) && ok(right) {
            return Some(PromotedOperands {
                left: Some(PrimitiveKind::Boolean),
                right: Some(PrimitiveKind::Boolean),
                result: Some(PrimitiveKind::Boolean),
            });
        }
        return None;
    }

    if op.is_equality() || op.is_relational() {
        let common = match (left, right) {
            (None, None) => None,
            (Some(k), None) | (None, Some(k)) => Some(k),
            (Some(l), Some(r)) => Some(common_primitive(l, r)?),
        };
        if op.is_relational() {
            if let Some(k) = common {
                if !k.is_orderable() {
                    return None;
                }
            }
        }
        return Some(PromotedOperands {
            left: common,
            right: common,
            result: Some(PrimitiveKind::Boolean),
        });
    }

    // Arithmetic: both operands must be numeric where known.
    debug_assert!(op.is_arithmetic());
    let common = match (left, right) {
        (None, None) => None,
        (Some(k), None) | (None, Some(k)) => {
            if !k.is_numeric() {
                return None;
            }
            Some(k)
        }
        (Some(l), Some(r)) => {
            if !l.is_numeric() || !r.is_numeric() {
                return None;
            }
            Some(common_primitive(l, r)?)
        }
    };
    Some(PromotedOperands {
        left: common,
        right: common,
        result: common,
    })
}

/// Selects the operand and result type for a unary operator, or None when the
/// operand kind is illegal for it.
#[must_use]
pub fn promote_unary(
    op: UnaryOperatorKind,
    operand: Option<PrimitiveKind>,
) -> Option<PromotedOperand> {
    match op {
        UnaryOperatorKind::Not => match operand {
            None | Some(PrimitiveKind::Boolean) => Some(PromotedOperand {
                operand: Some(PrimitiveKind::Boolean),
                result: Some(PrimitiveKind::Boolean),
            }),
            Some(_) => None,
        },
        UnaryOperatorKind::Negate => match operand {
            None => Some(PromotedOperand {
                operand: None,
                result: None,
            }),
            Some(k) if k.is_numeric() => Some(PromotedOperand {
                operand: Some(k),
                result: Some(k),
            }),
            Some(_) => None,
        },
    }
}

/// Returns true if `from` widens to `to` without loss of range.
#[must_use]
pub fn widens_to(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    if from == to {
        return true;
    }
    match to {
        PrimitiveKind::Decimal => from.is_integral(),
        PrimitiveKind::Double => from.is_integral() || from == PrimitiveKind::Single,
        PrimitiveKind::Single => from.is_integral(),
        PrimitiveKind::Int16 | PrimitiveKind::Int32 | PrimitiveKind::Int64 => {
            from.is_integral() && integral_rank(from) < integral_rank(to)
        }
        _ => false,
    }
}

/// Common supertype of two primitive kinds, or None when none exists.
fn common_primitive(a: PrimitiveKind, b: PrimitiveKind) -> Option<PrimitiveKind> {
    if a == b {
        return Some(a);
    }
    if !a.is_numeric() || !b.is_numeric() {
        return None;
    }
    if widens_to(a, b) {
        return Some(b);
    }
    if widens_to(b, a) {
        return Some(a);
    }
    // Ties break toward the narrower common supertype (SByte vs Byte: Int16).
    WIDENING_ORDER
        .iter()
        .copied()
        .find(|k| widens_to(a, *k) && widens_to(b, *k))
}

const WIDENING_ORDER: [PrimitiveKind; 6] = [
    PrimitiveKind::Int16,
    PrimitiveKind::Int32,
    PrimitiveKind::Int64,
    PrimitiveKind::Single,
    PrimitiveKind::Double,
    PrimitiveKind::Decimal,
];

/// Width rank among integral kinds. SByte and Byte share a rank so neither
/// widens to the other.
fn integral_rank(kind: PrimitiveKind) -> u8 {
    match kind {
        PrimitiveKind::SByte | PrimitiveKind::Byte => 1,
        PrimitiveKind::Int16 => 2,
        PrimitiveKind::Int32 => 3,
        PrimitiveKind::Int64 => 4,
        _ => 0,
    }
}

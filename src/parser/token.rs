//! The untyped syntax-token model produced by parsing.
//!
//! Tokens carry only syntactic data: raw identifier text, raw literal text,
//! operator kinds and owned sub-tokens. No model resolution has happened yet.
//! Tokens are immutable once constructed and tree-shaped: each child is owned
//! by exactly one parent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::PrimitiveValue;

/// Binary operator kinds, in the order the expression grammar binds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    /// `or`.
    Or,
    /// `and`.
    And,
    /// `eq`.
    Equal,
    /// `ne`.
    NotEqual,
    /// `gt`.
    GreaterThan,
    /// `ge`.
    GreaterThanOrEqual,
    /// `lt`.
    LessThan,
    /// `le`.
    LessThanOrEqual,
    /// `add`.
    Add,
    /// `sub`.
    Subtract,
    /// `mul`.
    Multiply,
    /// `div`.
    Divide,
    /// `mod`.
    Modulo,
}

impl BinaryOperatorKind {
    /// Returns the operator keyword as written in query text.
    #[must_use]
    pub fn text(&self) -> &'static str {
        match self {
            BinaryOperatorKind::Or => "or",
            BinaryOperatorKind::And => "and",
            BinaryOperatorKind::Equal => "eq",
            BinaryOperatorKind::NotEqual => "ne",
            BinaryOperatorKind::GreaterThan => "gt",
            BinaryOperatorKind::GreaterThanOrEqual => "ge",
            BinaryOperatorKind::LessThan => "lt",
            BinaryOperatorKind::LessThanOrEqual => "le",
            BinaryOperatorKind::Add => "add",
            BinaryOperatorKind::Subtract => "sub",
            BinaryOperatorKind::Multiply => "mul",
            BinaryOperatorKind::Divide => "div",
            BinaryOperatorKind::Modulo => "mod",
        }
    }

    /// Parses an operator keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "or" => Some(BinaryOperatorKind::Or),
            "and" => Some(BinaryOperatorKind::And),
            "eq" => Some(BinaryOperatorKind::Equal),
            "ne" => Some(BinaryOperatorKind::NotEqual),
            "gt" => Some(BinaryOperatorKind::GreaterThan),
            "ge" => Some(BinaryOperatorKind::GreaterThanOrEqual),
            "lt" => Some(BinaryOperatorKind::LessThan),
            "le" => Some(BinaryOperatorKind::LessThanOrEqual),
            "add" => Some(BinaryOperatorKind::Add),
            "sub" => Some(BinaryOperatorKind::Subtract),
            "mul" => Some(BinaryOperatorKind::Multiply),
            "div" => Some(BinaryOperatorKind::Divide),
            "mod" => Some(BinaryOperatorKind::Modulo),
            _ => None,
        }
    }

    /// Returns true for `and`/`or`.
    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperatorKind::And | BinaryOperatorKind::Or)
    }

    /// Returns true for `eq`/`ne`.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            BinaryOperatorKind::Equal | BinaryOperatorKind::NotEqual
        )
    }

    /// Returns true for `gt`/`ge`/`lt`/`le`.
    #[must_use]
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOperatorKind::GreaterThan
                | BinaryOperatorKind::GreaterThanOrEqual
                | BinaryOperatorKind::LessThan
                | BinaryOperatorKind::LessThanOrEqual
        )
    }

    /// Returns true for `add`/`sub`/`mul`/`div`/`mod`.
    #[must_use]
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperatorKind::Add
                | BinaryOperatorKind::Subtract
                | BinaryOperatorKind::Multiply
                | BinaryOperatorKind::Divide
                | BinaryOperatorKind::Modulo
        )
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Unary operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorKind {
    /// `not`.
    Not,
    /// `-` (numeric negation).
    Negate,
}

impl UnaryOperatorKind {
    /// Returns the operator text as written in query text.
    #[must_use]
    pub fn text(&self) -> &'static str {
        match self {
            UnaryOperatorKind::Not => "not",
            UnaryOperatorKind::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Lambda kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LambdaKind {
    /// `any`: true if any element satisfies the body.
    Any,
    /// `all`: true if every element satisfies the body.
    All,
}

impl LambdaKind {
    /// Returns the keyword as written in query text.
    #[must_use]
    pub fn text(&self) -> &'static str {
        match self {
            LambdaKind::Any => "any",
            LambdaKind::All => "all",
        }
    }
}

impl fmt::Display for LambdaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Ascending or descending order for `$orderby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderByDirection {
    /// `asc` (the default).
    Ascending,
    /// `desc`.
    Descending,
}

/// A literal token: the raw source text plus its lexed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralToken {
    /// The literal text as written.
    pub text: String,
    /// The lexed value.
    pub value: PrimitiveValue,
}

impl LiteralToken {
    /// Creates a literal token.
    #[must_use]
    pub fn new(text: impl Into<String>, value: PrimitiveValue) -> Self {
        LiteralToken {
            text: text.into(),
            value,
        }
    }
}

/// A parsed `$select` option: comma-separated paths or stars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectToken {
    /// Each entry is a `Star` token or an `EndPath`/`InnerPath` chain.
    pub selected: Vec<QueryToken>,
}

/// One `$orderby` item: an expression plus a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByToken {
    /// The ordering expression.
    pub expression: Box<QueryToken>,
    /// Sort direction.
    pub direction: OrderByDirection,
}

/// A parsed `$expand` option: a list of expand terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandToken {
    /// The expand terms, in source order.
    pub terms: Vec<ExpandTermToken>,
}

/// One `$expand` term: a navigation name with optional nested options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandTermToken {
    /// The navigation property name being expanded.
    pub navigation: String,
    /// Nested `$select`, if present.
    pub select: Option<SelectToken>,
    /// Nested `$expand`, if present.
    pub expand: Option<ExpandToken>,
}

/// A custom (non-`$`-prefixed) query option, carried through unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomQueryOptionToken {
    /// Option name.
    pub name: String,
    /// Raw option value.
    pub value: String,
}

/// Untyped syntax-tree node produced by parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// A literal value.
    Literal(LiteralToken),
    /// A binary operator application.
    BinaryOperator {
        op: BinaryOperatorKind,
        left: Box<QueryToken>,
        right: Box<QueryToken>,
    },
    /// A unary operator application.
    UnaryOperator {
        op: UnaryOperatorKind,
        operand: Box<QueryToken>,
    },
    /// A function call with positional parameters.
    FunctionCall {
        name: String,
        arguments: Vec<QueryToken>,
    },
    /// One function-call argument, optionally named.
    FunctionParameter {
        name: Option<String>,
        value: Box<QueryToken>,
    },
    /// An `any`/`all` lambda over a collection-valued parent.
    Lambda {
        kind: LambdaKind,
        parent: Box<QueryToken>,
        parameter: Option<String>,
        body: Box<QueryToken>,
    },
    /// A dot-qualified identifier segment (a type-cast segment).
    DottedIdentifier {
        name: String,
        parent: Option<Box<QueryToken>>,
    },
    /// The last segment of an identifier path. A None parent means the path
    /// is relative to the implicit range variable.
    EndPath {
        identifier: String,
        parent: Option<Box<QueryToken>>,
    },
    /// A non-terminal segment of an identifier path.
    InnerPath {
        identifier: String,
        parent: Option<Box<QueryToken>>,
    },
    /// A reference to a range variable currently in scope.
    RangeVariable { name: String },
    /// The `*` wildcard inside `$select`.
    Star,
    /// A parsed `$select` option.
    Select(SelectToken),
    /// A parsed `$orderby` item.
    OrderBy(OrderByToken),
    /// A parsed `$expand` option.
    Expand(ExpandToken),
    /// One `$expand` term.
    ExpandTerm(ExpandTermToken),
    /// A custom query option.
    CustomQueryOption(CustomQueryOptionToken),
}

impl QueryToken {
    /// Returns the variant name, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            QueryToken::Literal(_) => "Literal",
            QueryToken::BinaryOperator { .. } => "BinaryOperator",
            QueryToken::UnaryOperator { .. } => "UnaryOperator",
            QueryToken::FunctionCall { .. } => "FunctionCall",
            QueryToken::FunctionParameter { .. } => "FunctionParameter",
            QueryToken::Lambda { .. } => "Lambda",
            QueryToken::DottedIdentifier { .. } => "DottedIdentifier",
            QueryToken::EndPath { .. } => "EndPath",
            QueryToken::InnerPath { .. } => "InnerPath",
            QueryToken::RangeVariable { .. } => "RangeVariable",
            QueryToken::Star => "Star",
            QueryToken::Select(_) => "Select",
            QueryToken::OrderBy(_) => "OrderBy",
            QueryToken::Expand(_) => "Expand",
            QueryToken::ExpandTerm(_) => "ExpandTerm",
            QueryToken::CustomQueryOption(_) => "CustomQueryOption",
        }
    }

    /// Creates a literal token.
    #[must_use]
    pub fn literal(text: impl Into<String>, value: PrimitiveValue) -> Self {
        QueryToken::Literal(LiteralToken::new(text, value))
    }

    /// Creates a binary operator token.
    #[must_use]
    pub fn binary(op: BinaryOperatorKind, left: QueryToken, right: QueryToken) -> Self {
        QueryToken::BinaryOperator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a unary operator token.
    #[must_use]
    pub fn unary(op: UnaryOperatorKind, operand: QueryToken) -> Self {
        QueryToken::UnaryOperator {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates an end-path token.
    #[must_use]
    pub fn end_path(identifier: impl Into<String>, parent: Option<QueryToken>) -> Self {
        QueryToken::EndPath {
            identifier: identifier.into(),
            parent: parent.map(Box::new),
        }
    }

    /// Creates an inner-path token.
    #[must_use]
    pub fn inner_path(identifier: impl Into<String>, parent: Option<QueryToken>) -> Self {
        QueryToken::InnerPath {
            identifier: identifier.into(),
            parent: parent.map(Box::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_roundtrip() {
        for op in [
            BinaryOperatorKind::Or,
            BinaryOperatorKind::And,
            BinaryOperatorKind::Equal,
            BinaryOperatorKind::LessThan,
            BinaryOperatorKind::Modulo,
        ] {
            assert_eq!(BinaryOperatorKind::parse(op.text()), Some(op));
        }
        assert_eq!(BinaryOperatorKind::parse("xor"), None);
    }

    #[test]
    fn test_operator_categories() {
        assert!(BinaryOperatorKind::And.is_logical());
        assert!(BinaryOperatorKind::Equal.is_equality());
        assert!(BinaryOperatorKind::GreaterThanOrEqual.is_relational());
        assert!(BinaryOperatorKind::Modulo.is_arithmetic());
        assert!(!BinaryOperatorKind::Or.is_arithmetic());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(QueryToken::Star.kind_name(), "Star");
        let tok = QueryToken::end_path("Name", None);
        assert_eq!(tok.kind_name(), "EndPath");
        let lit = QueryToken::literal("5", PrimitiveValue::Int32(5));
        assert_eq!(lit.kind_name(), "Literal");
    }
}

//! Error types for query-option parsing, binding and validation.

use std::fmt;

use crate::parser::token::LambdaKind;
use crate::settings::QueryOptionKind;

/// Result type alias using [`UriqError`].
pub type Result<T> = std::result::Result<T, UriqError>;

/// Error types for query-option parsing, binding and validation.
///
/// Every failure is fatal to the current bind; callers receive one structured
/// error and no partial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriqError {
    /// Lexical or grammatical error in a query-option string.
    SyntaxError { position: usize, message: String },

    /// The parser crossed the configured recursion limit for an option.
    RecursionLimitExceeded {
        option_kind: QueryOptionKind,
        limit: u32,
    },

    /// An operator or function argument did not bind to a single value.
    OperandNotSingleValue { operator: String },

    /// Type promotion found no legal widening for the operand types.
    IncompatibleOperandTypes {
        operator: String,
        left: String,
        right: String,
    },

    /// `any`/`all` over a dynamically-typed collection property.
    OpenCollectionPropertiesNotSupported { property: String },

    /// `any`/`all` applied to a non-collection parent.
    LambdaParentMustBeCollection { kind: LambdaKind },

    /// An `any`/`all` body that is not boolean-valued.
    LambdaExpressionNotBoolean { kind: LambdaKind },

    /// The bound expansion tree is deeper than the configured ceiling.
    ExpandDepthExceeded { depth: u32, limit: u32 },

    /// The bound expansion tree has more items than the configured ceiling.
    ExpandCountExceeded { count: u32, limit: u32 },

    /// An identifier the entity model could not resolve.
    UnresolvedIdentifier { identifier: String, context: String },

    /// Property access on a source that has no properties.
    InvalidPropertyAccess {
        property: String,
        source_type: String,
    },

    /// A type cast whose target is not assignable from the source type.
    InvalidTypeCast { target: String, source: String },

    /// A function call matching no registered overload.
    FunctionSignatureMismatch { name: String, reason: String },

    /// A `$filter` expression that is not boolean-valued.
    FilterExpressionNotBoolean { type_name: String },

    /// A token kind reaching a binder that does not accept it.
    UnsupportedToken {
        kind: &'static str,
        context: &'static str,
    },

    /// An unrecognized `$`-prefixed query option.
    UnsupportedQueryOption(String),

    /// Entity-model construction errors (duplicate type, unknown base, etc.).
    ModelError(String),
}

// Display and Error are implemented by hand rather than via `thiserror`
// because the `source` field of `InvalidTypeCast` is part of the public API,
// and thiserror unconditionally treats a field named `source` as the error
// source (which must implement `std::error::Error`, and `String` does not).
impl fmt::Display for UriqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyntaxError { position, message } => {
                write!(f, "Syntax error at position {position}: {message}")
            }
            Self::RecursionLimitExceeded { option_kind, limit } => {
                write!(
                    f,
                    "Recursion limit of {limit} exceeded while parsing {option_kind}"
                )
            }
            Self::OperandNotSingleValue { operator } => {
                write!(f, "Operand of '{operator}' must be a single value")
            }
            Self::IncompatibleOperandTypes {
                operator,
                left,
                right,
            } => {
                write!(
                    f,
                    "Operator '{operator}' is incompatible with operand types {left} and {right}"
                )
            }
            Self::OpenCollectionPropertiesNotSupported { property } => {
                write!(
                    f,
                    "Open collection property '{property}' is not supported as a lambda parent"
                )
            }
            Self::LambdaParentMustBeCollection { kind } => {
                write!(f, "Parent of '{kind}' must be a collection")
            }
            Self::LambdaExpressionNotBoolean { kind } => {
                write!(f, "Body of '{kind}' must be a boolean expression")
            }
            Self::ExpandDepthExceeded { depth, limit } => {
                write!(f, "Expansion depth {depth} exceeds the limit of {limit}")
            }
            Self::ExpandCountExceeded { count, limit } => {
                write!(f, "Expansion count {count} exceeds the limit of {limit}")
            }
            Self::UnresolvedIdentifier {
                identifier,
                context,
            } => {
                write!(f, "Could not resolve '{identifier}' ({context})")
            }
            Self::InvalidPropertyAccess {
                property,
                source_type,
            } => {
                write!(
                    f,
                    "Cannot access property '{property}' on a value of type {source_type}"
                )
            }
            Self::InvalidTypeCast { target, source } => {
                write!(f, "Cannot cast {source} to {target}")
            }
            Self::FunctionSignatureMismatch { name, reason } => {
                write!(f, "No overload of '{name}' matches: {reason}")
            }
            Self::FilterExpressionNotBoolean { type_name } => {
                write!(f, "Filter expression must be boolean, not {type_name}")
            }
            Self::UnsupportedToken { kind, context } => {
                write!(f, "Unsupported {kind} token in {context}")
            }
            Self::UnsupportedQueryOption(option) => {
                write!(f, "Unsupported query option: {option}")
            }
            Self::ModelError(message) => {
                write!(f, "Model error: {message}")
            }
        }
    }
}

impl std::error::Error for UriqError {}

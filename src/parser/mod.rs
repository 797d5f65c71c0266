//! Syntactic parsing: query-option text to untyped token trees.

pub mod expression;
pub mod lexer;
pub mod path;
pub mod select_expand;
pub mod token;

pub use expression::{parse_filter, parse_orderby};
pub use path::parse_path;
pub use select_expand::{parse_expand, parse_select};
pub use token::{
    BinaryOperatorKind, CustomQueryOptionToken, ExpandTermToken, ExpandToken, LambdaKind,
    LiteralToken, OrderByDirection, OrderByToken, QueryToken, SelectToken, UnaryOperatorKind,
};

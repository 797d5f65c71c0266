//! Semantic binding: token trees to typed node trees.

pub mod function;
pub mod lambda;
pub mod metadata;
pub mod node;
pub mod operator;
pub mod promote;
pub mod select_expand;
pub mod state;

pub use metadata::MetadataBinder;
pub use node::{FilterClause, OrderByClause, OrderByItem, QueryNode};
pub use select_expand::{
    ExpandedNavigationSelectItem, PathSelectItem, SelectExpandClause, SelectedItem,
};
pub use state::{BindingState, RangeVariable};

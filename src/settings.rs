//! Parser settings: per-option recursion limits and expansion ceilings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The query-option kinds the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOptionKind {
    /// `$filter`.
    Filter,
    /// `$orderby`.
    OrderBy,
    /// `$select` / `$expand` (shared limit).
    SelectExpand,
    /// Resource path segments.
    Path,
    /// Custom (non-`$`-prefixed) option.
    Custom,
}

impl QueryOptionKind {
    /// Returns the option name as it appears in a query string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOptionKind::Filter => "$filter",
            QueryOptionKind::OrderBy => "$orderby",
            QueryOptionKind::SelectExpand => "$select/$expand",
            QueryOptionKind::Path => "path",
            QueryOptionKind::Custom => "custom",
        }
    }
}

impl fmt::Display for QueryOptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits and ceilings for parsing and validation.
///
/// The four `*_limit` fields are recursion-depth ceilings enforced while
/// parsing; `path_limit` is an exact segment-count ceiling, the others bound
/// sub-expression nesting. `max_expansion_depth` and `max_expansion_count`
/// are structural ceilings applied to the bound `$expand` tree after binding,
/// unbounded by default.
///
/// The limits are unsigned, so negative values are unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Maximum nesting depth of a `$filter` expression.
    pub filter_limit: u32,
    /// Maximum nesting depth of a `$orderby` expression.
    pub order_by_limit: u32,
    /// Maximum number of path segments (exact ceiling).
    pub path_limit: u32,
    /// Maximum nesting depth of `$expand` options within `$expand`.
    pub select_expand_limit: u32,
    /// Maximum depth of the bound expansion tree, or None for unbounded.
    pub max_expansion_depth: Option<u32>,
    /// Maximum number of expanded items across the bound tree, or None for
    /// unbounded.
    pub max_expansion_count: Option<u32>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        ParserSettings {
            filter_limit: 800,
            order_by_limit: 800,
            path_limit: 100,
            select_expand_limit: 800,
            max_expansion_depth: None,
            max_expansion_count: None,
        }
    }
}

impl ParserSettings {
    /// Creates settings with the default limits.
    #[must_use]
    pub fn new() -> Self {
        ParserSettings::default()
    }

    /// Sets the `$filter` recursion limit.
    #[must_use]
    pub fn with_filter_limit(mut self, limit: u32) -> Self {
        self.filter_limit = limit;
        self
    }

    /// Sets the `$orderby` recursion limit.
    #[must_use]
    pub fn with_order_by_limit(mut self, limit: u32) -> Self {
        self.order_by_limit = limit;
        self
    }

    /// Sets the path segment-count limit.
    #[must_use]
    pub fn with_path_limit(mut self, limit: u32) -> Self {
        self.path_limit = limit;
        self
    }

    /// Sets the `$select`/`$expand` recursion limit.
    #[must_use]
    pub fn with_select_expand_limit(mut self, limit: u32) -> Self {
        self.select_expand_limit = limit;
        self
    }

    /// Sets the maximum bound expansion depth.
    #[must_use]
    pub fn with_max_expansion_depth(mut self, depth: u32) -> Self {
        self.max_expansion_depth = Some(depth);
        self
    }

    /// Sets the maximum bound expansion count.
    #[must_use]
    pub fn with_max_expansion_count(mut self, count: u32) -> Self {
        self.max_expansion_count = Some(count);
        self
    }
}

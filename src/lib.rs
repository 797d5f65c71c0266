//! uriq - query-option compiler front end.
//!
//! Translates raw query-option text (`$filter`, `$orderby`, `$select`,
//! `$expand`, resource paths, custom options) into validated, type-checked
//! trees a query-execution or serialization consumer can walk safely.
//!
//! Two stages: a recursive-descent parse of each option string into an
//! untyped token tree under a per-option recursion limit, then a semantic
//! bind that resolves identifiers and operators against an [`EntityModel`],
//! promotes operand types and scopes `any`/`all` range variables. Bound
//! `$expand` trees pass a final depth/count validation.
//!
//! ```
//! use uriq::{EntityModel, EntityType, PrimitiveKind, QueryOptionParser, TypeRef};
//!
//! let mut model = EntityModel::new();
//! model
//!     .add_entity_type(
//!         EntityType::new("NS.Customer")
//!             .with_property("Name", TypeRef::primitive(PrimitiveKind::String))
//!             .with_property("Age", TypeRef::primitive(PrimitiveKind::Int32)),
//!     )
//!     .unwrap();
//! model.add_entity_set("Customers", "NS.Customer").unwrap();
//!
//! let parser = QueryOptionParser::new(&model, "Customers").unwrap();
//! let filter = parser.parse_filter("Age ge 21 and Name ne 'anonymous'").unwrap();
//! assert_eq!(filter.range_variable.name, "$it");
//! ```

pub mod binder;
pub mod error;
pub mod model;
pub mod parser;
pub mod settings;
pub mod types;
pub mod validator;

use tracing::debug;

pub use binder::{
    FilterClause, MetadataBinder, OrderByClause, OrderByItem, QueryNode, RangeVariable,
    SelectExpandClause, SelectedItem,
};
pub use error::{Result, UriqError};
pub use model::{EntityModel, EntitySet, EntityType, FunctionSignature};
pub use parser::{CustomQueryOptionToken, QueryToken};
pub use settings::{ParserSettings, QueryOptionKind};
pub use types::{PrimitiveKind, PrimitiveValue, TypeRef};

/// Parses and binds query options against one entity set of a model.
#[derive(Debug)]
pub struct QueryOptionParser<'a> {
    model: &'a EntityModel,
    entity_set: String,
    element_type: TypeRef,
    settings: ParserSettings,
}

impl<'a> QueryOptionParser<'a> {
    /// Creates a parser targeting the named entity set with default settings.
    pub fn new(model: &'a EntityModel, entity_set: &str) -> Result<Self> {
        let set = model
            .entity_set(entity_set)
            .ok_or_else(|| UriqError::UnresolvedIdentifier {
                identifier: entity_set.to_string(),
                context: "entity set".to_string(),
            })?;
        Ok(QueryOptionParser {
            model,
            entity_set: set.name.clone(),
            element_type: TypeRef::entity(set.element_type.clone()),
            settings: ParserSettings::default(),
        })
    }

    /// Replaces the parser settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ParserSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the settings in effect.
    #[must_use]
    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Returns the target entity set as a collection-valued node.
    #[must_use]
    pub fn entity_set_node(&self) -> QueryNode {
        QueryNode::EntitySet {
            name: self.entity_set.clone(),
            type_ref: TypeRef::collection(self.element_type.clone()),
        }
    }

    fn binder(&self) -> MetadataBinder<'a> {
        MetadataBinder::new(self.model, self.element_type.clone())
    }

    /// Parses and binds `$filter` text.
    pub fn parse_filter(&self, text: &str) -> Result<FilterClause> {
        debug!(target: "uriq", option = "$filter", "parsing query option");
        let token = parser::parse_filter(text, self.settings.filter_limit)?;
        self.binder().bind_filter(&token)
    }

    /// Parses and binds `$orderby` text.
    pub fn parse_orderby(&self, text: &str) -> Result<OrderByClause> {
        debug!(target: "uriq", option = "$orderby", "parsing query option");
        let tokens = parser::parse_orderby(text, self.settings.order_by_limit)?;
        self.binder().bind_orderby(&tokens)
    }

    /// Parses, binds and validates a `$select`/`$expand` pair. Either side
    /// may be absent; the bound clause is checked against the configured
    /// expansion ceilings.
    pub fn parse_select_expand(
        &self,
        select: Option<&str>,
        expand: Option<&str>,
    ) -> Result<SelectExpandClause> {
        debug!(target: "uriq", option = "$select/$expand", "parsing query option");
        let select_token = select.map(parser::parse_select).transpose()?;
        let expand_token = expand
            .map(|text| parser::parse_expand(text, self.settings.select_expand_limit))
            .transpose()?;
        let clause = self
            .binder()
            .bind_select_expand(select_token.as_ref(), expand_token.as_ref())?;
        validator::validate_select_expand(
            &clause,
            self.settings.max_expansion_depth,
            self.settings.max_expansion_count,
        )?;
        Ok(clause)
    }

    /// Parses and binds resource-path text relative to the entity set's
    /// element type.
    pub fn parse_path(&self, text: &str) -> Result<QueryNode> {
        debug!(target: "uriq", option = "path", "parsing query option");
        let token = parser::parse_path(text, self.settings.path_limit)?;
        self.binder().bind_path(&token)
    }

    /// Accepts a custom query option as an opaque token. `$`-prefixed names
    /// are reserved and rejected here.
    pub fn parse_custom_option(&self, name: &str, value: &str) -> Result<CustomQueryOptionToken> {
        if name.starts_with('$') {
            return Err(UriqError::UnsupportedQueryOption(name.to_string()));
        }
        Ok(CustomQueryOptionToken {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Parses a full set of query options, one per kind. Failures are
    /// independent per option and collected into a structured error list;
    /// any failure means no bound tree is returned.
    pub fn parse_query_options(
        &self,
        options: &[(&str, &str)],
    ) -> std::result::Result<BoundQueryOptions, Vec<UriqError>> {
        let mut errors = Vec::new();
        let mut filter = None;
        let mut order_by = None;
        let mut select = None;
        let mut expand = None;
        let mut custom = Vec::new();

        for (name, value) in options {
            match *name {
                "$filter" => match self.parse_filter(value) {
                    Ok(clause) => filter = Some(clause),
                    Err(error) => errors.push(error),
                },
                "$orderby" => match self.parse_orderby(value) {
                    Ok(clause) => order_by = Some(clause),
                    Err(error) => errors.push(error),
                },
                "$select" => select = Some(*value),
                "$expand" => expand = Some(*value),
                other if other.starts_with('$') => {
                    errors.push(UriqError::UnsupportedQueryOption(other.to_string()));
                }
                other => match self.parse_custom_option(other, value) {
                    Ok(token) => custom.push(token),
                    Err(error) => errors.push(error),
                },
            }
        }

        let select_expand = if select.is_some() || expand.is_some() {
            match self.parse_select_expand(select, expand) {
                Ok(clause) => Some(clause),
                Err(error) => {
                    errors.push(error);
                    None
                }
            }
        } else {
            None
        };

        if errors.is_empty() {
            Ok(BoundQueryOptions {
                target: self.entity_set_node(),
                filter,
                order_by,
                select_expand,
                custom,
            })
        } else {
            Err(errors)
        }
    }
}

/// The bound products of one full query-option parse.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQueryOptions {
    /// The entity set the options apply to.
    pub target: QueryNode,
    /// Bound `$filter`, if present.
    pub filter: Option<FilterClause>,
    /// Bound `$orderby`, if present.
    pub order_by: Option<OrderByClause>,
    /// Bound and validated `$select`/`$expand`, if either was present.
    pub select_expand: Option<SelectExpandClause>,
    /// Custom options, carried through unparsed.
    pub custom: Vec<CustomQueryOptionToken>,
}

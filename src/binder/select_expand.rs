//! The bound `$select`/`$expand` clause model and its binder.
//!
//! Clause types compare structurally (`PartialEq`) so redundant-expansion
//! pruning and tests can match on content.

use crate::error::{Result, UriqError};
use crate::model::PropertyResolution;
use crate::parser::token::{ExpandTermToken, ExpandToken, QueryToken, SelectToken};

use super::metadata::MetadataBinder;

/// A bound `$select`/`$expand` clause: an ordered sequence of selected items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectExpandClause {
    /// Selected items in source order, duplicates already pruned.
    pub selected_items: Vec<SelectedItem>,
    /// True when no `$select` narrowed the selection.
    pub all_selected: bool,
}

impl SelectExpandClause {
    /// A clause selecting everything and expanding nothing.
    #[must_use]
    pub fn all() -> Self {
        SelectExpandClause {
            selected_items: Vec::new(),
            all_selected: true,
        }
    }
}

/// One selected item of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedItem {
    /// A resolved property path.
    Path(PathSelectItem),
    /// The `*` wildcard.
    Wildcard,
    /// An expanded navigation with its own nested clause.
    ExpandedNavigation(ExpandedNavigationSelectItem),
}

/// A `$select` path, resolved segment by segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSelectItem {
    /// Path segments from the clause's element type.
    pub segments: Vec<String>,
}

/// An expanded navigation property and the clause applied to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedNavigationSelectItem {
    /// The expanded navigation property name.
    pub navigation: String,
    /// Qualified name of the navigation target type.
    pub target_type: String,
    /// The nested clause; selects everything when no options were given.
    pub select_expand: SelectExpandClause,
}

impl MetadataBinder<'_> {
    /// Binds a combined `$select`/`$expand` pair into one clause over the
    /// binder's element type.
    pub fn bind_select_expand(
        &self,
        select: Option<&SelectToken>,
        expand: Option<&ExpandToken>,
    ) -> Result<SelectExpandClause> {
        let element = self
            .element_entity_name()
            .ok_or_else(|| UriqError::ModelError(
                "select/expand requires an entity element type".to_string(),
            ))?
            .to_string();
        self.bind_select_expand_for(&element, select, expand)
    }

    fn bind_select_expand_for(
        &self,
        element_type: &str,
        select: Option<&SelectToken>,
        expand: Option<&ExpandToken>,
    ) -> Result<SelectExpandClause> {
        let mut selected_items = Vec::new();

        if let Some(expand) = expand {
            for term in &expand.terms {
                let item = self.bind_expand_term(element_type, term)?;
                let item = SelectedItem::ExpandedNavigation(item);
                // Structurally identical expand branches collapse to the
                // first occurrence before validation sees them.
                if !selected_items.contains(&item) {
                    selected_items.push(item);
                }
            }
        }

        if let Some(select) = select {
            for token in &select.selected {
                let item = self.bind_select_item(element_type, token)?;
                if !selected_items.contains(&item) {
                    selected_items.push(item);
                }
            }
        }

        Ok(SelectExpandClause {
            selected_items,
            all_selected: select.is_none(),
        })
    }

    fn bind_expand_term(
        &self,
        element_type: &str,
        term: &ExpandTermToken,
    ) -> Result<ExpandedNavigationSelectItem> {
        let Some(PropertyResolution::Navigation(navigation)) =
            self.model().resolve_property(element_type, &term.navigation)
        else {
            return Err(UriqError::UnresolvedIdentifier {
                identifier: term.navigation.clone(),
                context: format!("navigation property of {element_type}"),
            });
        };
        let target_type = navigation.target.clone();
        let select_expand = if term.select.is_some() || term.expand.is_some() {
            self.bind_select_expand_for(
                &target_type,
                term.select.as_ref(),
                term.expand.as_ref(),
            )?
        } else {
            SelectExpandClause::all()
        };
        Ok(ExpandedNavigationSelectItem {
            navigation: term.navigation.clone(),
            target_type,
            select_expand,
        })
    }

    fn bind_select_item(
        &self,
        element_type: &str,
        token: &QueryToken,
    ) -> Result<SelectedItem> {
        if matches!(token, QueryToken::Star) {
            return Ok(SelectedItem::Wildcard);
        }
        let mut segments = Vec::new();
        collect_segments(token, &mut segments)?;
        self.resolve_select_path(element_type, &segments)?;
        Ok(SelectedItem::Path(PathSelectItem { segments }))
    }

    /// Walks a `$select` path against the model: navigations step to their
    /// target type, a structural property must be the last segment, and
    /// unknown names are only legal on open types.
    fn resolve_select_path(&self, element_type: &str, segments: &[String]) -> Result<()> {
        let mut current = element_type.to_string();
        for (index, segment) in segments.iter().enumerate() {
            let last = index == segments.len() - 1;
            match self.model().resolve_property(&current, segment) {
                Some(PropertyResolution::Structural(_)) if last => {}
                Some(PropertyResolution::Structural(declared)) => {
                    return Err(UriqError::InvalidPropertyAccess {
                        property: segments[index + 1].clone(),
                        source_type: declared.type_ref.name(),
                    });
                }
                Some(PropertyResolution::Navigation(declared)) => {
                    current = declared.target.clone();
                }
                None if self.model().is_open(&current) => return Ok(()),
                None => {
                    return Err(UriqError::UnresolvedIdentifier {
                        identifier: segment.clone(),
                        context: format!("property of {current}"),
                    });
                }
            }
        }
        Ok(())
    }

    fn element_entity_name(&self) -> Option<&str> {
        self.element_type().entity_name()
    }
}

/// Flattens an `EndPath`/`InnerPath`/`DottedIdentifier` chain into segment
/// order.
fn collect_segments(token: &QueryToken, out: &mut Vec<String>) -> Result<()> {
    match token {
        QueryToken::EndPath { identifier, parent }
        | QueryToken::InnerPath { identifier, parent } => {
            if let Some(parent) = parent {
                collect_segments(parent, out)?;
            }
            out.push(identifier.clone());
            Ok(())
        }
        QueryToken::DottedIdentifier { name, parent } => {
            if let Some(parent) = parent {
                collect_segments(parent, out)?;
            }
            out.push(name.clone());
            Ok(())
        }
        other => Err(UriqError::UnsupportedToken {
            kind: other.kind_name(),
            context: "$select path",
        }),
    }
}

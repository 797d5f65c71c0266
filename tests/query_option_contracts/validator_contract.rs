//! Contracts for bound `$select`/`$expand` clauses and the post-bind
//! expansion ceilings, exercised through the public parser API.

use uriq::binder::SelectedItem;
use uriq::{ParserSettings, QueryOptionParser, SelectExpandClause, UriqError};

use super::sample_model;

fn bind(
    select: Option<&str>,
    expand: Option<&str>,
    settings: ParserSettings,
) -> Result<SelectExpandClause, UriqError> {
    let model = sample_model();
    let parser = QueryOptionParser::new(&model, "Customers")
        .unwrap()
        .with_settings(settings);
    parser.parse_select_expand(select, expand)
}

fn expanded_navigations(clause: &SelectExpandClause) -> Vec<&str> {
    clause
        .selected_items
        .iter()
        .filter_map(|item| match item {
            SelectedItem::ExpandedNavigation(expanded) => {
                Some(expanded.navigation.as_str())
            }
            _ => None,
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Select binding
// -----------------------------------------------------------------------------

#[test]
fn test_select_narrows_the_clause() {
    let clause = bind(Some("Name, Age"), None, ParserSettings::default()).unwrap();
    assert!(!clause.all_selected);
    assert_eq!(clause.selected_items.len(), 2);
    assert!(matches!(clause.selected_items[0], SelectedItem::Path(_)));
}

#[test]
fn test_absent_select_selects_everything() {
    let clause = bind(None, Some("Orders"), ParserSettings::default()).unwrap();
    assert!(clause.all_selected);
}

#[test]
fn test_select_wildcard() {
    let clause = bind(Some("*"), None, ParserSettings::default()).unwrap();
    assert_eq!(clause.selected_items, vec![SelectedItem::Wildcard]);
}

#[test]
fn test_select_path_steps_through_navigations() {
    let clause = bind(Some("Orders/Total"), None, ParserSettings::default()).unwrap();
    let SelectedItem::Path(path) = &clause.selected_items[0] else {
        panic!("expected path item");
    };
    assert_eq!(path.segments, vec!["Orders".to_string(), "Total".to_string()]);
}

#[test]
fn test_select_structural_property_must_end_the_path() {
    let err = bind(Some("Name/Length"), None, ParserSettings::default()).unwrap_err();
    assert_eq!(
        err,
        UriqError::InvalidPropertyAccess {
            property: "Length".into(),
            source_type: "Edm.String".into(),
        }
    );
}

#[test]
fn test_select_unknown_property_rejected_on_closed_types() {
    let err = bind(Some("Nmae"), None, ParserSettings::default()).unwrap_err();
    assert!(matches!(err, UriqError::UnresolvedIdentifier { .. }));
}

#[test]
fn test_select_unknown_tail_allowed_on_open_types() {
    assert!(bind(Some("Account/Anything"), None, ParserSettings::default()).is_ok());
}

// -----------------------------------------------------------------------------
// Expand binding
// -----------------------------------------------------------------------------

#[test]
fn test_expand_resolves_navigation_and_target() {
    let clause = bind(None, Some("Orders"), ParserSettings::default()).unwrap();
    let SelectedItem::ExpandedNavigation(expanded) = &clause.selected_items[0] else {
        panic!("expected expanded navigation");
    };
    assert_eq!(expanded.navigation, "Orders");
    assert_eq!(expanded.target_type, "NS.Order");
    assert!(expanded.select_expand.all_selected);
}

#[test]
fn test_expand_nested_select_binds_against_target_type() {
    let clause = bind(
        None,
        Some("Orders($select=Total)"),
        ParserSettings::default(),
    )
    .unwrap();
    let SelectedItem::ExpandedNavigation(expanded) = &clause.selected_items[0] else {
        panic!("expected expanded navigation");
    };
    assert!(!expanded.select_expand.all_selected);
    let SelectedItem::Path(path) = &expanded.select_expand.selected_items[0] else {
        panic!("expected nested path");
    };
    assert_eq!(path.segments, vec!["Total".to_string()]);
}

#[test]
fn test_expand_of_structural_property_rejected() {
    let err = bind(None, Some("Name"), ParserSettings::default()).unwrap_err();
    assert_eq!(
        err,
        UriqError::UnresolvedIdentifier {
            identifier: "Name".into(),
            context: "navigation property of NS.Customer".into(),
        }
    );
}

#[test]
fn test_expand_single_valued_navigation_is_legal() {
    let clause = bind(None, Some("Account"), ParserSettings::default()).unwrap();
    assert_eq!(expanded_navigations(&clause), vec!["Account"]);
}

// -----------------------------------------------------------------------------
// Redundant-expansion pruning
// -----------------------------------------------------------------------------

#[test]
fn test_identical_expand_branches_collapse_to_first() {
    let clause = bind(None, Some("Orders, Orders"), ParserSettings::default()).unwrap();
    assert_eq!(expanded_navigations(&clause), vec!["Orders"]);

    let clause = bind(
        None,
        Some("Orders($select=Total), Orders($select=Total)"),
        ParserSettings::default(),
    )
    .unwrap();
    assert_eq!(clause.selected_items.len(), 1);
}

#[test]
fn test_structurally_different_branches_are_kept() {
    let clause = bind(
        None,
        Some("Orders($select=Total), Orders($select=Number)"),
        ParserSettings::default(),
    )
    .unwrap();
    assert_eq!(clause.selected_items.len(), 2);
}

#[test]
fn test_pruning_happens_before_the_count_ceiling() {
    // Two identical branches are one item as far as the validator sees.
    let settings = ParserSettings::new().with_max_expansion_count(1);
    assert!(bind(None, Some("Orders, Orders"), settings).is_ok());
}

// -----------------------------------------------------------------------------
// Expansion ceilings
// -----------------------------------------------------------------------------

#[test]
fn test_unbounded_by_default() {
    assert!(bind(
        None,
        Some("Orders($expand=Items($expand=Supplier))"),
        ParserSettings::default(),
    )
    .is_ok());
}

#[test]
fn test_depth_ceiling_reports_the_offending_depth() {
    let deep = "Orders($expand=Items($expand=Supplier))";
    assert!(bind(None, Some(deep), ParserSettings::new().with_max_expansion_depth(3)).is_ok());
    let err = bind(
        None,
        Some(deep),
        ParserSettings::new().with_max_expansion_depth(2),
    )
    .unwrap_err();
    assert_eq!(err, UriqError::ExpandDepthExceeded { depth: 3, limit: 2 });
}

#[test]
fn test_count_ceiling_runs_across_branches() {
    let wide = "Orders($expand=Items), Account";
    assert!(bind(None, Some(wide), ParserSettings::new().with_max_expansion_count(3)).is_ok());
    let err = bind(
        None,
        Some(wide),
        ParserSettings::new().with_max_expansion_count(2),
    )
    .unwrap_err();
    assert_eq!(err, UriqError::ExpandCountExceeded { count: 3, limit: 2 });
}

#[test]
fn test_parse_limit_and_ceilings_are_independent() {
    // The parse-time nesting limit fires before binding ever happens.
    let settings = ParserSettings::new().with_select_expand_limit(1);
    let err = bind(None, Some("Orders($expand=Items)"), settings).unwrap_err();
    assert!(matches!(err, UriqError::RecursionLimitExceeded { .. }));
}

//! Contracts for the syntactic stage: token shapes, literal forms and
//! per-option recursion limits, independent of any entity model.

use uriq::parser::{
    parse_expand, parse_filter, parse_orderby, parse_path, parse_select, BinaryOperatorKind,
    LambdaKind, OrderByDirection, QueryToken,
};
use uriq::{PrimitiveValue, QueryOptionKind, UriqError};

// -----------------------------------------------------------------------------
// Literal forms
// -----------------------------------------------------------------------------

fn literal_of(filter: &str) -> PrimitiveValue {
    let token = parse_filter(filter, 100).unwrap();
    let QueryToken::BinaryOperator { right, .. } = token else {
        panic!("expected comparison");
    };
    let QueryToken::Literal(literal) = *right else {
        panic!("expected literal");
    };
    literal.value
}

#[test]
fn test_string_literal_quote_doubling() {
    assert_eq!(
        literal_of("Name eq 'O''Brien'"),
        PrimitiveValue::String("O'Brien".into())
    );
}

#[test]
fn test_numeric_literal_suffixes() {
    assert_eq!(literal_of("Id eq 5"), PrimitiveValue::Int32(5));
    assert_eq!(literal_of("Id eq 5L"), PrimitiveValue::Int64(5));
    assert_eq!(
        literal_of("Id eq 3000000000"),
        PrimitiveValue::Int64(3_000_000_000)
    );
    assert_eq!(literal_of("Price eq 2.5"), PrimitiveValue::Double(2.5));
    assert_eq!(literal_of("Price eq 2.5f"), PrimitiveValue::Single(2.5));
    assert_eq!(
        literal_of("Price eq 1.25m"),
        PrimitiveValue::Decimal("1.25".into())
    );
}

#[test]
fn test_guid_and_null_literals() {
    match literal_of("Key eq guid'0e4ccff3-85ac-4ac5-b9a5-7d0a0a2c8b10'") {
        PrimitiveValue::Guid(g) => {
            assert_eq!(g.to_string(), "0e4ccff3-85ac-4ac5-b9a5-7d0a0a2c8b10");
        }
        other => panic!("expected guid literal, got {other:?}"),
    }
    assert_eq!(literal_of("Name eq null"), PrimitiveValue::Null);
    assert_eq!(literal_of("Active eq true"), PrimitiveValue::Boolean(true));
}

// -----------------------------------------------------------------------------
// Grammar shapes
// -----------------------------------------------------------------------------

#[test]
fn test_comparison_binds_tighter_than_logical() {
    let token = parse_filter("Age ge 21 and Name eq 'x'", 100).unwrap();
    let QueryToken::BinaryOperator { op, left, right } = token else {
        panic!("expected binary operator");
    };
    assert_eq!(op, BinaryOperatorKind::And);
    assert!(matches!(
        *left,
        QueryToken::BinaryOperator {
            op: BinaryOperatorKind::GreaterThanOrEqual,
            ..
        }
    ));
    assert!(matches!(
        *right,
        QueryToken::BinaryOperator {
            op: BinaryOperatorKind::Equal,
            ..
        }
    ));
}

#[test]
fn test_lambda_parameter_scoped_to_body() {
    let token = parse_filter("Orders/any(o: o/Total gt 10)", 100).unwrap();
    let QueryToken::Lambda {
        kind,
        parent,
        parameter,
        body,
    } = token
    else {
        panic!("expected lambda");
    };
    assert_eq!(kind, LambdaKind::Any);
    assert_eq!(parameter.as_deref(), Some("o"));
    assert_eq!(*parent, QueryToken::end_path("Orders", None));
    let QueryToken::BinaryOperator { left, .. } = *body else {
        panic!("expected comparison body");
    };
    // `o` resolves as a range-variable root only inside the body.
    assert_eq!(
        *left,
        QueryToken::end_path(
            "Total",
            Some(QueryToken::RangeVariable { name: "o".into() })
        )
    );
}

#[test]
fn test_parameterless_any_gets_constant_true_body() {
    let token = parse_filter("Orders/any()", 100).unwrap();
    let QueryToken::Lambda {
        parameter, body, ..
    } = token
    else {
        panic!("expected lambda");
    };
    assert_eq!(parameter, None);
    let QueryToken::Literal(literal) = *body else {
        panic!("expected literal body");
    };
    assert_eq!(literal.value, PrimitiveValue::Boolean(true));
}

#[test]
fn test_orderby_items_and_directions() {
    let items = parse_orderby("Name desc, Age asc, Total", 100).unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].direction, OrderByDirection::Descending);
    assert_eq!(items[1].direction, OrderByDirection::Ascending);
    assert_eq!(items[2].direction, OrderByDirection::Ascending);
}

#[test]
fn test_select_star_and_paths() {
    let select = parse_select("Name, Address/City, *").unwrap();
    assert_eq!(select.selected.len(), 3);
    assert_eq!(select.selected[2], QueryToken::Star);
}

// -----------------------------------------------------------------------------
// Recursion limits
// -----------------------------------------------------------------------------

#[test]
fn test_filter_limit_is_an_upper_bound_on_nesting() {
    // One level for the top-level expression, one per re-entry.
    assert!(parse_filter("a eq 1", 1).is_ok());
    assert!(parse_filter("(a eq 1)", 2).is_ok());
    let err = parse_filter("(a eq 1)", 1).unwrap_err();
    assert_eq!(
        err,
        UriqError::RecursionLimitExceeded {
            option_kind: QueryOptionKind::Filter,
            limit: 1,
        }
    );
}

#[test]
fn test_function_arguments_reenter_the_grammar() {
    assert!(parse_filter("length(Name) eq 1", 2).is_ok());
    let err = parse_filter("length(Name) eq 1", 1).unwrap_err();
    assert!(matches!(err, UriqError::RecursionLimitExceeded { .. }));
}

#[test]
fn test_orderby_limit_reports_its_own_option() {
    let err = parse_orderby("((Name))", 2).unwrap_err();
    assert_eq!(
        err,
        UriqError::RecursionLimitExceeded {
            option_kind: QueryOptionKind::OrderBy,
            limit: 2,
        }
    );
}

#[test]
fn test_path_limit_is_exact() {
    // Exactly the limit is legal; the limit is a ceiling, not a strict bound.
    assert!(parse_path("a/b/c", 3).is_ok());
    let err = parse_path("a/b/c/d", 3).unwrap_err();
    assert_eq!(
        err,
        UriqError::RecursionLimitExceeded {
            option_kind: QueryOptionKind::Path,
            limit: 3,
        }
    );
}

#[test]
fn test_expand_nesting_consumes_one_level_each() {
    assert!(parse_expand("A($expand=B)", 2).is_ok());
    let err = parse_expand("A($expand=B($expand=C))", 2).unwrap_err();
    assert_eq!(
        err,
        UriqError::RecursionLimitExceeded {
            option_kind: QueryOptionKind::SelectExpand,
            limit: 2,
        }
    );
}

#[test]
fn test_expand_rejects_unknown_nested_option() {
    let err = parse_expand("Orders($count=true)", 10).unwrap_err();
    assert_eq!(err, UriqError::UnsupportedQueryOption("$count".into()));
}

#[test]
fn test_failure_reports_no_partial_tree() {
    // A limit violation deep inside one orderby item fails the whole parse.
    let err = parse_orderby("Name, ((Age))", 2).unwrap_err();
    assert!(matches!(err, UriqError::RecursionLimitExceeded { .. }));
}

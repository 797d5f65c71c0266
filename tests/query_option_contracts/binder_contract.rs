//! Contracts for the semantic stage: identifier resolution, type promotion,
//! lambda scoping and cast binding against the sample model.

use uriq::binder::{BindingState, MetadataBinder};
use uriq::parser::{LambdaKind, QueryToken};
use uriq::{
    FilterClause, PrimitiveKind, PrimitiveValue, QueryNode, QueryOptionParser, TypeRef, UriqError,
};

use super::sample_model;

fn bind_filter(text: &str) -> Result<FilterClause, UriqError> {
    let model = sample_model();
    let parser = QueryOptionParser::new(&model, "Customers").unwrap();
    parser.parse_filter(text)
}

fn boolean() -> TypeRef {
    TypeRef::primitive(PrimitiveKind::Boolean)
}

// -----------------------------------------------------------------------------
// Promotion and conversion
// -----------------------------------------------------------------------------

#[test]
fn test_mismatched_literal_comparison_names_both_types() {
    let err = bind_filter("Age lt '5'").unwrap_err();
    assert_eq!(
        err,
        UriqError::IncompatibleOperandTypes {
            operator: "lt".into(),
            left: "Edm.Int32".into(),
            right: "Edm.String".into(),
        }
    );
}

#[test]
fn test_arithmetic_widens_the_narrower_operand() {
    let clause = bind_filter("Age add 2.5 gt 1").unwrap();
    let QueryNode::BinaryOperator { left, .. } = clause.expression else {
        panic!("expected comparison");
    };
    let QueryNode::BinaryOperator {
        left: add_left,
        type_ref,
        ..
    } = *left
    else {
        panic!("expected add");
    };
    assert_eq!(type_ref, Some(TypeRef::primitive(PrimitiveKind::Double)));
    // Age is Int32; the promoted operand is wrapped, never mutated in place.
    let QueryNode::Convert { source, type_ref } = *add_left else {
        panic!("expected a convert around the Int32 property");
    };
    assert_eq!(type_ref, TypeRef::primitive(PrimitiveKind::Double));
    assert!(matches!(*source, QueryNode::PropertyAccess { .. }));
}

#[test]
fn test_decimal_never_mixes_with_floating() {
    let err = bind_filter("Total add 1.25m gt 1").unwrap_err();
    assert!(matches!(
        err,
        UriqError::IncompatibleOperandTypes { ref operator, .. } if operator == "add"
    ));
}

#[test]
fn test_null_comparison_is_boolean() {
    let clause = bind_filter("Name eq null").unwrap();
    assert_eq!(clause.expression.type_ref(), Some(&boolean()));
}

#[test]
fn test_negate_requires_numeric() {
    assert!(bind_filter("-Age lt 0").is_ok());
    let err = bind_filter("-Name eq 'x'").unwrap_err();
    assert!(matches!(
        err,
        UriqError::IncompatibleOperandTypes { ref operator, .. } if operator == "-"
    ));
}

#[test]
fn test_not_requires_boolean() {
    assert!(bind_filter("not (Age gt 1)").is_ok());
    let err = bind_filter("not Age").unwrap_err();
    assert!(matches!(
        err,
        UriqError::IncompatibleOperandTypes { ref operator, .. } if operator == "not"
    ));
}

// -----------------------------------------------------------------------------
// Filter shape requirements
// -----------------------------------------------------------------------------

#[test]
fn test_filter_must_be_boolean() {
    let err = bind_filter("Age add 1").unwrap_err();
    assert_eq!(
        err,
        UriqError::FilterExpressionNotBoolean {
            type_name: "Edm.Int32".into(),
        }
    );
}

#[test]
fn test_filter_over_open_property_is_dynamically_accepted() {
    // Stuff is undeclared on the open NS.Account type; its type is unknown,
    // so the boolean requirement cannot reject it.
    let clause = bind_filter("Account/Stuff").unwrap();
    assert!(matches!(
        clause.expression,
        QueryNode::OpenPropertyAccess { .. }
    ));
    assert_eq!(clause.expression.type_ref(), None);
}

#[test]
fn test_collection_operand_rejected() {
    let err = bind_filter("Orders eq 1").unwrap_err();
    assert_eq!(
        err,
        UriqError::OperandNotSingleValue {
            operator: "eq".into(),
        }
    );
}

#[test]
fn test_unresolved_property_names_its_context() {
    let err = bind_filter("Nmae eq 'x'").unwrap_err();
    assert_eq!(
        err,
        UriqError::UnresolvedIdentifier {
            identifier: "Nmae".into(),
            context: "property of NS.Customer".into(),
        }
    );
}

// -----------------------------------------------------------------------------
// Lambdas and range-variable scope
// -----------------------------------------------------------------------------

#[test]
fn test_lambda_over_entity_collection() {
    let clause = bind_filter("Orders/any(o: o/Number eq 'A')").unwrap();
    let QueryNode::Lambda {
        kind,
        source,
        body,
        range_variable,
    } = clause.expression
    else {
        panic!("expected lambda");
    };
    assert_eq!(kind, LambdaKind::Any);
    assert!(matches!(*source, QueryNode::CollectionPropertyAccess { .. }));
    assert_eq!(body.type_ref(), Some(&boolean()));
    let variable = range_variable.expect("declared parameter");
    assert_eq!(variable.name, "o");
    assert_eq!(variable.element_type, TypeRef::entity("NS.Order"));
}

#[test]
fn test_lambda_over_primitive_collection() {
    let clause = bind_filter("Emails/any(e: e eq 'x')").unwrap();
    let QueryNode::Lambda { range_variable, .. } = clause.expression else {
        panic!("expected lambda");
    };
    assert_eq!(
        range_variable.unwrap().element_type,
        TypeRef::primitive(PrimitiveKind::String)
    );
}

#[test]
fn test_parameterless_any_has_no_range_variable() {
    let clause = bind_filter("Orders/any()").unwrap();
    let QueryNode::Lambda {
        body,
        range_variable,
        ..
    } = clause.expression
    else {
        panic!("expected lambda");
    };
    assert_eq!(range_variable, None);
    assert_eq!(
        *body,
        QueryNode::Constant {
            value: PrimitiveValue::Boolean(true),
            type_ref: Some(boolean()),
        }
    );
}

#[test]
fn test_lambda_parent_must_be_collection() {
    let err = bind_filter("Name/any(x: true)").unwrap_err();
    assert_eq!(
        err,
        UriqError::LambdaParentMustBeCollection {
            kind: LambdaKind::Any,
        }
    );
}

#[test]
fn test_open_collection_lambda_parent_rejected_distinctly() {
    let err = bind_filter("Account/Stuff/any(x: true)").unwrap_err();
    assert_eq!(
        err,
        UriqError::OpenCollectionPropertiesNotSupported {
            property: "Stuff".into(),
        }
    );
}

#[test]
fn test_lambda_body_must_be_boolean() {
    let err = bind_filter("Orders/all(o: o/Total)").unwrap_err();
    assert_eq!(
        err,
        UriqError::LambdaExpressionNotBoolean {
            kind: LambdaKind::All,
        }
    );
}

#[test]
fn test_lambda_parameter_not_visible_outside_body() {
    let err = bind_filter("Orders/any(o: o/Total gt 1) and o eq 1").unwrap_err();
    assert_eq!(
        err,
        UriqError::UnresolvedIdentifier {
            identifier: "o".into(),
            context: "property of NS.Customer".into(),
        }
    );
}

#[test]
fn test_failed_lambda_bind_leaves_scope_balanced() {
    let model = sample_model();
    let binder = MetadataBinder::new(&model, TypeRef::entity("NS.Customer"));
    let mut state: BindingState = binder.new_state();

    let lambda = QueryToken::Lambda {
        kind: LambdaKind::Any,
        parent: Box::new(QueryToken::end_path("Orders", None)),
        parameter: Some("o".into()),
        body: Box::new(QueryToken::end_path(
            "Missing",
            Some(QueryToken::RangeVariable { name: "o".into() }),
        )),
    };

    assert_eq!(state.depth(), 0);
    let err = binder.bind(&lambda, &mut state).unwrap_err();
    assert!(matches!(err, UriqError::UnresolvedIdentifier { .. }));
    // The parameter was popped on the failure path too.
    assert_eq!(state.depth(), 0);
    assert!(state.lookup("o").is_none());
}

#[test]
fn test_nested_lambdas_shadow_and_restore() {
    let clause =
        bind_filter("Orders/any(o: o/Items/any(i: i/Price gt o/Total))").unwrap();
    let QueryNode::Lambda { body, .. } = clause.expression else {
        panic!("expected outer lambda");
    };
    assert!(matches!(*body, QueryNode::Lambda { .. }));
}

// -----------------------------------------------------------------------------
// Casts
// -----------------------------------------------------------------------------

#[test]
fn test_cast_to_derived_type_exposes_its_properties() {
    let clause = bind_filter("NS.VipCustomer/Discount gt 0.1").unwrap();
    let QueryNode::BinaryOperator { left, .. } = clause.expression else {
        panic!("expected comparison");
    };
    let QueryNode::PropertyAccess { source, .. } = *left else {
        panic!("expected property access");
    };
    let QueryNode::SingleEntityCast { type_ref, .. } = *source else {
        panic!("expected single entity cast");
    };
    assert_eq!(type_ref, TypeRef::entity("NS.VipCustomer"));
}

#[test]
fn test_cast_to_unknown_type_is_unresolved() {
    let err = bind_filter("NS.Missing/Discount gt 1").unwrap_err();
    assert_eq!(
        err,
        UriqError::UnresolvedIdentifier {
            identifier: "NS.Missing".into(),
            context: "entity type".into(),
        }
    );
}

#[test]
fn test_cast_to_unrelated_type_rejected() {
    let err = bind_filter("NS.Order/Total gt 1").unwrap_err();
    assert_eq!(
        err,
        UriqError::InvalidTypeCast {
            target: "NS.Order".into(),
            source: "NS.Customer".into(),
        }
    );
}

// -----------------------------------------------------------------------------
// Function calls
// -----------------------------------------------------------------------------

#[test]
fn test_canonical_function_binds_to_boolean() {
    let clause = bind_filter("contains(Name, 'abc')").unwrap();
    let QueryNode::SingleValueFunctionCall {
        name,
        arguments,
        type_ref,
    } = clause.expression
    else {
        panic!("expected function call");
    };
    assert_eq!(name, "contains");
    assert_eq!(arguments.len(), 2);
    assert_eq!(type_ref, boolean());
}

#[test]
fn test_overloads_selected_by_arity() {
    assert!(bind_filter("substring(Name, 1) eq 'x'").is_ok());
    assert!(bind_filter("substring(Name, 1, 2) eq 'x'").is_ok());
    let err = bind_filter("substring(Name) eq 'x'").unwrap_err();
    assert!(matches!(err, UriqError::FunctionSignatureMismatch { .. }));
}

#[test]
fn test_argument_widening_inserts_convert() {
    // round() takes Edm.Double; the Int32 property widens into it.
    let clause = bind_filter("round(Age) eq 2").unwrap();
    let QueryNode::BinaryOperator { left, .. } = clause.expression else {
        panic!("expected comparison");
    };
    let QueryNode::SingleValueFunctionCall { arguments, .. } = *left else {
        panic!("expected function call");
    };
    assert!(matches!(arguments[0], QueryNode::Convert { .. }));
}

#[test]
fn test_incompatible_argument_rejected() {
    let err = bind_filter("length(Age) eq 1").unwrap_err();
    assert!(matches!(err, UriqError::FunctionSignatureMismatch { .. }));
}

#[test]
fn test_unknown_function_is_unresolved() {
    let err = bind_filter("frobnicate(Name) eq 1").unwrap_err();
    assert_eq!(
        err,
        UriqError::UnresolvedIdentifier {
            identifier: "frobnicate".into(),
            context: "function".into(),
        }
    );
}

// -----------------------------------------------------------------------------
// Orderby
// -----------------------------------------------------------------------------

#[test]
fn test_orderby_binds_each_item() {
    let model = sample_model();
    let parser = QueryOptionParser::new(&model, "Customers").unwrap();
    let clause = parser.parse_orderby("Name desc, Age").unwrap();
    assert_eq!(clause.items.len(), 2);
    assert!(matches!(
        clause.items[0].expression,
        QueryNode::PropertyAccess { .. }
    ));
}

#[test]
fn test_orderby_rejects_collection_expressions() {
    let model = sample_model();
    let parser = QueryOptionParser::new(&model, "Customers").unwrap();
    let err = parser.parse_orderby("Orders").unwrap_err();
    assert_eq!(
        err,
        UriqError::OperandNotSingleValue {
            operator: "$orderby".into(),
        }
    );
}

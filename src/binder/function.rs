//! Function-call binding and overload resolution.

use crate::error::{Result, UriqError};
use crate::model::FunctionSignature;
use crate::parser::token::QueryToken;
use crate::types::TypeRef;

use super::metadata::MetadataBinder;
use super::node::QueryNode;
use super::promote::widens_to;
use super::state::BindingState;

impl MetadataBinder<'_> {
    pub(crate) fn bind_function_call(
        &self,
        name: &str,
        arguments: &[QueryToken],
        state: &mut BindingState,
    ) -> Result<QueryNode> {
        let overloads = self.model().functions(name);
        if overloads.is_empty() {
            return Err(UriqError::UnresolvedIdentifier {
                identifier: name.to_string(),
                context: "function".to_string(),
            });
        }

        // Arguments bind left to right; scope effects in an earlier argument
        // are visible to later ones.
        let mut bound = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let value = match argument {
                QueryToken::FunctionParameter { value, .. } => value.as_ref(),
                other => other,
            };
            let node = self.bind(value, state)?;
            if !node.is_single_value() {
                return Err(UriqError::OperandNotSingleValue {
                    operator: name.to_string(),
                });
            }
            bound.push(node);
        }

        let Some(signature) = select_overload(overloads, &bound) else {
            let actual: Vec<String> = bound.iter().map(QueryNode::type_name).collect();
            return Err(UriqError::FunctionSignatureMismatch {
                name: name.to_string(),
                reason: format!("no overload accepts ({})", actual.join(", ")),
            });
        };

        let converted: Vec<QueryNode> = bound
            .into_iter()
            .zip(&signature.parameters)
            .map(|(node, parameter)| convert_argument(node, parameter))
            .collect();

        Ok(if signature.return_type.is_collection() {
            QueryNode::CollectionFunctionCall {
                name: name.to_string(),
                arguments: converted,
                type_ref: signature.return_type.clone(),
            }
        } else {
            QueryNode::SingleValueFunctionCall {
                name: name.to_string(),
                arguments: converted,
                type_ref: signature.return_type.clone(),
            }
        })
    }
}

/// Picks the first overload whose arity matches and whose every parameter
/// accepts the bound argument exactly, by widening, or because the argument
/// is dynamically typed.
fn select_overload<'a>(
    overloads: &'a [FunctionSignature],
    arguments: &[QueryNode],
) -> Option<&'a FunctionSignature> {
    overloads.iter().find(|signature| {
        signature.parameters.len() == arguments.len()
            && signature
                .parameters
                .iter()
                .zip(arguments)
                .all(|(parameter, argument)| accepts(parameter, argument))
    })
}

fn accepts(parameter: &TypeRef, argument: &QueryNode) -> bool {
    match (parameter.primitive_kind(), argument.type_ref()) {
        // Dynamic arguments are accepted and converted to the parameter type.
        (_, None) => true,
        (Some(expected), Some(actual)) => actual
            .primitive_kind()
            .is_some_and(|kind| widens_to(kind, expected)),
        (None, Some(actual)) => parameter == actual,
    }
}

/// Wraps the argument in a `Convert` when the declared parameter type is
/// wider than the argument's own type.
fn convert_argument(node: QueryNode, parameter: &TypeRef) -> QueryNode {
    let matches_already = node.type_ref() == Some(parameter);
    if matches_already {
        node
    } else {
        QueryNode::Convert {
            source: Box::new(node),
            type_ref: parameter.clone(),
        }
    }
}

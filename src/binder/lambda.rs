//! The `any`/`all` lambda binder.
//!
//! Parent before body: the parent collection is bound first, then the
//! declared range variable goes into scope only while the body is bound. The
//! pop is unconditional, so a failed body bind never leaks scope into a
//! sibling binding.

use crate::error::{Result, UriqError};
use crate::parser::token::{LambdaKind, QueryToken};

use super::metadata::{is_boolean_or_unknown, MetadataBinder};
use super::node::QueryNode;
use super::state::{BindingState, RangeVariable};

impl MetadataBinder<'_> {
    pub(crate) fn bind_lambda(
        &self,
        kind: LambdaKind,
        parent: &QueryToken,
        parameter: Option<&str>,
        body: &QueryToken,
        state: &mut BindingState,
    ) -> Result<QueryNode> {
        let source = self.bind(parent, state)?;

        // An open collection property is recognized but unsupported, a
        // distinct condition from a plainly non-collection parent.
        if let QueryNode::OpenPropertyAccess { property, .. } = &source {
            return Err(UriqError::OpenCollectionPropertiesNotSupported {
                property: property.clone(),
            });
        }
        if !source.is_collection() {
            return Err(UriqError::LambdaParentMustBeCollection { kind });
        }
        let element_type = source
            .type_ref()
            .and_then(|t| t.element_type())
            .cloned()
            .ok_or(UriqError::LambdaParentMustBeCollection { kind })?;

        let range_variable =
            parameter.map(|name| RangeVariable::new(name, element_type.clone()));

        // Explicit save/restore pair: the pop happens on success and failure
        // alike, before any error propagates.
        if let Some(variable) = &range_variable {
            state.push(variable.clone());
        }
        let body = self.bind(body, state);
        if range_variable.is_some() {
            state.pop();
        }
        let body = body?;

        if !body.is_single_value() || !is_boolean_or_unknown(&body) {
            return Err(UriqError::LambdaExpressionNotBoolean { kind });
        }

        Ok(QueryNode::Lambda {
            kind,
            source: Box::new(source),
            body: Box::new(body),
            range_variable,
        })
    }
}

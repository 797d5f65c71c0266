//! Binding state: the range-variable scope threaded through one bind.

use serde::{Deserialize, Serialize};

use crate::types::TypeRef;

/// A named placeholder ranging over one element of a collection.
///
/// The variable holds the element type only; the collection node it ranges
/// over is owned by the lambda node, never by the variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeVariable {
    /// Variable name (`$it` for the implicit variable).
    pub name: String,
    /// Type of one element of the ranged collection.
    pub element_type: TypeRef,
}

impl RangeVariable {
    /// Creates a range variable.
    #[must_use]
    pub fn new(name: impl Into<String>, element_type: TypeRef) -> Self {
        RangeVariable {
            name: name.into(),
            element_type,
        }
    }
}

/// Lexical scope for one top-level bind: the implicit range variable plus a
/// LIFO stack of lambda-introduced variables.
///
/// Created once per bind and discarded with it; never shared across binds.
/// The lambda binder pops unconditionally on success and failure, so the
/// stack depth observed before and after any lambda bind is identical.
#[derive(Debug)]
pub struct BindingState {
    implicit: RangeVariable,
    stack: Vec<RangeVariable>,
}

impl BindingState {
    /// Creates binding state with the given implicit variable.
    #[must_use]
    pub fn new(implicit: RangeVariable) -> Self {
        BindingState {
            implicit,
            stack: Vec::new(),
        }
    }

    /// Returns the implicit range variable.
    #[must_use]
    pub fn implicit(&self) -> &RangeVariable {
        &self.implicit
    }

    /// Pushes a lambda range variable onto the scope stack.
    pub fn push(&mut self, variable: RangeVariable) {
        self.stack.push(variable);
    }

    /// Pops the innermost lambda range variable.
    pub fn pop(&mut self) -> Option<RangeVariable> {
        self.stack.pop()
    }

    /// Looks up a variable by name: innermost lambda scope first, then the
    /// implicit variable.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&RangeVariable> {
        self.stack
            .iter()
            .rev()
            .find(|v| v.name == name)
            .or_else(|| (self.implicit.name == name).then_some(&self.implicit))
    }

    /// Returns the lambda-scope stack depth, for scope-balance assertions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

//! Constraint types: the nodes of an evaluation tree.
//!
//! A constraint is a reusable, side-effect-free test against a value.
//! Leaves test one value directly; combinators wrap one or two child
//! constraints. Trees are immutable once built and may be evaluated any
//! number of times.
//!
//! Three outcomes are kept distinct throughout:
//! - **failure**: the constraint legitimately did not match —
//!   `Ok(result)` with `success == false`;
//! - **error**: a usage mistake (wrong actual shape, missing property,
//!   malformed expression) — `Err(EvalError)`;
//! - **captured throw**: an error value captured by `throws()` is data
//!   for its child constraint, not an error.

mod collection;
mod composite;
mod delayed;
mod equal;
mod items;
mod ordering;
mod path;
mod property;
mod strings;
mod throws;
mod types;

pub use collection::{
    CollectionContainsConstraint, CollectionEquivalentConstraint, CollectionSubsetConstraint,
};
pub use composite::{AndConstraint, NotConstraint, OrConstraint};
pub use delayed::DelayedConstraint;
pub use equal::EqualConstraint;
pub use items::{AllItemsConstraint, NoItemsConstraint, SomeItemsConstraint};
pub use ordering::{natural_order, ComparisonConstraint, OrderingAdapter};
pub use path::{SamePathConstraint, SamePathOrUnderConstraint};
pub use property::{PropertyConstraint, PropertyExistsConstraint};
pub use strings::StringConstraint;
pub use throws::ThrowsConstraint;
pub use types::{
    AssignableFromConstraint, AssignableToConstraint, ExactTypeConstraint, InstanceOfConstraint,
};

use serde::Serialize;

use crate::compare::{CompareError, FailurePoint};
use crate::expr::BuildError;
use crate::tolerance::ToleranceError;
use crate::value::{Actual, Value};

/// Error type for evaluation-time usage mistakes. Distinct from a plain
/// failure: an error aborts evaluation of the node that raised it and
/// propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("expected an ordered sequence but the actual value was {kind}")]
    NotASequence { kind: String },

    #[error("property '{name}' not found on {type_name}")]
    MissingProperty { name: String, type_name: String },

    #[error("the actual value must be a callable provider")]
    NotCallable,

    #[error("cannot order {left} against {right}; supply a comparer")]
    Incomparable { left: String, right: String },

    #[error("ordering comparison requires non-null operands")]
    NullOperand,

    #[error("invalid pattern '{pattern}': {message}")]
    BadPattern { pattern: String, message: String },

    #[error("a thrown error reached a constraint that does not capture: {thrown}")]
    UncaughtThrow { thrown: String },
}

/// Outcome of evaluating a constraint against an actual value.
#[derive(Debug, Clone, Serialize)]
pub struct ConstraintResult {
    pub success: bool,
    description: String,
    actual: String,
    /// Positions at which a structural comparison first diverged,
    /// outermost first. Empty for non-structural constraints.
    pub failure_path: Vec<FailurePoint>,
}

impl ConstraintResult {
    pub fn success(description: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            success: true,
            description: description.into(),
            actual: actual.into(),
            failure_path: Vec::new(),
        }
    }

    pub fn failure(description: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            success: false,
            description: description.into(),
            actual: actual.into(),
            failure_path: Vec::new(),
        }
    }

    pub fn with_failure_path(mut self, failure_path: Vec<FailurePoint>) -> Self {
        self.failure_path = failure_path;
        self
    }

    /// What the constraint expected, in human terms.
    pub fn describe_expected(&self) -> &str {
        &self.description
    }

    /// The actual value the constraint saw, rendered.
    pub fn describe_actual(&self) -> &str {
        &self.actual
    }
}

/// A node of the evaluation tree.
pub trait Constraint: std::fmt::Debug {
    /// Evaluate against an actual value. Failures are `Ok` results;
    /// usage mistakes are `Err`.
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError>;

    /// Human description of what the constraint expects.
    fn description(&self) -> String;
}

impl<C: Constraint + ?Sized> Constraint for Box<C> {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        (**self).apply_to(actual)
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// Resolve an actual-value provider. A thrown error reaching a constraint
/// that does not capture it is a usage error, not a failure.
pub(crate) fn resolve(actual: &Actual) -> Result<Value, EvalError> {
    actual.resolve().map_err(|thrown| EvalError::UncaughtThrow {
        thrown: thrown.to_string(),
    })
}

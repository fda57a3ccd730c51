//! Fluent expression surface over the precedence builder.
//!
//! `expect()` starts an expression; prefix, connective, and leaf methods
//! append tokens; `resolve()` produces the constraint tree. A malformed
//! chain is remembered and reported by `resolve()` — the first error
//! wins and nothing is partially recovered.

use std::time::Duration;

use crate::constraints::{
    AssignableFromConstraint, AssignableToConstraint, CollectionContainsConstraint,
    CollectionEquivalentConstraint, CollectionSubsetConstraint, ComparisonConstraint, Constraint,
    ConstraintResult, EqualConstraint, EvalError, ExactTypeConstraint, InstanceOfConstraint,
    SamePathConstraint, SamePathOrUnderConstraint, StringConstraint,
};
use crate::value::{Actual, TypeSpec, Value};

use super::builder::{BuildError, ConstraintBuilder, Op};

/// Start a constraint expression.
///
/// # Example
///
/// ```rust,ignore
/// use veracity::{expect, Actual};
///
/// let constraint = expect()
///     .all()
///     .greater_than(0)
///     .and()
///     .less_than(100)
///     .resolve()?;
///
/// assert!(constraint.apply_to(&Actual::of(vec![1, 50, 99]))?.success);
/// ```
pub fn expect() -> Expr {
    Expr::new()
}

/// A constraint expression under construction.
pub struct Expr {
    builder: ConstraintBuilder,
    error: Option<BuildError>,
}

impl Expr {
    pub fn new() -> Self {
        Self {
            builder: ConstraintBuilder::new(),
            error: None,
        }
    }

    fn push_op(mut self, op: Op) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.builder.append_operator(op) {
                self.error = Some(e);
            }
        }
        self
    }

    fn push_leaf(mut self, constraint: Box<dyn Constraint>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.builder.append_constraint(constraint) {
                self.error = Some(e);
            }
        }
        self
    }

    // =========================================================================
    // Prefix operators
    // =========================================================================

    /// Negate the following constraint. Repeated negations stack.
    pub fn not(self) -> Self {
        self.push_op(Op::Not)
    }

    /// Require every element of the actual sequence to satisfy the
    /// following constraint, including a trailing and/or pair.
    pub fn all(self) -> Self {
        self.push_op(Op::All)
    }

    /// Require at least one element to satisfy the following constraint.
    pub fn some(self) -> Self {
        self.push_op(Op::Some)
    }

    /// Require no element to satisfy the following constraint.
    pub fn none(self) -> Self {
        self.push_op(Op::None)
    }

    /// Group the following sub-chain without further effect.
    pub fn with(self) -> Self {
        self.push_op(Op::With)
    }

    /// Scope the following constraint to the named property of the
    /// actual value; bare `prop(..)` tests that the property exists.
    pub fn prop(self, name: impl Into<String>) -> Self {
        self.push_op(Op::Prop(name.into()))
    }

    /// Capture the error thrown by the actual-value provider; a bare
    /// `throws()` accepts any thrown value.
    pub fn throws(self) -> Self {
        self.push_op(Op::Throws)
    }

    /// Re-evaluate the following constraint at `interval` until it
    /// succeeds or `timeout` elapses.
    pub fn after(self, timeout: Duration, interval: Duration) -> Self {
        self.push_op(Op::Delay { timeout, interval })
    }

    // =========================================================================
    // Binary connectives
    // =========================================================================

    /// Both the preceding and the following constraint must hold. Binds
    /// tighter than `or()`.
    pub fn and(self) -> Self {
        self.push_op(Op::And)
    }

    /// Either the preceding or the following constraint must hold.
    pub fn or(self) -> Self {
        self.push_op(Op::Or)
    }

    // =========================================================================
    // Leaf constraints
    // =========================================================================

    pub fn equal_to(self, expected: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(EqualConstraint::new(expected)))
    }

    pub fn null(self) -> Self {
        self.push_leaf(Box::new(EqualConstraint::new(Value::Null)))
    }

    pub fn greater_than(self, expected: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(ComparisonConstraint::greater_than(expected)))
    }

    pub fn greater_or_equal(self, expected: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(ComparisonConstraint::greater_or_equal(expected)))
    }

    pub fn less_than(self, expected: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(ComparisonConstraint::less_than(expected)))
    }

    pub fn less_or_equal(self, expected: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(ComparisonConstraint::less_or_equal(expected)))
    }

    pub fn exact_type(self, expected: impl Into<TypeSpec>) -> Self {
        self.push_leaf(Box::new(ExactTypeConstraint::new(expected)))
    }

    pub fn instance_of(self, expected: impl Into<TypeSpec>) -> Self {
        self.push_leaf(Box::new(InstanceOfConstraint::new(expected)))
    }

    pub fn assignable_to(self, expected: impl Into<TypeSpec>) -> Self {
        self.push_leaf(Box::new(AssignableToConstraint::new(expected)))
    }

    pub fn assignable_from(self, expected: impl Into<TypeSpec>) -> Self {
        self.push_leaf(Box::new(AssignableFromConstraint::new(expected)))
    }

    pub fn contains(self, expected: impl Into<String>) -> Self {
        self.push_leaf(Box::new(StringConstraint::contains(expected)))
    }

    pub fn starts_with(self, expected: impl Into<String>) -> Self {
        self.push_leaf(Box::new(StringConstraint::starts_with(expected)))
    }

    pub fn ends_with(self, expected: impl Into<String>) -> Self {
        self.push_leaf(Box::new(StringConstraint::ends_with(expected)))
    }

    pub fn matches(self, pattern: impl Into<String>) -> Self {
        self.push_leaf(Box::new(StringConstraint::matches(pattern)))
    }

    pub fn matches_glob(self, pattern: impl Into<String>) -> Self {
        self.push_leaf(Box::new(StringConstraint::matches_glob(pattern)))
    }

    pub fn same_path(self, expected: impl Into<String>) -> Self {
        self.push_leaf(Box::new(SamePathConstraint::new(expected)))
    }

    pub fn same_path_or_under(self, expected: impl Into<String>) -> Self {
        self.push_leaf(Box::new(SamePathOrUnderConstraint::new(expected)))
    }

    pub fn equivalent_to(self, expected: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(CollectionEquivalentConstraint::new(expected)))
    }

    pub fn subset_of(self, superset: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(CollectionSubsetConstraint::new(superset)))
    }

    /// The actual sequence contains an item equal to `item`.
    pub fn member(self, item: impl Into<Value>) -> Self {
        self.push_leaf(Box::new(CollectionContainsConstraint::new(item)))
    }

    /// Append a preconfigured constraint, e.g. an `EqualConstraint` with
    /// a tolerance attached.
    pub fn constraint(self, constraint: impl Constraint + 'static) -> Self {
        self.push_leaf(Box::new(constraint))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Reduce the chain to a single constraint tree. Fails on a
    /// malformed chain; the tree may be evaluated any number of times.
    pub fn resolve(self) -> Result<Box<dyn Constraint>, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.builder.resolve()
    }

    /// Resolve and evaluate in one step.
    pub fn apply_to(self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let constraint = self.resolve()?;
        constraint.apply_to(actual)
    }
}

impl Default for Expr {
    fn default() -> Self {
        Self::new()
    }
}

//! Ordering constraints: greater/less comparisons with an optional
//! externally supplied ordering.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::numerics;
use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

/// Externally supplied ordering, used in place of natural ordering when
/// present.
#[derive(Clone)]
pub struct OrderingAdapter {
    cmp: Rc<dyn Fn(&Value, &Value) -> Option<Ordering>>,
}

impl OrderingAdapter {
    pub fn from_fn(cmp: impl Fn(&Value, &Value) -> Option<Ordering> + 'static) -> Self {
        Self { cmp: Rc::new(cmp) }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Option<Ordering> {
        (self.cmp)(a, b)
    }
}

impl fmt::Debug for OrderingAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrderingAdapter(..)")
    }
}

/// Natural ordering of comparable values: numerics across widths,
/// strings, chars, durations, and bools. `None` for anything else, and
/// for NaN, which has no ordering.
pub fn natural_order(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_numeric() && b.is_numeric() {
        return numerics::try_compare(a, b);
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Char(x), Value::Char(y)) => Some(x.cmp(y)),
        (Value::Duration(x), Value::Duration(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComparisonOp {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl ComparisonOp {
    fn admits(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Greater => ordering == Ordering::Greater,
            ComparisonOp::GreaterOrEqual => ordering != Ordering::Less,
            ComparisonOp::Less => ordering == Ordering::Less,
            ComparisonOp::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    fn word(self) -> &'static str {
        match self {
            ComparisonOp::Greater => "greater than",
            ComparisonOp::GreaterOrEqual => "greater than or equal to",
            ComparisonOp::Less => "less than",
            ComparisonOp::LessOrEqual => "less than or equal to",
        }
    }
}

/// Tests the actual value's ordering relative to an expected value.
///
/// Both operands must be non-null; values with no usable ordering and no
/// supplied adapter are a usage error, not a failure.
#[derive(Debug, Clone)]
pub struct ComparisonConstraint {
    expected: Value,
    op: ComparisonOp,
    adapter: Option<OrderingAdapter>,
}

impl ComparisonConstraint {
    pub fn greater_than(expected: impl Into<Value>) -> Self {
        Self::new(expected, ComparisonOp::Greater)
    }

    pub fn greater_or_equal(expected: impl Into<Value>) -> Self {
        Self::new(expected, ComparisonOp::GreaterOrEqual)
    }

    pub fn less_than(expected: impl Into<Value>) -> Self {
        Self::new(expected, ComparisonOp::Less)
    }

    pub fn less_or_equal(expected: impl Into<Value>) -> Self {
        Self::new(expected, ComparisonOp::LessOrEqual)
    }

    fn new(expected: impl Into<Value>, op: ComparisonOp) -> Self {
        Self {
            expected: expected.into(),
            op,
            adapter: None,
        }
    }

    /// Use the supplied ordering in place of natural ordering.
    pub fn using(mut self, adapter: OrderingAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

impl Constraint for ComparisonConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        if value.is_null() || self.expected.is_null() {
            return Err(EvalError::NullOperand);
        }

        let ordering = match &self.adapter {
            Some(adapter) => adapter.compare(&value, &self.expected),
            None => natural_order(&value, &self.expected),
        };
        let ordering = ordering.ok_or_else(|| EvalError::Incomparable {
            left: value.to_string(),
            right: self.expected.to_string(),
        })?;

        let result = if self.op.admits(ordering) {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("{} {}", self.op.word(), self.expected)
    }
}

//! Collection quantifiers: apply a child constraint to every element of
//! an ordered sequence.
//!
//! The actual value must be a list or an array; anything else is a usage
//! error. Each quantifier iterates at most once.

use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

fn require_seq(value: &Value) -> Result<&[Value], EvalError> {
    value.seq_elems().ok_or_else(|| EvalError::NotASequence {
        kind: value.kind().to_string(),
    })
}

/// Succeeds iff every element satisfies the child constraint. Fails fast
/// on the first non-matching element.
#[derive(Debug)]
pub struct AllItemsConstraint {
    child: Box<dyn Constraint>,
}

impl AllItemsConstraint {
    pub fn new(child: impl Constraint + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn boxed(child: Box<dyn Constraint>) -> Self {
        Self { child }
    }
}

impl Constraint for AllItemsConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let elems = require_seq(&value)?;

        for (index, elem) in elems.iter().enumerate() {
            let inner = self.child.apply_to(&Actual::Value(elem.clone()))?;
            if !inner.success {
                return Ok(ConstraintResult::failure(
                    self.description(),
                    format!("item {} at index {}", elem, index),
                )
                .with_failure_path(inner.failure_path));
            }
        }
        Ok(ConstraintResult::success(
            self.description(),
            value.to_string(),
        ))
    }

    fn description(&self) -> String {
        format!("all items {}", self.child.description())
    }
}

/// Succeeds iff at least one element satisfies the child constraint.
/// Succeeds fast on the first match.
#[derive(Debug)]
pub struct SomeItemsConstraint {
    child: Box<dyn Constraint>,
}

impl SomeItemsConstraint {
    pub fn new(child: impl Constraint + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn boxed(child: Box<dyn Constraint>) -> Self {
        Self { child }
    }
}

impl Constraint for SomeItemsConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let elems = require_seq(&value)?;

        for elem in elems {
            let inner = self.child.apply_to(&Actual::Value(elem.clone()))?;
            if inner.success {
                return Ok(ConstraintResult::success(
                    self.description(),
                    value.to_string(),
                ));
            }
        }
        Ok(ConstraintResult::failure(
            self.description(),
            value.to_string(),
        ))
    }

    fn description(&self) -> String {
        format!("some item {}", self.child.description())
    }
}

/// Succeeds iff no element satisfies the child constraint: the logical
/// negation of `SomeItemsConstraint`.
#[derive(Debug)]
pub struct NoItemsConstraint {
    child: Box<dyn Constraint>,
}

impl NoItemsConstraint {
    pub fn new(child: impl Constraint + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn boxed(child: Box<dyn Constraint>) -> Self {
        Self { child }
    }
}

impl Constraint for NoItemsConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let elems = require_seq(&value)?;

        for (index, elem) in elems.iter().enumerate() {
            let inner = self.child.apply_to(&Actual::Value(elem.clone()))?;
            if inner.success {
                return Ok(ConstraintResult::failure(
                    self.description(),
                    format!("item {} at index {}", elem, index),
                ));
            }
        }
        Ok(ConstraintResult::success(
            self.description(),
            value.to_string(),
        ))
    }

    fn description(&self) -> String {
        format!("no item {}", self.child.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ComparisonConstraint;

    #[test]
    fn test_all_items() {
        let constraint = AllItemsConstraint::new(ComparisonConstraint::greater_than(0));
        assert!(constraint
            .apply_to(&Actual::of(vec![1, 2, 3]))
            .unwrap()
            .success);
        assert!(!constraint
            .apply_to(&Actual::of(vec![1, -2, 3]))
            .unwrap()
            .success);
    }

    #[test]
    fn test_all_items_names_offender() {
        let constraint = AllItemsConstraint::new(ComparisonConstraint::greater_than(0));
        let result = constraint.apply_to(&Actual::of(vec![1, -2, 3])).unwrap();
        assert!(result.describe_actual().contains("index 1"));
    }

    #[test]
    fn test_some_items() {
        let constraint = SomeItemsConstraint::new(ComparisonConstraint::greater_than(2));
        assert!(constraint
            .apply_to(&Actual::of(vec![1, 2, 3]))
            .unwrap()
            .success);
        assert!(!constraint
            .apply_to(&Actual::of(vec![1, 2]))
            .unwrap()
            .success);
    }

    #[test]
    fn test_no_items_negates_some() {
        let constraint = NoItemsConstraint::new(ComparisonConstraint::greater_than(10));
        assert!(constraint
            .apply_to(&Actual::of(vec![1, 2, 3]))
            .unwrap()
            .success);
        assert!(!constraint
            .apply_to(&Actual::of(vec![1, 20]))
            .unwrap()
            .success);
    }

    #[test]
    fn test_non_sequence_is_error() {
        let constraint = AllItemsConstraint::new(ComparisonConstraint::greater_than(0));
        assert!(matches!(
            constraint.apply_to(&Actual::of(5)),
            Err(EvalError::NotASequence { .. })
        ));
    }

    #[test]
    fn test_array_elements_iterate_flat() {
        let constraint = AllItemsConstraint::new(ComparisonConstraint::greater_than(0));
        let actual = Actual::of(Value::array2(vec![vec![1, 2], vec![3, 4]]));
        assert!(constraint.apply_to(&actual).unwrap().success);
    }
}

//! Logical combinators: negation and binary AND/OR.

use crate::value::Actual;

use super::{resolve, Constraint, ConstraintResult, EvalError};

/// Binary connectives invoke a provider once; both sides see the same
/// resolved value.
fn resolve_once(actual: &Actual) -> Result<Actual, EvalError> {
    match actual {
        Actual::Value(_) => Ok(actual.clone()),
        Actual::Provider(_) => Ok(Actual::Value(resolve(actual)?)),
    }
}

/// Succeeds iff the wrapped constraint fails. The child's actual-value
/// description is forwarded unchanged.
#[derive(Debug)]
pub struct NotConstraint {
    child: Box<dyn Constraint>,
}

impl NotConstraint {
    pub fn new(child: impl Constraint + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn boxed(child: Box<dyn Constraint>) -> Self {
        Self { child }
    }
}

impl Constraint for NotConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let inner = self.child.apply_to(actual)?;
        let actual_desc = inner.describe_actual().to_string();
        let result = if inner.success {
            ConstraintResult::failure(self.description(), actual_desc)
        } else {
            ConstraintResult::success(self.description(), actual_desc)
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("not {}", self.child.description())
    }
}

/// Succeeds iff both sides succeed. Both sides are always evaluated so
/// diagnostics can name every failing leg; on failure the failing
/// side(s) are reported.
#[derive(Debug)]
pub struct AndConstraint {
    left: Box<dyn Constraint>,
    right: Box<dyn Constraint>,
}

impl AndConstraint {
    pub fn new(left: impl Constraint + 'static, right: impl Constraint + 'static) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn boxed(left: Box<dyn Constraint>, right: Box<dyn Constraint>) -> Self {
        Self { left, right }
    }
}

impl Constraint for AndConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let actual = resolve_once(actual)?;
        let left = self.left.apply_to(&actual)?;
        let right = self.right.apply_to(&actual)?;

        if left.success && right.success {
            return Ok(ConstraintResult::success(
                self.description(),
                right.describe_actual().to_string(),
            ));
        }

        let mut failed = Vec::new();
        if !left.success {
            failed.push(format!(
                "{} (was {})",
                self.left.description(),
                left.describe_actual()
            ));
        }
        if !right.success {
            failed.push(format!(
                "{} (was {})",
                self.right.description(),
                right.describe_actual()
            ));
        }
        let path = if !left.success {
            left.failure_path
        } else {
            right.failure_path
        };
        Ok(
            ConstraintResult::failure(self.description(), failed.join("; "))
                .with_failure_path(path),
        )
    }

    fn description(&self) -> String {
        format!(
            "{} and {}",
            self.left.description(),
            self.right.description()
        )
    }
}

/// Succeeds iff either side succeeds. Both sides are always evaluated;
/// on failure both failures are reported.
#[derive(Debug)]
pub struct OrConstraint {
    left: Box<dyn Constraint>,
    right: Box<dyn Constraint>,
}

impl OrConstraint {
    pub fn new(left: impl Constraint + 'static, right: impl Constraint + 'static) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn boxed(left: Box<dyn Constraint>, right: Box<dyn Constraint>) -> Self {
        Self { left, right }
    }
}

impl Constraint for OrConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let actual = resolve_once(actual)?;
        let left = self.left.apply_to(&actual)?;
        let right = self.right.apply_to(&actual)?;

        if left.success || right.success {
            let winner = if left.success { &left } else { &right };
            return Ok(ConstraintResult::success(
                self.description(),
                winner.describe_actual().to_string(),
            ));
        }

        let actual_desc = format!(
            "{} (was {}); {} (was {})",
            self.left.description(),
            left.describe_actual(),
            self.right.description(),
            right.describe_actual()
        );
        Ok(
            ConstraintResult::failure(self.description(), actual_desc)
                .with_failure_path(left.failure_path),
        )
    }

    fn description(&self) -> String {
        format!(
            "{} or {}",
            self.left.description(),
            self.right.description()
        )
    }
}

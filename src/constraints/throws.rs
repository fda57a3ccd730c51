//! Exception-capture constraint.
//!
//! A thrown error captured here is data: it becomes the actual value
//! seen by the child constraint. Everywhere else a thrown error is a
//! usage error.

use crate::value::Actual;

use super::{Constraint, ConstraintResult, EvalError};

/// Invokes the actual-value provider and captures what it throws.
///
/// With no child, succeeds when anything at all was thrown. With a
/// child, the thrown value must also satisfy it. A provider that
/// completes normally is a failure; a plain (non-callable) actual value
/// is a usage error.
#[derive(Debug)]
pub struct ThrowsConstraint {
    child: Option<Box<dyn Constraint>>,
}

impl ThrowsConstraint {
    /// Succeed on any thrown value.
    pub fn anything() -> Self {
        Self { child: None }
    }

    /// Apply `child` to the thrown value.
    pub fn matching(child: impl Constraint + 'static) -> Self {
        Self {
            child: Some(Box::new(child)),
        }
    }

    pub fn boxed(child: Box<dyn Constraint>) -> Self {
        Self { child: Some(child) }
    }
}

impl Constraint for ThrowsConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let provider = match actual {
            Actual::Provider(f) => f,
            Actual::Value(_) => return Err(EvalError::NotCallable),
        };

        match provider() {
            Err(thrown) => match &self.child {
                None => Ok(ConstraintResult::success(
                    self.description(),
                    thrown.to_string(),
                )),
                Some(child) => {
                    let inner = child.apply_to(&Actual::Value(thrown))?;
                    let actual_desc = inner.describe_actual().to_string();
                    let result = if inner.success {
                        ConstraintResult::success(self.description(), actual_desc)
                    } else {
                        ConstraintResult::failure(self.description(), actual_desc)
                            .with_failure_path(inner.failure_path)
                    };
                    Ok(result)
                }
            },
            Ok(value) => Ok(ConstraintResult::failure(
                self.description(),
                format!("no error was thrown, completed with {}", value),
            )),
        }
    }

    fn description(&self) -> String {
        match &self.child {
            None => "an error to be thrown".to_string(),
            Some(child) => format!("thrown error {}", child.description()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{PropertyConstraint, StringConstraint};
    use crate::value::{ObjectData, Value};

    fn failing_provider() -> Actual {
        Actual::from_fn(|| {
            Err(Value::Object(ObjectData::with_fields(
                "ParseError",
                vec![("message", Value::from("unexpected token"))],
            )))
        })
    }

    #[test]
    fn test_captures_any_throw() {
        let constraint = ThrowsConstraint::anything();
        assert!(constraint.apply_to(&failing_provider()).unwrap().success);
    }

    #[test]
    fn test_no_throw_fails() {
        let constraint = ThrowsConstraint::anything();
        let ok = Actual::from_fn(|| Ok(Value::Int(1)));
        let result = constraint.apply_to(&ok).unwrap();
        assert!(!result.success);
        assert!(result.describe_actual().contains("no error was thrown"));
    }

    #[test]
    fn test_child_sees_thrown_value() {
        let constraint = ThrowsConstraint::matching(PropertyConstraint::new(
            "message",
            StringConstraint::contains("unexpected"),
        ));
        assert!(constraint.apply_to(&failing_provider()).unwrap().success);

        let wrong = ThrowsConstraint::matching(PropertyConstraint::new(
            "message",
            StringConstraint::contains("timeout"),
        ));
        assert!(!wrong.apply_to(&failing_provider()).unwrap().success);
    }

    #[test]
    fn test_plain_value_is_error() {
        let constraint = ThrowsConstraint::anything();
        assert!(matches!(
            constraint.apply_to(&Actual::of(1)),
            Err(EvalError::NotCallable)
        ));
    }
}

//! Type-test constraints over runtime kinds and declared object types.
//!
//! A null actual value always fails these tests; it never errors.

use crate::value::{Actual, TypeSpec, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

fn ancestry_of(value: &Value) -> Vec<String> {
    match value {
        Value::Object(obj) => obj.ancestry.clone(),
        _ => Vec::new(),
    }
}

fn result(success: bool, description: String, value: &Value) -> ConstraintResult {
    let actual = format!("{} ({})", value, value.type_name());
    if success {
        ConstraintResult::success(description, actual)
    } else {
        ConstraintResult::failure(description, actual)
    }
}

/// Tests that the actual value's runtime type is exactly the given type.
#[derive(Debug, Clone)]
pub struct ExactTypeConstraint {
    expected: TypeSpec,
}

impl ExactTypeConstraint {
    pub fn new(expected: impl Into<TypeSpec>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Constraint for ExactTypeConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let success = !value.is_null() && value.type_name() == self.expected.name;
        Ok(result(success, self.description(), &value))
    }

    fn description(&self) -> String {
        format!("of type <{}>", self.expected.name)
    }
}

/// Tests that the actual value is an instance of the given type: its own
/// type, or one of its declared ancestors.
#[derive(Debug, Clone)]
pub struct InstanceOfConstraint {
    expected: TypeSpec,
}

impl InstanceOfConstraint {
    pub fn new(expected: impl Into<TypeSpec>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Constraint for InstanceOfConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let success = !value.is_null()
            && (value.type_name() == self.expected.name
                || ancestry_of(&value).iter().any(|a| *a == self.expected.name));
        Ok(result(success, self.description(), &value))
    }

    fn description(&self) -> String {
        format!("instance of <{}>", self.expected.name)
    }
}

/// Tests that the actual value could be assigned to a slot of the given
/// type: same test as instance-of, read from the assignment direction.
#[derive(Debug, Clone)]
pub struct AssignableToConstraint {
    expected: TypeSpec,
}

impl AssignableToConstraint {
    pub fn new(expected: impl Into<TypeSpec>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Constraint for AssignableToConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let success = !value.is_null()
            && (value.type_name() == self.expected.name
                || ancestry_of(&value).iter().any(|a| *a == self.expected.name));
        Ok(result(success, self.description(), &value))
    }

    fn description(&self) -> String {
        format!("assignable to <{}>", self.expected.name)
    }
}

/// Tests that a slot of the actual value's type could accept the given
/// type: the given type's ancestry must reach the actual's type.
#[derive(Debug, Clone)]
pub struct AssignableFromConstraint {
    expected: TypeSpec,
}

impl AssignableFromConstraint {
    pub fn new(expected: impl Into<TypeSpec>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Constraint for AssignableFromConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let actual_type = value.type_name().to_string();
        let success = !value.is_null()
            && (self.expected.name == actual_type
                || self.expected.ancestry.iter().any(|a| *a == actual_type));
        Ok(result(success, self.description(), &value))
    }

    fn description(&self) -> String {
        format!("assignable from <{}>", self.expected.name)
    }
}

//! Property constraints: named-field lookup and scoping.

use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

/// Look up a named property on an object or a string-keyed map.
fn lookup(value: &Value, name: &str) -> Option<Value> {
    match value {
        Value::Object(obj) => obj.fields.borrow().get(name).cloned(),
        Value::Map(entries) => entries.iter().find_map(|(k, v)| match k {
            Value::Str(key) if key == name => Some(v.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// Tests that the actual value has a property with the given name.
/// Absence is a failure: the existence test itself is the constraint.
#[derive(Debug, Clone)]
pub struct PropertyExistsConstraint {
    name: String,
}

impl PropertyExistsConstraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Constraint for PropertyExistsConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let result = if lookup(&value, &self.name).is_some() {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(
                self.description(),
                format!("{} ({})", value, value.type_name()),
            )
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("property '{}'", self.name)
    }
}

/// Extracts a named property and applies a child constraint to its
/// value. A missing property is a usage error here, distinct from the
/// child merely failing.
#[derive(Debug)]
pub struct PropertyConstraint {
    name: String,
    child: Box<dyn Constraint>,
}

impl PropertyConstraint {
    pub fn new(name: impl Into<String>, child: impl Constraint + 'static) -> Self {
        Self {
            name: name.into(),
            child: Box::new(child),
        }
    }

    pub fn boxed(name: impl Into<String>, child: Box<dyn Constraint>) -> Self {
        Self {
            name: name.into(),
            child,
        }
    }
}

impl Constraint for PropertyConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let property = lookup(&value, &self.name).ok_or_else(|| EvalError::MissingProperty {
            name: self.name.clone(),
            type_name: value.type_name().to_string(),
        })?;

        let inner = self.child.apply_to(&Actual::Value(property))?;
        let actual_desc = inner.describe_actual().to_string();
        let result = if inner.success {
            ConstraintResult::success(self.description(), actual_desc)
        } else {
            ConstraintResult::failure(self.description(), actual_desc)
                .with_failure_path(inner.failure_path)
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("property '{}' {}", self.name, self.child.description())
    }
}

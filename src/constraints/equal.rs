//! Equality constraint: the front door to the structural comparer.

use crate::compare::{Comparer, EqualityAdapter};
use crate::tolerance::{Tolerance, ToleranceError};
use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

/// Tests that the actual value equals an expected value, with optional
/// tolerance, case rules, and an externally supplied comparer.
///
/// # Example
///
/// ```rust,ignore
/// use veracity::constraints::EqualConstraint;
/// use veracity::{Actual, Constraint};
///
/// let constraint = EqualConstraint::new(5.0).within(0.25)?;
/// let result = constraint.apply_to(&Actual::of(5.1))?;
/// assert!(result.success);
/// ```
#[derive(Debug, Clone)]
pub struct EqualConstraint {
    expected: Value,
    tolerance: Tolerance,
    adapter: Option<EqualityAdapter>,
    ignore_case: bool,
    as_collection: bool,
    by_members: bool,
}

impl EqualConstraint {
    pub fn new(expected: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
            tolerance: Tolerance::none(),
            adapter: None,
            ignore_case: false,
            as_collection: false,
            by_members: false,
        }
    }

    // =========================================================================
    // Modifiers (chainable)
    // =========================================================================

    /// Ignore case in string and char comparisons, at every depth.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Compare arrays as plain ordered collections, without regard to
    /// their shape.
    pub fn as_collection(mut self) -> Self {
        self.as_collection = true;
        self
    }

    /// Compare objects member-by-member instead of by identity.
    pub fn by_members(mut self) -> Self {
        self.by_members = true;
        self
    }

    /// Allow the actual value to deviate from the expected value by the
    /// given amount. May appear only once per constraint.
    pub fn within(mut self, amount: impl Into<Value>) -> Result<Self, ToleranceError> {
        if !self.tolerance.is_unset() {
            return Err(ToleranceError::AlreadyApplied);
        }
        self.tolerance = Tolerance::new(amount);
        Ok(self)
    }

    /// Interpret the tolerance as a percentage of the expected value.
    pub fn percent(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.percent()?;
        Ok(self)
    }

    /// Interpret the tolerance as a distance in representable values.
    pub fn ulps(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.ulps()?;
        Ok(self)
    }

    pub fn days(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.days()?;
        Ok(self)
    }

    pub fn hours(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.hours()?;
        Ok(self)
    }

    pub fn minutes(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.minutes()?;
        Ok(self)
    }

    pub fn seconds(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.seconds()?;
        Ok(self)
    }

    pub fn millis(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.millis()?;
        Ok(self)
    }

    pub fn ticks(mut self) -> Result<Self, ToleranceError> {
        self.tolerance = self.tolerance.ticks()?;
        Ok(self)
    }

    /// Use the supplied comparer in place of the structural algorithm for
    /// the pairs it claims.
    pub fn using(mut self, adapter: EqualityAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

impl Constraint for EqualConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;

        let mut comparer = Comparer::new()
            .ignore_case(self.ignore_case)
            .as_collection(self.as_collection)
            .by_members(self.by_members);
        if let Some(adapter) = &self.adapter {
            comparer = comparer.with_adapter(adapter.clone());
        }

        let equal = comparer.are_equal(&self.expected, &value, &self.tolerance)?;
        let result = if equal {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
                .with_failure_path(comparer.take_failure_points())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        let mut parts = vec![self.expected.to_string()];
        if !self.tolerance.is_unset() {
            parts.push(self.tolerance.to_string());
        }
        if self.ignore_case {
            parts.push("ignoring case".to_string());
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_equality() {
        let constraint = EqualConstraint::new(42);
        assert!(constraint.apply_to(&Actual::of(42)).unwrap().success);
        assert!(!constraint.apply_to(&Actual::of(41)).unwrap().success);
    }

    #[test]
    fn test_within_tolerance() {
        let constraint = EqualConstraint::new(5.0).within(0.25).unwrap();
        assert!(constraint.apply_to(&Actual::of(5.2)).unwrap().success);
        assert!(!constraint.apply_to(&Actual::of(5.3)).unwrap().success);
    }

    #[test]
    fn test_second_within_rejected() {
        let err = EqualConstraint::new(5.0)
            .within(0.25)
            .unwrap()
            .within(0.5)
            .unwrap_err();
        assert_eq!(err, ToleranceError::AlreadyApplied);
    }

    #[test]
    fn test_ignore_case() {
        let constraint = EqualConstraint::new("Hello").ignore_case();
        assert!(constraint.apply_to(&Actual::of("HELLO")).unwrap().success);
    }

    #[test]
    fn test_failure_carries_path() {
        let constraint = EqualConstraint::new(vec![1, 2, 3]);
        let result = constraint.apply_to(&Actual::of(vec![1, 9, 3])).unwrap();
        assert!(!result.success);
        assert_eq!(result.failure_path.len(), 1);
    }

    #[test]
    fn test_description_mentions_tolerance() {
        let constraint = EqualConstraint::new(5).within(1).unwrap();
        assert!(constraint.description().contains("+/- 1"));
    }

    #[test]
    fn test_provider_resolution() {
        let constraint = EqualConstraint::new(7);
        let actual = Actual::from_fn(|| Ok(Value::Int(7)));
        assert!(constraint.apply_to(&actual).unwrap().success);
    }

    #[test]
    fn test_uncaught_throw_is_error() {
        let constraint = EqualConstraint::new(7);
        let actual = Actual::from_fn(|| Err(Value::from("boom")));
        assert!(matches!(
            constraint.apply_to(&actual),
            Err(EvalError::UncaughtThrow { .. })
        ));
    }
}

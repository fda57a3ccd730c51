//! Collection constraints built on the multiset tally: equivalence,
//! subset, and membership.

use crate::compare::{Comparer, EqualityAdapter};
use crate::tally::CollectionTally;
use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

fn seq_of(value: &Value) -> Result<&[Value], EvalError> {
    value.seq_elems().ok_or_else(|| EvalError::NotASequence {
        kind: value.kind().to_string(),
    })
}

fn comparer_for(ignore_case: bool, adapter: &Option<EqualityAdapter>) -> Comparer {
    let mut comparer = Comparer::new().ignore_case(ignore_case);
    if let Some(adapter) = adapter {
        comparer = comparer.with_adapter(adapter.clone());
    }
    comparer
}

/// Tests that the actual sequence holds the same items as the expected
/// sequence, irrespective of order but respecting multiplicity.
#[derive(Debug, Clone)]
pub struct CollectionEquivalentConstraint {
    expected: Value,
    ignore_case: bool,
    adapter: Option<EqualityAdapter>,
}

impl CollectionEquivalentConstraint {
    pub fn new(expected: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
            ignore_case: false,
            adapter: None,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn using(mut self, adapter: EqualityAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

impl Constraint for CollectionEquivalentConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let expected_items = seq_of(&self.expected)?;
        let actual_items = seq_of(&value)?;

        // Counted collections of unequal size cannot be equivalent.
        let equivalent = expected_items.len() == actual_items.len() && {
            let mut tally = CollectionTally::new(
                comparer_for(self.ignore_case, &self.adapter),
                expected_items.iter().cloned(),
            );
            tally.try_remove_all(actual_items.iter()) && tally.is_empty()
        };

        let result = if equivalent {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("equivalent to {}", self.expected)
    }
}

/// Tests that every item of the actual sequence appears in the expected
/// superset, respecting multiplicity.
#[derive(Debug, Clone)]
pub struct CollectionSubsetConstraint {
    superset: Value,
    ignore_case: bool,
    adapter: Option<EqualityAdapter>,
}

impl CollectionSubsetConstraint {
    pub fn new(superset: impl Into<Value>) -> Self {
        Self {
            superset: superset.into(),
            ignore_case: false,
            adapter: None,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn using(mut self, adapter: EqualityAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

impl Constraint for CollectionSubsetConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let superset_items = seq_of(&self.superset)?;
        let actual_items = seq_of(&value)?;

        let mut tally = CollectionTally::new(
            comparer_for(self.ignore_case, &self.adapter),
            superset_items.iter().cloned(),
        );
        let contained = tally.try_remove_all(actual_items.iter());

        let result = if contained {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("subset of {}", self.superset)
    }
}

/// Tests that the actual sequence contains at least one item equal to
/// the expected item: a size-one probe against the tally.
#[derive(Debug, Clone)]
pub struct CollectionContainsConstraint {
    item: Value,
    ignore_case: bool,
    adapter: Option<EqualityAdapter>,
}

impl CollectionContainsConstraint {
    pub fn new(item: impl Into<Value>) -> Self {
        Self {
            item: item.into(),
            ignore_case: false,
            adapter: None,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn using(mut self, adapter: EqualityAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

impl Constraint for CollectionContainsConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let actual_items = seq_of(&value)?;

        let mut tally = CollectionTally::new(
            comparer_for(self.ignore_case, &self.adapter),
            actual_items.iter().cloned(),
        );
        let found = tally.try_remove(&self.item);

        let result = if found {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("collection containing {}", self.item)
    }
}

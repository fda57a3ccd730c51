//! Multiset tally for order-insensitive collection matching.
//!
//! A tally is a working copy of one side of a comparison. Matching
//! removes items one at a time, so multiplicities are respected: two
//! occurrences in the probe need two occurrences in the tally. Tallies
//! are built, mutated, read, and dropped within a single comparison.

use crate::compare::Comparer;
use crate::tolerance::Tolerance;
use crate::value::Value;

/// Mutable multiset of values with comparer-driven membership.
#[derive(Debug)]
pub struct CollectionTally {
    comparer: Comparer,
    items: Vec<Value>,
}

impl CollectionTally {
    /// Build a tally of `items`, using `comparer` for item equality.
    pub fn new(comparer: Comparer, items: impl IntoIterator<Item = Value>) -> Self {
        Self {
            comparer,
            items: items.into_iter().collect(),
        }
    }

    /// Number of items remaining.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove one item equal to `value`. Returns false if none remains.
    pub fn try_remove(&mut self, value: &Value) -> bool {
        for index in 0..self.items.len() {
            let matched = self
                .comparer
                .are_equal(&self.items[index], value, &Tolerance::none())
                .unwrap_or(false);
            if matched {
                self.items.remove(index);
                return true;
            }
        }
        false
    }

    /// Remove one matching item per value, stopping at the first value
    /// with no remaining match. Not atomic: items removed before the
    /// failure stay removed.
    pub fn try_remove_all<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) -> bool {
        for value in values {
            if !self.try_remove(value) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_of(items: Vec<i64>) -> CollectionTally {
        CollectionTally::new(Comparer::new(), items.into_iter().map(Value::Int))
    }

    #[test]
    fn test_remove_decrements_once() {
        let mut tally = tally_of(vec![1, 1, 2]);
        assert!(tally.try_remove(&Value::Int(1)));
        assert_eq!(tally.len(), 2);
        assert!(tally.try_remove(&Value::Int(1)));
        assert!(!tally.try_remove(&Value::Int(1)));
    }

    #[test]
    fn test_remove_all_order_insensitive() {
        let mut tally = tally_of(vec![1, 2, 3]);
        let probe = [Value::Int(3), Value::Int(1), Value::Int(2)];
        assert!(tally.try_remove_all(probe.iter()));
        assert!(tally.is_empty());
    }

    #[test]
    fn test_remove_all_respects_multiplicity() {
        let mut tally = tally_of(vec![1, 1, 2]);
        let probe = [Value::Int(1), Value::Int(2), Value::Int(2)];
        assert!(!tally.try_remove_all(probe.iter()));
    }

    #[test]
    fn test_failed_remove_all_keeps_prior_removals() {
        let mut tally = tally_of(vec![1, 2]);
        let probe = [Value::Int(1), Value::Int(9)];
        assert!(!tally.try_remove_all(probe.iter()));
        // 1 was removed before the miss on 9.
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn test_comparer_rules_apply_to_membership() {
        let comparer = Comparer::new().ignore_case(true);
        let mut tally = CollectionTally::new(
            comparer,
            vec![Value::from("Alpha"), Value::from("Beta")],
        );
        assert!(tally.try_remove(&Value::from("ALPHA")));
    }
}

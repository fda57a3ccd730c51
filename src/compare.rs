//! Structural equality over `Value`s.
//!
//! `Comparer` walks two values recursively, honoring tolerances, case
//! rules, and externally supplied comparers, and records the chain of
//! positions at which the comparison first diverged so a renderer can
//! print "at index [1] -> at member x.y -> ...".

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::numerics;
use crate::tally::CollectionTally;
use crate::tolerance::{Tolerance, ToleranceMode};
use crate::value::{ObjectRef, Value};

/// Error type for comparison misuse. These are usage errors, distinct
/// from a comparison that legitimately found the values unequal.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("ulps tolerance may only be specified for floating point values")]
    UlpsRequiresFloat,

    #[error("tolerance {tolerance} cannot be applied to {target} values")]
    BadToleranceAmount { tolerance: String, target: String },

    #[error("tolerance mode {0:?} cannot be applied to numeric values")]
    BadToleranceMode(ToleranceMode),
}

/// Position within a nested structure where a comparison diverged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Coordinate {
    /// Flat position in an ordered sequence.
    Index(usize),
    /// Per-dimension position in a multi-rank array.
    MultiIndex(Vec<usize>),
    /// Positions implied by each side's shape, when the shapes disagree.
    BothIndices {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// Offending key of a keyed collection.
    Key(String),
    /// Offending member of an object compared by members.
    Member(String),
    /// First differing character of a string comparison.
    CharIndex(usize),
    /// First differing offset of a byte comparison.
    ByteOffset(usize),
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Index(i) => write!(f, "[{}]", i),
            Coordinate::MultiIndex(indices) => {
                for i in indices {
                    write!(f, "[{}]", i)?;
                }
                Ok(())
            }
            Coordinate::BothIndices { expected, actual } => {
                write!(f, "expected ")?;
                for i in expected {
                    write!(f, "[{}]", i)?;
                }
                write!(f, ", actual ")?;
                for i in actual {
                    write!(f, "[{}]", i)?;
                }
                Ok(())
            }
            Coordinate::Key(k) => write!(f, "[{}]", k),
            Coordinate::Member(name) => write!(f, ".{}", name),
            Coordinate::CharIndex(i) => write!(f, "char {}", i),
            Coordinate::ByteOffset(i) => write!(f, "offset {}", i),
        }
    }
}

/// One level of the failure trace, outermost first.
#[derive(Debug, Clone, Serialize)]
pub struct FailurePoint {
    pub coordinate: Coordinate,
    /// Rendered expected value at this level, if one existed.
    pub expected: Option<String>,
    /// Rendered actual value at this level, if one existed.
    pub actual: Option<String>,
}

/// Outcome of a standalone comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub equal: bool,
    /// Failure trace, outermost coordinate first. Empty on success.
    pub failure_points: Vec<FailurePoint>,
}

/// Externally supplied equality, taking precedence over the structural
/// algorithm for the pairs it claims.
#[derive(Clone)]
pub struct EqualityAdapter {
    applies: Option<Rc<dyn Fn(&Value, &Value) -> bool>>,
    eq: Rc<dyn Fn(&Value, &Value) -> bool>,
}

impl EqualityAdapter {
    /// Adapter from an equality function, claiming every pair.
    pub fn from_fn(eq: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self {
            applies: None,
            eq: Rc::new(eq),
        }
    }

    /// Adapter from an ordering function: equal iff it returns
    /// `Some(Ordering::Equal)`.
    pub fn from_ordering(cmp: impl Fn(&Value, &Value) -> Option<Ordering> + 'static) -> Self {
        Self {
            applies: None,
            eq: Rc::new(move |a, b| cmp(a, b) == Some(Ordering::Equal)),
        }
    }

    /// Restrict the adapter to pairs it claims.
    pub fn with_filter(mut self, applies: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        self.applies = Some(Rc::new(applies));
        self
    }

    /// Restrict the adapter to pairs whose kinds both appear in `kinds`.
    pub fn for_kinds(self, kinds: &[&str]) -> Self {
        let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        self.with_filter(move |a, b| {
            kinds.iter().any(|k| k == a.kind()) && kinds.iter().any(|k| k == b.kind())
        })
    }

    pub fn can_compare(&self, a: &Value, b: &Value) -> bool {
        match &self.applies {
            Some(f) => f(a, b),
            None => true,
        }
    }

    pub fn are_equal(&self, a: &Value, b: &Value) -> bool {
        (self.eq)(a, b)
    }
}

impl fmt::Debug for EqualityAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityAdapter")
            .field("filtered", &self.applies.is_some())
            .finish()
    }
}

/// Recursive structural comparer. Configure with the chainable methods,
/// then call `are_equal` (reusable) or `check` (consuming).
#[derive(Debug, Default, Clone)]
pub struct Comparer {
    ignore_case: bool,
    as_collection: bool,
    by_members: bool,
    external: Vec<EqualityAdapter>,
    failure_points: Vec<FailurePoint>,
    /// (expected, actual) object address pairs on the active recursion
    /// path. A repeated pair closes a cycle and counts as a match.
    visiting: Vec<(usize, usize)>,
}

impl Comparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore case in string and char comparisons, at every depth.
    pub fn ignore_case(mut self, value: bool) -> Self {
        self.ignore_case = value;
        self
    }

    /// Degrade arrays to plain ordered sequences: shapes are ignored and
    /// elements compare in flattened order.
    pub fn as_collection(mut self, value: bool) -> Self {
        self.as_collection = value;
        self
    }

    /// Compare objects without a custom equality member-by-member instead
    /// of by identity.
    pub fn by_members(mut self, value: bool) -> Self {
        self.by_members = value;
        self
    }

    /// Attach an external comparer. Adapters are consulted in order.
    pub fn with_adapter(mut self, adapter: EqualityAdapter) -> Self {
        self.external.push(adapter);
        self
    }

    /// Failure trace of the most recent `are_equal` call, outermost first.
    pub fn failure_points(&self) -> &[FailurePoint] {
        &self.failure_points
    }

    pub fn take_failure_points(&mut self) -> Vec<FailurePoint> {
        std::mem::take(&mut self.failure_points)
    }

    /// A comparer with the same configuration and a clean slate, for
    /// subsidiary comparisons whose traces must not leak into this one.
    pub(crate) fn subcomparer(&self) -> Comparer {
        Comparer {
            ignore_case: self.ignore_case,
            as_collection: self.as_collection,
            by_members: self.by_members,
            external: self.external.clone(),
            failure_points: Vec::new(),
            visiting: Vec::new(),
        }
    }

    /// Compare two values under a tolerance. The failure trace of a prior
    /// call is discarded.
    pub fn are_equal(
        &mut self,
        expected: &Value,
        actual: &Value,
        tolerance: &Tolerance,
    ) -> Result<bool, CompareError> {
        self.failure_points.clear();
        self.visiting.clear();
        self.values_equal(expected, actual, tolerance)
    }

    /// One-shot comparison consuming the comparer.
    pub fn check(
        mut self,
        expected: &Value,
        actual: &Value,
        tolerance: &Tolerance,
    ) -> Result<Comparison, CompareError> {
        let equal = self.are_equal(expected, actual, tolerance)?;
        Ok(Comparison {
            equal,
            failure_points: self.failure_points,
        })
    }

    fn values_equal(
        &mut self,
        expected: &Value,
        actual: &Value,
        tol: &Tolerance,
    ) -> Result<bool, CompareError> {
        if expected.is_null() || actual.is_null() {
            return Ok(expected.is_null() && actual.is_null());
        }

        if let Some(adapter) = self
            .external
            .iter()
            .find(|a| a.can_compare(expected, actual))
        {
            return Ok(adapter.are_equal(expected, actual));
        }

        match (expected, actual) {
            // Strict array comparison: rank and trailing dimensions must
            // agree. A first-dimension difference falls through to the
            // element walk so the failure position is recorded.
            (Value::Array(x), Value::Array(y)) if !self.as_collection => {
                if x.rank() != y.rank() {
                    return Ok(false);
                }
                if (1..x.rank()).any(|r| x.shape[r] != y.shape[r]) {
                    return Ok(false);
                }
                self.sequences_equal(expected, actual, tol)
            }
            (Value::Map(x), Value::Map(y)) => self.maps_equal(x, y, tol),
            (Value::Str(x), Value::Str(y)) => Ok(self.strings_equal(x, y)),
            (Value::Char(x), Value::Char(y)) => Ok(self.chars_equal(*x, *y)),
            (Value::Bytes(x), Value::Bytes(y)) => Ok(self.bytes_equal(x, y)),
            (Value::Duration(x), Value::Duration(y)) => numerics::durations_equal(*x, *y, tol),
            (x, y) if x.is_numeric() && y.is_numeric() => numerics::are_equal(x, y, tol),
            (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
            (Value::Object(x), Value::Object(y)) => self.objects_equal(x, y, tol),
            (x, y) => match (x.seq_elems(), y.seq_elems()) {
                (Some(_), Some(_)) => self.sequences_equal(x, y, tol),
                // Type-incompatible pairs fail; they are not an error.
                _ => Ok(false),
            },
        }
    }

    /// Element-by-element walk of two ordered sequences. On the first
    /// mismatch (value or length) the position is recorded in front of
    /// any coordinates the recursion already pushed.
    fn sequences_equal(
        &mut self,
        expected: &Value,
        actual: &Value,
        tol: &Tolerance,
    ) -> Result<bool, CompareError> {
        let xs = expected.seq_elems().unwrap_or(&[]);
        let ys = actual.seq_elems().unwrap_or(&[]);

        let len = xs.len().max(ys.len());
        for i in 0..len {
            let (xe, ye) = (xs.get(i), ys.get(i));
            let matched = match (xe, ye) {
                (Some(xe), Some(ye)) => self.values_equal(xe, ye, tol)?,
                _ => false,
            };
            if !matched {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: seq_coordinate(expected, actual, i),
                        expected: xe.map(Value::to_string),
                        actual: ye.map(Value::to_string),
                    },
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn maps_equal(
        &mut self,
        x: &[(Value, Value)],
        y: &[(Value, Value)],
        tol: &Tolerance,
    ) -> Result<bool, CompareError> {
        if x.len() != y.len() {
            return Ok(false);
        }

        // Key sets must tally out irrespective of entry order.
        let mut tally =
            CollectionTally::new(self.subcomparer(), x.iter().map(|(k, _)| k.clone()));
        for (key, _) in y {
            if !tally.try_remove(key) {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: Coordinate::Key(key.to_string()),
                        expected: None,
                        actual: Some(key.to_string()),
                    },
                );
                return Ok(false);
            }
        }

        for (key, expected_value) in x {
            let mut key_comparer = self.subcomparer();
            let found = y.iter().find(|(yk, _)| {
                key_comparer
                    .are_equal(key, yk, &Tolerance::none())
                    .unwrap_or(false)
            });
            let actual_value = match found {
                Some((_, v)) => v,
                None => return Ok(false),
            };
            if !self.values_equal(expected_value, actual_value, tol)? {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: Coordinate::Key(key.to_string()),
                        expected: Some(expected_value.to_string()),
                        actual: Some(actual_value.to_string()),
                    },
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn strings_equal(&mut self, x: &str, y: &str) -> bool {
        let (a, b) = if self.ignore_case {
            (x.to_lowercase(), y.to_lowercase())
        } else {
            (x.to_string(), y.to_string())
        };
        if a == b {
            return true;
        }
        let mismatch = first_mismatch(&a, &b);
        self.failure_points.insert(
            0,
            FailurePoint {
                coordinate: Coordinate::CharIndex(mismatch),
                expected: Some(Value::Str(x.to_string()).to_string()),
                actual: Some(Value::Str(y.to_string()).to_string()),
            },
        );
        false
    }

    fn chars_equal(&self, x: char, y: char) -> bool {
        if self.ignore_case {
            x.to_lowercase().eq(y.to_lowercase())
        } else {
            x == y
        }
    }

    /// Byte content compares by length first, then by offset.
    fn bytes_equal(&mut self, x: &[u8], y: &[u8]) -> bool {
        if x.len() != y.len() {
            return false;
        }
        match x.iter().zip(y.iter()).position(|(a, b)| a != b) {
            None => true,
            Some(offset) => {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: Coordinate::ByteOffset(offset),
                        expected: Some(x[offset].to_string()),
                        actual: Some(y[offset].to_string()),
                    },
                );
                false
            }
        }
    }

    fn objects_equal(
        &mut self,
        x: &ObjectRef,
        y: &ObjectRef,
        tol: &Tolerance,
    ) -> Result<bool, CompareError> {
        // A custom equality operation is a trust boundary: delegate and do
        // not recurse into the structure behind it.
        if let Some(eq) = x.equals.as_ref().or(y.equals.as_ref()) {
            let eq = Rc::clone(eq);
            return Ok(eq(&Value::Object(Rc::clone(x)), &Value::Object(Rc::clone(y))));
        }

        if Rc::ptr_eq(x, y) {
            return Ok(true);
        }
        if !self.by_members {
            return Ok(false);
        }
        if x.type_name != y.type_name {
            return Ok(false);
        }

        let pair = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
        if self.visiting.contains(&pair) {
            // Cycle closure: the pair is already under comparison higher
            // up the path; the rest of the structure decides the outcome.
            return Ok(true);
        }
        self.visiting.push(pair);
        let result = self.members_equal(x, y, tol);
        self.visiting.pop();
        result
    }

    fn members_equal(
        &mut self,
        x: &ObjectRef,
        y: &ObjectRef,
        tol: &Tolerance,
    ) -> Result<bool, CompareError> {
        let x_fields = x.fields.borrow();
        let y_fields = y.fields.borrow();

        for name in x_fields.keys() {
            if !y_fields.contains_key(name) {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: Coordinate::Member(name.clone()),
                        expected: x_fields.get(name).map(Value::to_string),
                        actual: None,
                    },
                );
                return Ok(false);
            }
        }
        for name in y_fields.keys() {
            if !x_fields.contains_key(name) {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: Coordinate::Member(name.clone()),
                        expected: None,
                        actual: y_fields.get(name).map(Value::to_string),
                    },
                );
                return Ok(false);
            }
        }

        for (name, expected_value) in x_fields.iter() {
            let actual_value = match y_fields.get(name) {
                Some(v) => v,
                None => return Ok(false),
            };
            if !self.values_equal(expected_value, actual_value, tol)? {
                self.failure_points.insert(
                    0,
                    FailurePoint {
                        coordinate: Coordinate::Member(name.clone()),
                        expected: Some(expected_value.to_string()),
                        actual: Some(actual_value.to_string()),
                    },
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Standalone comparison with default options.
pub fn compare(expected: &Value, actual: &Value) -> Result<Comparison, CompareError> {
    Comparer::new().check(expected, actual, &Tolerance::none())
}

/// Coordinate of a sequence mismatch at flat index `i`, expressed in the
/// shapes of the operands: a multi-index when both sides agree on shape,
/// both implied positions when they disagree, a flat index otherwise.
fn seq_coordinate(expected: &Value, actual: &Value, i: usize) -> Coordinate {
    match (expected, actual) {
        (Value::Array(x), Value::Array(y)) => {
            if x.shape == y.shape {
                Coordinate::MultiIndex(x.indices_of(i))
            } else {
                Coordinate::BothIndices {
                    expected: x.indices_of(i),
                    actual: y.indices_of(i),
                }
            }
        }
        (Value::Array(x), _) if x.rank() > 1 => Coordinate::BothIndices {
            expected: x.indices_of(i),
            actual: vec![i],
        },
        (_, Value::Array(y)) if y.rank() > 1 => Coordinate::BothIndices {
            expected: vec![i],
            actual: y.indices_of(i),
        },
        _ => Coordinate::Index(i),
    }
}

/// First differing character index, length-aware: a strict prefix
/// mismatches at the shorter length.
fn first_mismatch(a: &str, b: &str) -> usize {
    let mut i = 0;
    let mut bs = b.chars();
    for ac in a.chars() {
        match bs.next() {
            Some(bc) if bc == ac => i += 1,
            _ => return i,
        }
    }
    i
}

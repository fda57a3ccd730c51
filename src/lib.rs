//! # veracity
//!
//! A constraint-based assertion library: composable predicates with a
//! structural equality engine that explains *why* an expectation failed.
//!
//! A constraint is a reusable test against a value. Leaf constraints
//! (equality, ordering, type, string, path, property, throws, delayed)
//! combine through negation, and/or connectives, and collection
//! quantifiers. The fluent `expect()` chain assembles constraint trees
//! left-to-right using operator precedence, so the chain reads as the
//! natural logical expression without explicit grouping.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use veracity::{expect, Actual};
//!
//! let constraint = expect()
//!     .all()
//!     .greater_than(0)
//!     .and()
//!     .less_than(100)
//!     .resolve()?;
//!
//! let result = constraint.apply_to(&Actual::of(vec![1, 50, 99]))?;
//! assert!(result.success);
//! ```
//!
//! ## Standalone Comparison
//!
//! ```rust,ignore
//! use veracity::{compare, Value};
//!
//! let outcome = compare(
//!     &Value::array2(vec![vec![1, 2], vec![3, 4]]),
//!     &Value::array2(vec![vec![1, 2], vec![3, 0]]),
//! )?;
//! assert!(!outcome.equal);
//! // Reports the mismatch at [1][1].
//! println!("{:?}", outcome.failure_points);
//! ```
//!
//! ## Outcomes
//!
//! Three outcomes stay distinct end to end: a *failure* is an `Ok`
//! result with `success == false`; a usage *error* (wrong actual shape,
//! missing property, malformed expression) is an `Err`; an error value
//! captured by `throws()` is data for its child constraint.

pub mod compare;
pub mod constraints;
pub mod expr;
pub mod numerics;
pub mod render;
pub mod tally;
pub mod tolerance;
pub mod value;

// Core types
pub use compare::{compare, Comparer, Comparison, Coordinate, EqualityAdapter, FailurePoint};
pub use constraints::{Constraint, ConstraintResult, EvalError};
pub use tolerance::{Tolerance, ToleranceError};
pub use value::{Actual, ArrayValue, ObjectData, TypeSpec, Value};

// Expression assembly
pub use expr::{expect, BuildError, ConstraintBuilder, Expr};

// Diagnostics
pub use render::{Renderer, TextRenderer};

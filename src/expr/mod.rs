//! Expression assembly: fluent surface and precedence builder.
//!
//! A chain like `expect().not().equal_to(1).and().greater_than(0)` emits
//! a token stream that the builder reduces into a constraint tree
//! matching the intuitive reading of the chain: `and` binds tighter than
//! `or`, prefix operators swallow as much of the following chain as
//! their precedence allows, and quantifiers reach over a trailing
//! and/or pair.
//!
//! # Example
//!
//! ```rust,ignore
//! use veracity::{expect, Actual};
//!
//! let constraint = expect()
//!     .prop("status")
//!     .equal_to("ready")
//!     .resolve()?;
//! let result = constraint.apply_to(&Actual::of(server_state))?;
//! assert!(result.success);
//! ```

mod builder;
mod fluent;

pub use builder::{BuildError, ConstraintBuilder, Op};
pub use fluent::{expect, Expr};

#[cfg(test)]
mod tests;

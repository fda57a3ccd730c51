//! Two-stack precedence builder for constraint expressions.
//!
//! A fluent chain produces a linear stream of tokens: leaf constraints,
//! prefix operators (not, quantifiers, property scope, throws, delay),
//! and binary connectives (and, or). The builder reduces that stream
//! into a single constraint tree using left/right precedence values, so
//! a left-to-right chain reads as the natural logical expression without
//! explicit grouping.
//!
//! Each operator carries a *left* precedence (how tightly it binds to
//! what precedes it, used when it is about to be pushed) and a *right*
//! precedence (how much of the following chain it swallows, used while
//! it sits on the stack). Lower numbers bind tighter. Pushing an
//! operator first reduces every stacked operator whose right precedence
//! is lower than the incoming left precedence.

use std::time::Duration;

use crate::constraints::{
    AllItemsConstraint, AndConstraint, Constraint, DelayedConstraint, NoItemsConstraint,
    NotConstraint, OrConstraint, PropertyConstraint, PropertyExistsConstraint,
    SomeItemsConstraint, ThrowsConstraint,
};

/// Error type for malformed token streams. Build errors are fatal to the
/// expression; there is no partial recovery.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("operator '{operator}' is missing an operand")]
    MissingOperand { operator: &'static str },

    #[error("a partial expression may not be resolved")]
    Incomplete,
}

/// An operator token of the expression stream.
#[derive(Debug, Clone)]
pub enum Op {
    Not,
    All,
    Some,
    None,
    /// Grouping-only prefix: wraps its operand unchanged, but changes
    /// evaluation order through its precedence.
    With,
    Prop(String),
    Throws,
    Delay {
        timeout: Duration,
        interval: Duration,
    },
    And,
    Or,
}

impl Op {
    fn name(&self) -> &'static str {
        match self {
            Op::Not => "not",
            Op::All => "all",
            Op::Some => "some",
            Op::None => "none",
            Op::With => "with",
            Op::Prop(_) => "prop",
            Op::Throws => "throws",
            Op::Delay { .. } => "after",
            Op::And => "and",
            Op::Or => "or",
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self, Op::And | Op::Or)
    }

    fn is_quantifier(&self) -> bool {
        matches!(self, Op::All | Op::Some | Op::None)
    }

    /// Operators that can reduce with no operand following them.
    fn is_self_resolving(&self) -> bool {
        matches!(self, Op::Prop(_) | Op::Throws)
    }

    /// (left, right) base precedence.
    fn base_precedence(&self) -> (u32, u32) {
        match self {
            Op::Not => (1, 1),
            Op::All | Op::Some | Op::None => (1, 10),
            Op::With => (1, 4),
            Op::Prop(_) => (1, 1),
            Op::Throws => (1, 100),
            Op::Delay { .. } => (1, 100),
            Op::And => (2, 2),
            Op::Or => (3, 3),
        }
    }
}

/// What follows an operator in the stream, once known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Empty,
    Binary,
    Quantifier,
    Prefix,
    Leaf,
}

#[derive(Debug)]
struct PendingOp {
    op: Op,
    right_context: Context,
}

impl PendingOp {
    fn new(op: Op) -> Self {
        Self {
            op,
            right_context: Context::Empty,
        }
    }

    /// Binary operators bind looser by 10 when a quantifier follows, so
    /// the quantifier reaches over both legs of the connective.
    fn bump(&self) -> u32 {
        if self.op.is_binary() && self.right_context == Context::Quantifier {
            10
        } else {
            0
        }
    }

    fn left_precedence(&self) -> u32 {
        self.op.base_precedence().0 + self.bump()
    }

    fn right_precedence(&self) -> u32 {
        self.op.base_precedence().1 + self.bump()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Last {
    #[default]
    Empty,
    Operator,
    Leaf,
}

/// Assembles a token stream into one constraint tree.
#[derive(Default)]
pub struct ConstraintBuilder {
    ops: Vec<PendingOp>,
    constraints: Vec<Box<dyn Constraint>>,
    last: Last,
}

impl ConstraintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operator token, reducing lower-precedence operators
    /// first.
    pub fn append_operator(&mut self, op: Op) -> Result<(), BuildError> {
        if self.last == Last::Operator {
            let context = if op.is_binary() {
                Context::Binary
            } else if op.is_quantifier() {
                Context::Quantifier
            } else {
                Context::Prefix
            };
            self.set_top_right_context(context)?;
        }

        let pending = PendingOp::new(op);
        self.reduce_while(pending.left_precedence())?;
        self.ops.push(pending);
        self.last = Last::Operator;
        Ok(())
    }

    /// Append a leaf constraint token.
    pub fn append_constraint(&mut self, constraint: Box<dyn Constraint>) -> Result<(), BuildError> {
        if self.last == Last::Operator {
            self.set_top_right_context(Context::Leaf)?;
        }
        self.constraints.push(constraint);
        self.last = Last::Leaf;
        Ok(())
    }

    /// Reduce the remaining stream to a single root constraint.
    pub fn resolve(mut self) -> Result<Box<dyn Constraint>, BuildError> {
        let resolvable = match self.last {
            Last::Leaf => true,
            Last::Operator => self
                .ops
                .last()
                .map_or(false, |top| top.op.is_self_resolving()),
            Last::Empty => false,
        };
        if !resolvable {
            return Err(BuildError::Incomplete);
        }

        while let Some(op) = self.ops.pop() {
            self.reduce(op)?;
        }
        self.constraints.pop().ok_or(BuildError::Incomplete)
    }

    /// Record what follows the stacked operator. A binary operator whose
    /// precedence rises re-reduces the region of the stack below it.
    fn set_top_right_context(&mut self, context: Context) -> Result<(), BuildError> {
        let old_left = match self.ops.last() {
            Some(top) => top.left_precedence(),
            None => return Ok(()),
        };
        if let Some(top) = self.ops.last_mut() {
            top.right_context = context;
        }
        let new_left = self
            .ops
            .last()
            .map(PendingOp::left_precedence)
            .unwrap_or(old_left);
        if new_left > old_left {
            if let Some(changed) = self.ops.pop() {
                self.reduce_while(changed.left_precedence())?;
                self.ops.push(changed);
            }
        }
        Ok(())
    }

    fn reduce_while(&mut self, target: u32) -> Result<(), BuildError> {
        while self
            .ops
            .last()
            .map_or(false, |top| top.right_precedence() < target)
        {
            if let Some(op) = self.ops.pop() {
                self.reduce(op)?;
            }
        }
        Ok(())
    }

    /// Produce a constraint from the operator and its operand(s), taken
    /// from the constraint stack, and push the result back.
    fn reduce(&mut self, pending: PendingOp) -> Result<(), BuildError> {
        let name = pending.op.name();
        let trailing = matches!(pending.right_context, Context::Empty | Context::Binary);

        let constraint: Box<dyn Constraint> = match pending.op {
            Op::Not => Box::new(NotConstraint::boxed(self.pop_operand(name)?)),
            Op::All => Box::new(AllItemsConstraint::boxed(self.pop_operand(name)?)),
            Op::Some => Box::new(SomeItemsConstraint::boxed(self.pop_operand(name)?)),
            Op::None => Box::new(NoItemsConstraint::boxed(self.pop_operand(name)?)),
            Op::With => self.pop_operand(name)?,
            Op::Prop(prop_name) => {
                if trailing {
                    Box::new(PropertyExistsConstraint::new(prop_name))
                } else {
                    Box::new(PropertyConstraint::boxed(prop_name, self.pop_operand(name)?))
                }
            }
            Op::Throws => {
                if trailing {
                    Box::new(ThrowsConstraint::anything())
                } else {
                    Box::new(ThrowsConstraint::boxed(self.pop_operand(name)?))
                }
            }
            Op::Delay { timeout, interval } => Box::new(DelayedConstraint::boxed(
                self.pop_operand(name)?,
                timeout,
                interval,
            )),
            Op::And => {
                let right = self.pop_operand(name)?;
                let left = self.pop_operand(name)?;
                Box::new(AndConstraint::boxed(left, right))
            }
            Op::Or => {
                let right = self.pop_operand(name)?;
                let left = self.pop_operand(name)?;
                Box::new(OrConstraint::boxed(left, right))
            }
        };

        self.constraints.push(constraint);
        Ok(())
    }

    fn pop_operand(&mut self, operator: &'static str) -> Result<Box<dyn Constraint>, BuildError> {
        self.constraints
            .pop()
            .ok_or(BuildError::MissingOperand { operator })
    }
}

//! Delayed re-evaluation: poll a wrapped constraint until it succeeds or
//! a timeout elapses.

use std::thread;
use std::time::{Duration, Instant};

use crate::value::Actual;

use super::{Constraint, ConstraintResult, EvalError};

/// Re-evaluates the wrapped constraint at a polling interval until it
/// first succeeds or the timeout elapses. The actual value is re-resolved
/// on every attempt, so providers observe fresh state.
///
/// While polling, child errors and failures are swallowed. Once the
/// timeout elapses, one final attempt runs and its outcome — including
/// any error — propagates. A zero polling interval means a single attempt
/// after the full delay.
#[derive(Debug)]
pub struct DelayedConstraint {
    child: Box<dyn Constraint>,
    timeout: Duration,
    interval: Duration,
}

impl DelayedConstraint {
    pub fn new(child: impl Constraint + 'static, timeout: Duration, interval: Duration) -> Self {
        Self {
            child: Box::new(child),
            timeout,
            interval,
        }
    }

    pub fn boxed(child: Box<dyn Constraint>, timeout: Duration, interval: Duration) -> Self {
        Self {
            child,
            timeout,
            interval,
        }
    }
}

impl Constraint for DelayedConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let deadline = Instant::now() + self.timeout;

        if !self.interval.is_zero() {
            loop {
                // Errors are swallowed until the final attempt.
                if let Ok(result) = self.child.apply_to(actual) {
                    if result.success {
                        return Ok(result);
                    }
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::sleep(self.interval.min(deadline - now));
            }
        } else {
            thread::sleep(self.timeout);
        }

        self.child.apply_to(actual)
    }

    fn description(&self) -> String {
        format!(
            "{} within {:?}",
            self.child.description(),
            self.timeout
        )
    }
}

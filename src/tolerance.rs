//! Tolerance modifiers for equality comparisons.
//!
//! A tolerance is an allowed deviation window: an amount plus a mode that
//! says how the amount is interpreted (absolute distance, percentage,
//! units-in-the-last-place, or a time unit). Tolerances are immutable;
//! every mode switch produces a new value and is validated against the
//! current state.

use std::fmt;
use std::time::Duration;

use crate::value::Value;

/// How a tolerance amount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceMode {
    /// No tolerance was specified.
    Unset,
    /// Absolute distance between expected and actual.
    Linear,
    /// Percentage of the expected value's magnitude.
    Percent,
    /// Representable-value steps, floating point only.
    Ulps,
    Days,
    Hours,
    Minutes,
    Seconds,
    Millis,
    /// Clock ticks of 100 nanoseconds.
    Ticks,
}

/// Error type for tolerance misuse.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ToleranceError {
    #[error("tolerance mode must follow an amount; call within(..) first")]
    ModeRequiresAmount,

    #[error("tried to use multiple tolerance modes at the same time")]
    MultipleModes,

    #[error("within(..) may appear only once in a constraint expression")]
    AlreadyApplied,
}

/// An allowed deviation window for numeric or duration equality.
#[derive(Debug, Clone)]
pub struct Tolerance {
    amount: Value,
    mode: ToleranceMode,
}

impl Tolerance {
    /// The absent tolerance: comparisons are exact.
    pub fn none() -> Self {
        Self {
            amount: Value::Int(0),
            mode: ToleranceMode::Unset,
        }
    }

    /// A zero-width linear tolerance. Distinct from `none()` only in that
    /// it was explicitly requested.
    pub fn exact() -> Self {
        Self {
            amount: Value::Int(0),
            mode: ToleranceMode::Linear,
        }
    }

    /// A linear (absolute-distance) tolerance of the given amount.
    pub fn new(amount: impl Into<Value>) -> Self {
        Self {
            amount: amount.into(),
            mode: ToleranceMode::Linear,
        }
    }

    pub fn amount(&self) -> &Value {
        &self.amount
    }

    pub fn mode(&self) -> ToleranceMode {
        self.mode
    }

    pub fn is_unset(&self) -> bool {
        self.mode == ToleranceMode::Unset
    }

    /// Reinterpret the amount as a percentage of the expected value.
    pub fn percent(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Percent)
    }

    /// Reinterpret the amount as a distance in representable values.
    pub fn ulps(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Ulps)
    }

    pub fn days(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Days)
    }

    pub fn hours(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Hours)
    }

    pub fn minutes(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Minutes)
    }

    pub fn seconds(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Seconds)
    }

    pub fn millis(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Millis)
    }

    pub fn ticks(self) -> Result<Self, ToleranceError> {
        self.switch_mode(ToleranceMode::Ticks)
    }

    /// A mode may only be chosen once, and only after an amount is set.
    fn switch_mode(self, mode: ToleranceMode) -> Result<Self, ToleranceError> {
        match self.mode {
            ToleranceMode::Unset => Err(ToleranceError::ModeRequiresAmount),
            ToleranceMode::Linear => Ok(Self {
                amount: self.amount,
                mode,
            }),
            _ => Err(ToleranceError::MultipleModes),
        }
    }

    /// The tolerance window as a duration, when the mode is a time unit or
    /// the amount is itself a duration.
    pub fn duration_window(&self) -> Option<Duration> {
        if let Value::Duration(d) = self.amount {
            return match self.mode {
                ToleranceMode::Linear => Some(d),
                _ => None,
            };
        }

        let scalar = match self.amount {
            Value::Int(n) => n as f64,
            Value::UInt(n) => n as f64,
            Value::Float(x) => x,
            _ => return None,
        };
        if scalar < 0.0 {
            return None;
        }

        let seconds = match self.mode {
            ToleranceMode::Days => scalar * 86_400.0,
            ToleranceMode::Hours => scalar * 3_600.0,
            ToleranceMode::Minutes => scalar * 60.0,
            ToleranceMode::Seconds => scalar,
            ToleranceMode::Millis => scalar / 1_000.0,
            ToleranceMode::Ticks => scalar / 10_000_000.0,
            _ => return None,
        };
        Some(Duration::from_secs_f64(seconds))
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ToleranceMode::Unset => write!(f, "exact"),
            ToleranceMode::Linear => write!(f, "+/- {}", self.amount),
            ToleranceMode::Percent => write!(f, "+/- {} percent", self.amount),
            ToleranceMode::Ulps => write!(f, "+/- {} ulps", self.amount),
            ToleranceMode::Days => write!(f, "+/- {} days", self.amount),
            ToleranceMode::Hours => write!(f, "+/- {} hours", self.amount),
            ToleranceMode::Minutes => write!(f, "+/- {} minutes", self.amount),
            ToleranceMode::Seconds => write!(f, "+/- {} seconds", self.amount),
            ToleranceMode::Millis => write!(f, "+/- {} ms", self.amount),
            ToleranceMode::Ticks => write!(f, "+/- {} ticks", self.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_requires_amount() {
        let err = Tolerance::none().percent().unwrap_err();
        assert_eq!(err, ToleranceError::ModeRequiresAmount);
    }

    #[test]
    fn test_multiple_modes_rejected() {
        let err = Tolerance::new(5).percent().unwrap().ulps().unwrap_err();
        assert_eq!(err, ToleranceError::MultipleModes);
    }

    #[test]
    fn test_linear_to_time_mode() {
        let tol = Tolerance::new(2).seconds().unwrap();
        assert_eq!(tol.mode(), ToleranceMode::Seconds);
        assert_eq!(tol.duration_window(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_ticks_are_hundred_nanos() {
        let tol = Tolerance::new(10_000_000).ticks().unwrap();
        assert_eq!(tol.duration_window(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_duration_amount_passthrough() {
        let tol = Tolerance::new(Duration::from_millis(250));
        assert_eq!(tol.duration_window(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_display() {
        let tol = Tolerance::new(5).percent().unwrap();
        assert_eq!(tol.to_string(), "+/- 5 percent");
    }
}

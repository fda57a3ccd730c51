//! String-test constraints: substring, prefix, suffix, and pattern
//! matching with regex or glob syntax.
//!
//! A non-string actual value is a failure, not an error.

use glob::{MatchOptions, Pattern};
use regex::RegexBuilder;

use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringOp {
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    MatchesGlob,
}

impl StringOp {
    fn word(self) -> &'static str {
        match self {
            StringOp::Contains => "containing",
            StringOp::StartsWith => "starting with",
            StringOp::EndsWith => "ending with",
            StringOp::Matches => "matching pattern",
            StringOp::MatchesGlob => "matching glob",
        }
    }
}

/// Tests string content against a substring, prefix, suffix, regex, or
/// glob expectation.
#[derive(Debug, Clone)]
pub struct StringConstraint {
    op: StringOp,
    expected: String,
    ignore_case: bool,
}

impl StringConstraint {
    pub fn contains(expected: impl Into<String>) -> Self {
        Self::new(StringOp::Contains, expected)
    }

    pub fn starts_with(expected: impl Into<String>) -> Self {
        Self::new(StringOp::StartsWith, expected)
    }

    pub fn ends_with(expected: impl Into<String>) -> Self {
        Self::new(StringOp::EndsWith, expected)
    }

    /// Regex pattern match. The pattern is validated at apply time; an
    /// invalid pattern is a usage error.
    pub fn matches(pattern: impl Into<String>) -> Self {
        Self::new(StringOp::Matches, pattern)
    }

    /// Glob pattern match, e.g. `*.txt` or `**/config.json`.
    pub fn matches_glob(pattern: impl Into<String>) -> Self {
        Self::new(StringOp::MatchesGlob, pattern)
    }

    fn new(op: StringOp, expected: impl Into<String>) -> Self {
        Self {
            op,
            expected: expected.into(),
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    fn test(&self, actual: &str) -> Result<bool, EvalError> {
        match self.op {
            StringOp::Contains | StringOp::StartsWith | StringOp::EndsWith => {
                let (needle, haystack) = if self.ignore_case {
                    (self.expected.to_lowercase(), actual.to_lowercase())
                } else {
                    (self.expected.clone(), actual.to_string())
                };
                Ok(match self.op {
                    StringOp::Contains => haystack.contains(&needle),
                    StringOp::StartsWith => haystack.starts_with(&needle),
                    _ => haystack.ends_with(&needle),
                })
            }
            StringOp::Matches => {
                let re = RegexBuilder::new(&self.expected)
                    .case_insensitive(self.ignore_case)
                    .build()
                    .map_err(|e| EvalError::BadPattern {
                        pattern: self.expected.clone(),
                        message: e.to_string(),
                    })?;
                Ok(re.is_match(actual))
            }
            StringOp::MatchesGlob => {
                let pattern =
                    Pattern::new(&self.expected).map_err(|e| EvalError::BadPattern {
                        pattern: self.expected.clone(),
                        message: e.to_string(),
                    })?;
                let options = MatchOptions {
                    case_sensitive: !self.ignore_case,
                    ..MatchOptions::default()
                };
                Ok(pattern.matches_with(actual, options))
            }
        }
    }
}

impl Constraint for StringConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let text = match &value {
            Value::Str(s) => s,
            other => {
                return Ok(ConstraintResult::failure(
                    self.description(),
                    format!("{} (not a string)", other),
                ));
            }
        };

        let matched = self.test(text)?;
        let result = if matched {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        let mut desc = format!("string {} \"{}\"", self.op.word(), self.expected);
        if self.ignore_case {
            desc.push_str(", ignoring case");
        }
        desc
    }
}

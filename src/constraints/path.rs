//! Path constraints: textual path identity and containment.
//!
//! Paths are canonicalized before comparison: separators normalize to
//! `/`, and `.` / `..` segments are resolved. No filesystem access takes
//! place. Case sensitivity follows the platform by default and can be
//! overridden either way.

use crate::value::{Actual, Value};

use super::{resolve, Constraint, ConstraintResult, EvalError};

/// Resolve `.` and `..` segments and normalize separators, textually.
/// Leading `..` segments of a relative path are preserved; `..` above an
/// absolute root is dropped.
fn canonicalize(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let absolute = normalized.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&"..") | None => {
                    if !absolute {
                        segments.push("..");
                    }
                }
                Some(_) => {
                    segments.pop();
                }
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

fn fold_case(path: String, case_sensitive: bool) -> String {
    if case_sensitive {
        path
    } else {
        path.to_lowercase()
    }
}

fn default_case_sensitivity() -> bool {
    !cfg!(windows)
}

fn is_under(parent: &str, child: &str) -> bool {
    if parent.ends_with('/') {
        child.len() > parent.len() && child.starts_with(parent)
    } else {
        child.len() > parent.len()
            && child.starts_with(parent)
            && child.as_bytes()[parent.len()] == b'/'
    }
}

/// Tests that the actual path names the same location as the expected
/// path after canonicalization.
#[derive(Debug, Clone)]
pub struct SamePathConstraint {
    expected: String,
    case_sensitive: Option<bool>,
}

impl SamePathConstraint {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            case_sensitive: None,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.case_sensitive = Some(false);
        self
    }

    pub fn respect_case(mut self) -> Self {
        self.case_sensitive = Some(true);
        self
    }
}

impl Constraint for SamePathConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let text = match &value {
            Value::Str(s) => s,
            other => {
                return Ok(ConstraintResult::failure(
                    self.description(),
                    format!("{} (not a path)", other),
                ));
            }
        };

        let sensitive = self.case_sensitive.unwrap_or_else(default_case_sensitivity);
        let expected = fold_case(canonicalize(&self.expected), sensitive);
        let actual_path = fold_case(canonicalize(text), sensitive);

        let result = if expected == actual_path {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("path \"{}\"", self.expected)
    }
}

/// Tests that the actual path names the expected location or a location
/// under it.
#[derive(Debug, Clone)]
pub struct SamePathOrUnderConstraint {
    expected: String,
    case_sensitive: Option<bool>,
}

impl SamePathOrUnderConstraint {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            case_sensitive: None,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.case_sensitive = Some(false);
        self
    }

    pub fn respect_case(mut self) -> Self {
        self.case_sensitive = Some(true);
        self
    }
}

impl Constraint for SamePathOrUnderConstraint {
    fn apply_to(&self, actual: &Actual) -> Result<ConstraintResult, EvalError> {
        let value = resolve(actual)?;
        let text = match &value {
            Value::Str(s) => s,
            other => {
                return Ok(ConstraintResult::failure(
                    self.description(),
                    format!("{} (not a path)", other),
                ));
            }
        };

        let sensitive = self.case_sensitive.unwrap_or_else(default_case_sensitivity);
        let expected = fold_case(canonicalize(&self.expected), sensitive);
        let actual_path = fold_case(canonicalize(text), sensitive);

        let success = expected == actual_path || is_under(&expected, &actual_path);
        let result = if success {
            ConstraintResult::success(self.description(), value.to_string())
        } else {
            ConstraintResult::failure(self.description(), value.to_string())
        };
        Ok(result)
    }

    fn description(&self) -> String {
        format!("path \"{}\" or under", self.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_resolves_dots() {
        assert_eq!(canonicalize("/usr/./local/../bin"), "/usr/bin");
        assert_eq!(canonicalize("a/b/../../c"), "c");
        assert_eq!(canonicalize("../a"), "../a");
        assert_eq!(canonicalize("/../a"), "/a");
    }

    #[test]
    fn test_canonicalize_normalizes_separators() {
        assert_eq!(canonicalize(r"C:\folder\file.txt"), "C:/folder/file.txt");
    }

    #[test]
    fn test_same_path() {
        let constraint = SamePathConstraint::new("/usr/local/bin");
        assert!(constraint
            .apply_to(&Actual::of("/usr/local/lib/../bin"))
            .unwrap()
            .success);
        assert!(!constraint.apply_to(&Actual::of("/usr/local")).unwrap().success);
    }

    #[test]
    fn test_same_path_ignore_case() {
        let constraint = SamePathConstraint::new("/Data/Files").ignore_case();
        assert!(constraint.apply_to(&Actual::of("/data/files")).unwrap().success);
    }

    #[test]
    fn test_same_path_respect_case() {
        let constraint = SamePathConstraint::new("/Data/Files").respect_case();
        assert!(!constraint.apply_to(&Actual::of("/data/files")).unwrap().success);
    }

    #[test]
    fn test_or_under() {
        let constraint = SamePathOrUnderConstraint::new("/usr/local");
        assert!(constraint.apply_to(&Actual::of("/usr/local")).unwrap().success);
        assert!(constraint
            .apply_to(&Actual::of("/usr/local/bin/tool"))
            .unwrap()
            .success);
        assert!(!constraint.apply_to(&Actual::of("/usr/share")).unwrap().success);
        // A sibling with a shared name prefix is not under.
        assert!(!constraint
            .apply_to(&Actual::of("/usr/localized"))
            .unwrap()
            .success);
    }

    #[test]
    fn test_non_string_fails() {
        let constraint = SamePathConstraint::new("/tmp");
        assert!(!constraint.apply_to(&Actual::of(1)).unwrap().success);
    }
}

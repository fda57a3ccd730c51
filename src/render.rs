//! Diagnostic rendering contract.
//!
//! The engine produces structured results; turning them into human text
//! is a renderer's job. Only the contract lives here, plus a minimal
//! plain-text implementation used by tests and simple callers — richer
//! reporting belongs to the layer above.

use crate::constraints::ConstraintResult;

/// Renders a structured evaluation result as human-readable text.
pub trait Renderer {
    fn render(&self, result: &ConstraintResult) -> String;
}

/// Minimal plain-text renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, result: &ConstraintResult) -> String {
        if result.success {
            return format!("passed: {}", result.describe_expected());
        }

        let mut output = format!(
            "expected: {}\n  actual: {}\n",
            result.describe_expected(),
            result.describe_actual()
        );
        for point in &result.failure_path {
            output.push_str(&format!("  at {}", point.coordinate));
            match (&point.expected, &point.actual) {
                (Some(e), Some(a)) => output.push_str(&format!(": expected {} but was {}", e, a)),
                (Some(e), None) => output.push_str(&format!(": expected {} but nothing was there", e)),
                (None, Some(a)) => output.push_str(&format!(": unexpected {}", a)),
                (None, None) => {}
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, EqualConstraint};
    use crate::value::{Actual, Value};

    #[test]
    fn test_render_success() {
        let result = EqualConstraint::new(1).apply_to(&Actual::of(1)).unwrap();
        let text = TextRenderer.render(&result);
        assert!(text.starts_with("passed"));
    }

    #[test]
    fn test_render_failure_path() {
        let expected = Value::array2(vec![vec![1, 2], vec![3, 4]]);
        let result = EqualConstraint::new(expected)
            .apply_to(&Actual::of(Value::array2(vec![vec![1, 2], vec![3, 0]])))
            .unwrap();
        let text = TextRenderer.render(&result);
        assert!(text.contains("at [1][1]"));
        assert!(text.contains("expected 4 but was 0"));
    }
}

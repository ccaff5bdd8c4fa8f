use crate::core::{ComplexitySummary, MetricSet};

pub const ALL_GOOD: &str = "Code quality is good! Keep up the good work.";

const STYLE_FLOOR: f64 = 80.0;
const AVERAGE_COMPLEXITY_CEILING: f64 = 7.0;
const DOCSTRING_FLOOR: f64 = 70.0;
const DUPLICATION_CEILING: f64 = 20.0;

/// Actionable advice, in a fixed order. Never empty.
pub fn generate_recommendations(metrics: &MetricSet, complexity: &ComplexitySummary) -> Vec<String> {
    let mut advice = Vec::new();

    if metrics.style_compliance < STYLE_FLOOR {
        advice.push("Improve PEP 8 compliance: check line lengths and formatting".to_string());
    }

    if complexity.average > AVERAGE_COMPLEXITY_CEILING {
        advice.push(format!(
            "Reduce cyclomatic complexity (average: {:.1})",
            complexity.average
        ));
    }

    if complexity.complex_count > 0 {
        advice.push(format!(
            "Refactor {} function(s) with high complexity",
            complexity.complex_count
        ));
    }

    if metrics.docstring_coverage < DOCSTRING_FLOOR {
        advice.push(format!(
            "Add docstrings to functions and classes (current coverage: {:.1}%)",
            metrics.docstring_coverage
        ));
    }

    if metrics.duplication > DUPLICATION_CEILING {
        advice.push(format!(
            "Reduce code duplication (current ratio: {:.1}%)",
            metrics.duplication
        ));
    }

    if advice.is_empty() {
        advice.push(ALL_GOOD.to_string());
    }
    advice
}

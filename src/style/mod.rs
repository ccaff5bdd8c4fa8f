//! Style checking against a fixed PEP 8 flavoured rule set.
//!
//! Rules are independent: physical rules see raw lines, logical rules see
//! the syntax tree. No violation is fatal. Output is sorted top to bottom.

mod logical;
mod physical;

pub use physical::checkable_lines;

use crate::config::StyleConfig;
use crate::core::ast::SyntaxTree;
use crate::core::{StyleReport, StyleViolation};

pub fn check_style(tree: &SyntaxTree<'_>, config: &StyleConfig) -> StyleReport {
    let mut violations = physical::check_physical_lines(tree.source(), config);
    violations.extend(logical::check_tree(tree));
    violations.sort_by(|a, b| (a.line, a.column, a.rule).cmp(&(b.line, b.column, b.rule)));

    let checkable = checkable_lines(tree.source());
    StyleReport {
        compliance: compliance_percentage(violations.len(), checkable),
        checkable_lines: checkable,
        violations,
    }
}

/// `1 - violations / max(1, lines)`, clamped, as a percentage.
pub fn compliance_percentage(violations: usize, checkable_lines: usize) -> f64 {
    let ratio = 1.0 - violations as f64 / checkable_lines.max(1) as f64;
    ratio.clamp(0.0, 1.0) * 100.0
}

pub fn count_by_rule(violations: &[StyleViolation]) -> Vec<(&'static str, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for violation in violations {
        *counts.entry(violation.rule.code()).or_insert(0usize) += 1;
    }
    counts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::parse_source;
    use crate::core::{SourceUnit, StyleRule};
    use indoc::indoc;

    fn report(source: &str) -> StyleReport {
        let unit = SourceUnit::new("t.py", source);
        let tree = parse_source(&unit).unwrap();
        check_style(&tree, &StyleConfig::default())
    }

    #[test]
    fn test_clean_source_is_fully_compliant() {
        let report = report(indoc! {r#"
            """Module."""


            def add(a, b):
                """Add two numbers."""
                return a + b
        "#});
        assert!(report.violations.is_empty(), "{:?}", report.violations);
        assert_eq!(report.compliance, 100.0);
        assert_eq!(report.checkable_lines, 4);
    }

    #[test]
    fn test_violations_are_ordered_top_to_bottom() {
        let report = report("import os, sys \nx = 1; y = 2\n");
        let order: Vec<_> = report.violations.iter().map(|v| (v.line, v.rule)).collect();
        assert_eq!(
            order,
            vec![
                (1, StyleRule::MultipleImports),
                (1, StyleRule::UnusedImport),
                (1, StyleRule::UnusedImport),
                (1, StyleRule::TrailingWhitespace),
                (2, StyleRule::MultipleStatements),
            ]
        );
    }

    #[test]
    fn test_compliance_formula() {
        assert_eq!(compliance_percentage(0, 0), 100.0);
        assert_eq!(compliance_percentage(1, 4), 75.0);
        assert_eq!(compliance_percentage(9, 3), 0.0);
    }

    #[test]
    fn test_same_source_same_violations() {
        let source = "def Bad():\n    x = 1;\n    return x \n";
        assert_eq!(report(source), report(source));
    }

    #[test]
    fn test_count_by_rule() {
        let report = report("import os, sys\n");
        assert_eq!(count_by_rule(&report.violations), vec![("E401", 1), ("F401", 2)]);
    }
}

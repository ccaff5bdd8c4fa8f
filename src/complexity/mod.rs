//! Per-function cyclomatic complexity.
//!
//! Every `def` in the tree, including methods and nested functions, yields
//! one [`FunctionRecord`]. Records come out in source order.

pub mod cyclomatic;

pub use cyclomatic::calculate_cyclomatic;

use crate::config::ComplexityThresholds;
use crate::core::ast::{end_line_of, has_docstring, line_of, NodeKind, SyntaxTree};
use crate::core::{ComplexityClass, ComplexitySummary, FunctionKind, FunctionRecord};
use tree_sitter::Node;

#[derive(Clone, Copy)]
enum Scope<'a> {
    Module,
    Class(&'a str),
    Function(&'a str),
}

pub fn extract_functions(tree: &SyntaxTree<'_>, thresholds: &ComplexityThresholds) -> Vec<FunctionRecord> {
    let mut functions = Vec::new();
    visit_node_for_functions(tree, tree.root(), Scope::Module, thresholds, &mut functions);
    functions
}

fn visit_node_for_functions<'src>(
    tree: &SyntaxTree<'src>,
    node: Node<'_>,
    scope: Scope<'src>,
    thresholds: &ComplexityThresholds,
    functions: &mut Vec<FunctionRecord>,
) {
    let child_scope = match NodeKind::of(node) {
        NodeKind::FunctionDef => {
            let record = analyze_function(tree, node, scope, thresholds);
            let name = tree.name_of(node).unwrap_or("<anonymous>");
            functions.push(record);
            Scope::Function(name)
        }
        NodeKind::ClassDef => Scope::Class(tree.name_of(node).unwrap_or("<anonymous>")),
        _ => scope,
    };

    for child in node.children(&mut node.walk()) {
        visit_node_for_functions(tree, child, child_scope, thresholds, functions);
    }
}

fn analyze_function(
    tree: &SyntaxTree<'_>,
    node: Node<'_>,
    scope: Scope<'_>,
    thresholds: &ComplexityThresholds,
) -> FunctionRecord {
    let complexity = calculate_cyclomatic(node);
    let (kind, parent) = match scope {
        Scope::Module => (FunctionKind::Function, None),
        Scope::Class(name) => (FunctionKind::Method, Some(name.to_string())),
        Scope::Function(name) => (FunctionKind::Nested, Some(name.to_string())),
    };

    FunctionRecord {
        name: tree.name_of(node).unwrap_or("<anonymous>").to_string(),
        parent,
        kind,
        line: line_of(node),
        end_line: end_line_of(node),
        complexity,
        classification: thresholds.classify(complexity),
        has_docstring: has_docstring(node),
    }
}

/// Mean, max and count of complex functions. Average is 0 with no functions.
pub fn summarize(functions: &[FunctionRecord]) -> ComplexitySummary {
    if functions.is_empty() {
        return ComplexitySummary::default();
    }

    let total: u64 = functions.iter().map(|f| u64::from(f.complexity)).sum();
    ComplexitySummary {
        function_count: functions.len(),
        average: total as f64 / functions.len() as f64,
        max: functions.iter().map(|f| f.complexity).max().unwrap_or(0),
        complex_count: functions
            .iter()
            .filter(|f| f.classification == ComplexityClass::Complex)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::parse_source;
    use crate::core::SourceUnit;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn records(source: &str) -> Vec<FunctionRecord> {
        let unit = SourceUnit::new("t.py", source);
        let tree = parse_source(&unit).unwrap();
        extract_functions(&tree, &ComplexityThresholds::default())
    }

    #[test]
    fn test_records_in_source_order_with_scopes() {
        let functions = records(indoc! {r#"
            def top():
                """Top level."""
                def helper():
                    return 1
                return helper()


            class Service:
                def run(self, flag):
                    if flag:
                        return 1
                    return 0

                async def stop(self):
                    pass
        "#});

        let names: Vec<_> = functions.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["top", "top.helper", "Service.run", "Service.stop"]);

        assert_eq!(functions[0].kind, FunctionKind::Function);
        assert!(functions[0].has_docstring);
        assert_eq!(functions[1].kind, FunctionKind::Nested);
        assert!(!functions[1].has_docstring);
        assert_eq!(functions[2].kind, FunctionKind::Method);
        assert_eq!(functions[2].complexity, 2);
        assert_eq!(functions[2].line, 9);
        assert_eq!(functions[3].kind, FunctionKind::Method);
    }

    #[test]
    fn test_decorated_function_line_is_def_line() {
        let functions = records(indoc! {"
            @property
            def value():
                return 1
        "});
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].line, 2);
        assert_eq!(functions[0].end_line, 3);
    }

    #[test]
    fn test_six_ifs_is_moderate() {
        let functions = records(indoc! {"
            def branchy(x):
                if x == 1:
                    return 1
                if x == 2:
                    return 2
                if x == 3:
                    return 3
                if x == 4:
                    return 4
                if x == 5:
                    return 5
                if x == 6:
                    return 6
                return 0
        "});
        assert_eq!(functions[0].complexity, 7);
        assert_eq!(functions[0].classification, ComplexityClass::Moderate);
    }

    #[test]
    fn test_summary() {
        let functions = records(indoc! {"
            def a():
                pass

            def b(x):
                if x:
                    pass
                while x:
                    pass
        "});
        let summary = summarize(&functions);
        assert_eq!(summary.function_count, 2);
        assert_eq!(summary.max, 3);
        assert!((summary.average - 2.0).abs() < f64::EPSILON);
        assert_eq!(summary.complex_count, 0);
    }

    #[test]
    fn test_summary_without_functions() {
        let summary = summarize(&records("x = 1\n"));
        assert_eq!(summary, ComplexitySummary::default());
    }

    #[test]
    fn test_every_function_at_least_one() {
        let functions = records(indoc! {"
            def a(): pass
            def b(): return lambda y: y
            class C:
                def d(self): ...
        "});
        assert_eq!(functions.len(), 3);
        assert!(functions.iter().all(|f| f.complexity >= 1));
    }
}

//! Docstring coverage over the module, its classes and its functions.

use crate::core::ast::{has_docstring, statements, NodeKind, SyntaxTree};
use crate::core::DocstringReport;
use tree_sitter::Node;

pub fn check_docstrings(tree: &SyntaxTree<'_>) -> DocstringReport {
    let root = tree.root();
    let mut report = DocstringReport::default();

    // An empty module has nothing to document.
    if !statements(root).is_empty() {
        report.modules_total = 1;
        report.module_documented = has_docstring(root);
    }

    count_definitions(root, &mut report);
    report.coverage = coverage_percentage(report.documented_entities(), report.total_entities());
    report
}

fn count_definitions(node: Node<'_>, report: &mut DocstringReport) {
    match NodeKind::of(node) {
        NodeKind::ClassDef => {
            report.classes_total += 1;
            report.classes_documented += usize::from(has_docstring(node));
        }
        NodeKind::FunctionDef => {
            report.functions_total += 1;
            report.functions_documented += usize::from(has_docstring(node));
        }
        _ => {}
    }

    for child in node.children(&mut node.walk()) {
        count_definitions(child, report);
    }
}

/// 100% when there is nothing to document.
pub fn coverage_percentage(documented: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        documented as f64 / total as f64 * 100.0
    }
}

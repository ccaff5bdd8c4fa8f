//! Rules that need the syntax tree: layout of top-level definitions,
//! imports, statement separators and naming.

use crate::core::ast::{column_of, is_string_statement, line_of, statements, NodeKind, SyntaxTree};
use crate::core::{StyleRule, StyleViolation};
use std::collections::HashSet;
use tree_sitter::Node;

/// unittest and friends force camelCase on these.
const NAMING_EXEMPTIONS: &[&str] = &[
    "setUp",
    "tearDown",
    "setUpClass",
    "tearDownClass",
    "setUpModule",
    "tearDownModule",
    "asyncSetUp",
    "asyncTearDown",
    "setUpTestData",
];

pub fn check_tree(tree: &SyntaxTree<'_>) -> Vec<StyleViolation> {
    let mut violations = Vec::new();
    violations.extend(check_blank_lines(tree));
    violations.extend(check_import_position(tree));
    violations.extend(check_unused_imports(tree));
    walk_nodes(tree, tree.root(), &mut violations);
    violations
}

/// Node-local rules, applied to every node in one pass.
fn walk_nodes(tree: &SyntaxTree<'_>, node: Node<'_>, violations: &mut Vec<StyleViolation>) {
    match NodeKind::of(node) {
        NodeKind::Import => violations.extend(check_multiple_imports(node)),
        NodeKind::Semicolon => violations.push(check_semicolon(tree, node)),
        NodeKind::ClassDef => violations.extend(check_class_name(tree, node)),
        NodeKind::FunctionDef => violations.extend(check_function_name(tree, node)),
        _ => {}
    }

    for child in node.children(&mut node.walk()) {
        walk_nodes(tree, child, violations);
    }
}

/// E302: two blank lines before every top-level definition.
fn check_blank_lines(tree: &SyntaxTree<'_>) -> Vec<StyleViolation> {
    let lines: Vec<&str> = tree.source().lines().collect();
    let mut violations = Vec::new();

    for (index, stmt) in statements(tree.root()).into_iter().enumerate() {
        let is_definition = matches!(
            NodeKind::of(stmt),
            NodeKind::FunctionDef | NodeKind::ClassDef | NodeKind::DecoratedDef
        );
        if index == 0 || !is_definition {
            continue;
        }

        let row = stmt.start_position().row;
        let mut cursor = row;
        // Comments directly above belong to the definition.
        while cursor > 0 && lines[cursor - 1].trim_start().starts_with('#') {
            cursor -= 1;
        }
        let mut blanks = 0;
        while cursor > 0 && lines[cursor - 1].trim().is_empty() {
            blanks += 1;
            cursor -= 1;
        }

        if cursor > 0 && blanks < 2 {
            violations.push(StyleViolation {
                rule: StyleRule::MissingBlankLines,
                line: row + 1,
                column: 1,
                message: format!("expected 2 blank lines, found {blanks}"),
            });
        }
    }

    violations
}

/// E401: `import os, sys`
fn check_multiple_imports(node: Node<'_>) -> Option<StyleViolation> {
    let count = node
        .children_by_field_name("name", &mut node.walk())
        .count();
    (count > 1).then(|| StyleViolation {
        rule: StyleRule::MultipleImports,
        line: line_of(node),
        column: column_of(node),
        message: "multiple imports on one line".to_string(),
    })
}

/// E402: module-level import after other code.
fn check_import_position(tree: &SyntaxTree<'_>) -> Vec<StyleViolation> {
    let mut violations = Vec::new();
    let mut seen_code = false;

    for (index, stmt) in statements(tree.root()).into_iter().enumerate() {
        match NodeKind::of(stmt) {
            NodeKind::Import | NodeKind::ImportFrom => {
                if seen_code {
                    violations.push(StyleViolation {
                        rule: StyleRule::ImportNotAtTop,
                        line: line_of(stmt),
                        column: column_of(stmt),
                        message: "module level import not at top of file".to_string(),
                    });
                }
            }
            NodeKind::FutureImport => {}
            // Conditional and guarded imports are common at the top.
            NodeKind::If | NodeKind::Try | NodeKind::With => {}
            NodeKind::ExpressionStatement
                if (index == 0 && is_string_statement(stmt)) || is_dunder_assignment(tree, stmt) => {}
            _ => seen_code = true,
        }
    }

    violations
}

fn is_dunder_assignment(tree: &SyntaxTree<'_>, stmt: Node<'_>) -> bool {
    statements(stmt)
        .first()
        .filter(|child| NodeKind::of(**child) == NodeKind::Assignment)
        .and_then(|assignment| assignment.child_by_field_name("left"))
        .map(|left| {
            let name = tree.text(left);
            name.len() > 4 && name.starts_with("__") && name.ends_with("__")
        })
        .unwrap_or(false)
}

/// E702 / E703
fn check_semicolon(tree: &SyntaxTree<'_>, node: Node<'_>) -> StyleViolation {
    let position = node.start_position();
    let rest = tree
        .source()
        .lines()
        .nth(position.row)
        .and_then(|line| line.get(position.column + 1..))
        .unwrap_or("")
        .trim();

    if rest.is_empty() || rest.starts_with('#') {
        StyleViolation {
            rule: StyleRule::TrailingSemicolon,
            line: position.row + 1,
            column: position.column + 1,
            message: "statement ends with a semicolon".to_string(),
        }
    } else {
        StyleViolation {
            rule: StyleRule::MultipleStatements,
            line: position.row + 1,
            column: position.column + 1,
            message: "multiple statements on one line (semicolon)".to_string(),
        }
    }
}

/// N801: CapWords
fn check_class_name(tree: &SyntaxTree<'_>, node: Node<'_>) -> Option<StyleViolation> {
    let name_node = node.child_by_field_name("name")?;
    let name = tree.text(name_node);
    let stripped = name.trim_start_matches('_');
    let starts_upper = stripped.chars().next().is_none_or(char::is_uppercase);
    if starts_upper && !stripped.contains('_') {
        return None;
    }
    Some(StyleViolation {
        rule: StyleRule::ClassNaming,
        line: line_of(name_node),
        column: column_of(name_node),
        message: format!("class name '{name}' should use CapWords convention"),
    })
}

/// N802: lowercase
fn check_function_name(tree: &SyntaxTree<'_>, node: Node<'_>) -> Option<StyleViolation> {
    let name_node = node.child_by_field_name("name")?;
    let name = tree.text(name_node);
    if !name.chars().any(char::is_uppercase) || NAMING_EXEMPTIONS.contains(&name) {
        return None;
    }
    Some(StyleViolation {
        rule: StyleRule::FunctionNaming,
        line: line_of(name_node),
        column: column_of(name_node),
        message: format!("function name '{name}' should be lowercase"),
    })
}

struct ImportBinding<'src> {
    bound: &'src str,
    display: &'src str,
    line: usize,
    column: usize,
}

/// F401: names bound by an import and never referenced again.
///
/// Package `__init__` files and modules declaring `__all__` re-export by
/// convention and are skipped.
fn check_unused_imports(tree: &SyntaxTree<'_>) -> Vec<StyleViolation> {
    if tree.unit().id().ends_with("__init__.py") {
        return Vec::new();
    }

    let mut bindings = Vec::new();
    let mut used = HashSet::new();
    collect_names(tree, tree.root(), &mut bindings, &mut used);

    if used.contains("__all__") {
        return Vec::new();
    }

    bindings
        .into_iter()
        .filter(|binding| !used.contains(binding.bound))
        .map(|binding| StyleViolation {
            rule: StyleRule::UnusedImport,
            line: binding.line,
            column: binding.column,
            message: format!("'{}' imported but unused", binding.display),
        })
        .collect()
}

fn collect_names<'src>(
    tree: &SyntaxTree<'src>,
    node: Node<'_>,
    bindings: &mut Vec<ImportBinding<'src>>,
    used: &mut HashSet<&'src str>,
) {
    match NodeKind::of(node) {
        NodeKind::Import | NodeKind::ImportFrom => {
            bindings.extend(import_bindings(tree, node));
            return;
        }
        NodeKind::FutureImport => return,
        NodeKind::Identifier => {
            used.insert(tree.text(node));
        }
        _ => {}
    }

    for child in node.children(&mut node.walk()) {
        collect_names(tree, child, bindings, used);
    }
}

fn import_bindings<'src>(tree: &SyntaxTree<'src>, node: Node<'_>) -> Vec<ImportBinding<'src>> {
    let is_from = NodeKind::of(node) == NodeKind::ImportFrom;
    let mut cursor = node.walk();
    let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();

    names
        .into_iter()
        .map(|name| {
            let display = tree.text(name);
            let bound = if name.kind() == "aliased_import" {
                name.child_by_field_name("alias")
                    .map(|alias| tree.text(alias))
                    .unwrap_or(display)
            } else if is_from {
                display
            } else {
                // `import a.b.c` binds `a`
                display.split('.').next().unwrap_or(display)
            };
            ImportBinding {
                bound: bound.trim(),
                display,
                line: line_of(name),
                column: column_of(name),
            }
        })
        .collect()
}

use crate::core::ast::NodeKind;
use tree_sitter::Node;

/// Cyclomatic complexity of one function definition node.
///
/// Starts at 1 and adds one per decision point. Nested function definitions
/// are skipped entirely: they are scored on their own.
pub fn calculate_cyclomatic(function: Node<'_>) -> u32 {
    let mut complexity = 1;
    for child in function.children(&mut function.walk()) {
        visit_node_for_complexity(child, &mut complexity);
    }
    complexity
}

fn visit_node_for_complexity(node: Node<'_>, complexity: &mut u32) {
    let kind = NodeKind::of(node);
    if kind == NodeKind::FunctionDef {
        return;
    }

    *complexity += decision_weight(kind);

    for child in node.children(&mut node.walk()) {
        visit_node_for_complexity(child, complexity);
    }
}

fn decision_weight(kind: NodeKind) -> u32 {
    match kind {
        // Branches
        NodeKind::If | NodeKind::Elif | NodeKind::Conditional => 1,
        // Loops, statement and comprehension form
        NodeKind::For | NodeKind::While | NodeKind::ComprehensionFor => 1,
        NodeKind::ComprehensionIf => 1,
        // Each handler is a separate path
        NodeKind::Except => 1,
        // One node per binary `and`/`or`
        NodeKind::BoolOp => 1,
        NodeKind::Case => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::parse_source;
    use crate::core::SourceUnit;
    use indoc::indoc;

    fn first_function_complexity(source: &str) -> u32 {
        let unit = SourceUnit::new("t.py", source);
        let tree = parse_source(&unit).unwrap();
        let root = tree.root();
        let function = find_function(root).expect("no function in fixture");
        calculate_cyclomatic(function)
    }

    fn find_function(node: Node<'_>) -> Option<Node<'_>> {
        if NodeKind::of(node) == NodeKind::FunctionDef {
            return Some(node);
        }
        let children: Vec<_> = node.children(&mut node.walk()).collect();
        children.into_iter().find_map(find_function)
    }

    #[test]
    fn test_straight_line_function_is_one() {
        let source = indoc! {"
            def f(x):
                y = x + 1
                return y
        "};
        assert_eq!(first_function_complexity(source), 1);
    }

    #[test]
    fn test_if_elif_else() {
        let source = indoc! {"
            def f(x):
                if x > 1:
                    return 1
                elif x < 0:
                    return 2
                else:
                    return 3
        "};
        assert_eq!(first_function_complexity(source), 3);
    }

    #[test]
    fn test_loops_and_handlers() {
        let source = indoc! {"
            def f(items):
                for item in items:
                    while item:
                        item -= 1
                try:
                    pass
                except ValueError:
                    pass
                except (KeyError, TypeError):
                    pass
                finally:
                    pass
        "};
        // 1 + for + while + 2 handlers
        assert_eq!(first_function_complexity(source), 5);
    }

    #[test]
    fn test_boolean_operators_count_each_operator() {
        let source = indoc! {"
            def f(a, b, c):
                if a and b or c:
                    return True
                return False
        "};
        // 1 + if + and + or
        assert_eq!(first_function_complexity(source), 4);
    }

    #[test]
    fn test_match_arms() {
        let source = indoc! {"
            def f(command):
                match command:
                    case 'start':
                        return 1
                    case 'stop':
                        return 2
                    case _:
                        return 0
        "};
        assert_eq!(first_function_complexity(source), 4);
    }

    #[test]
    fn test_nested_function_not_counted_in_outer() {
        let source = indoc! {"
            def outer(x):
                def inner(y):
                    if y:
                        return 1
                    return 0
                return inner(x)
        "};
        assert_eq!(first_function_complexity(source), 1);
    }

    #[test]
    fn test_comprehension_and_ternary() {
        let source = indoc! {"
            def f(xs):
                ys = [x for x in xs if x]
                return ys if ys else None
        "};
        // 1 + for_in + if_clause + conditional
        assert_eq!(first_function_complexity(source), 4);
    }
}

use crate::core::ast::{column_of, line_of, SyntaxTree};
use crate::core::{Error, ParseFailure, Result, SourceUnit};
use tree_sitter::{Node, Parser};

/// Parse a unit into a syntax tree.
///
/// tree-sitter always produces a tree, recovering around bad input. The
/// engine does not accept recovered trees: the first `ERROR` or `MISSING`
/// node becomes a [`ParseFailure`] and the unit is not analyzed further.
pub fn parse_source(unit: &SourceUnit) -> Result<SyntaxTree<'_>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| Error::invariant(format!("Failed to set Python language: {e}")))?;

    let tree = parser
        .parse(unit.text(), None)
        .ok_or_else(|| Error::invariant("tree-sitter returned no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let failure = first_error(root)
            .map(|node| describe_error(unit.id(), node))
            .unwrap_or_else(|| ParseFailure::syntax(unit.id(), 1, 1, "invalid syntax"));
        log::debug!("{failure}");
        return Err(failure.into());
    }

    Ok(SyntaxTree::new(unit, tree))
}

/// Depth-first, document order; only descends into subtrees that contain errors.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn describe_error(unit: &str, node: Node<'_>) -> ParseFailure {
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        "unexpected token(s)".to_string()
    };
    ParseFailure::syntax(unit, line_of(node), column_of(node), message)
}

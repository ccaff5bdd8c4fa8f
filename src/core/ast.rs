use crate::core::SourceUnit;
use tree_sitter::{Node, Tree};

/// Parsed representation of a [`SourceUnit`], valid for one analysis call.
pub struct SyntaxTree<'src> {
    unit: &'src SourceUnit,
    tree: Tree,
}

impl<'src> SyntaxTree<'src> {
    pub(crate) fn new(unit: &'src SourceUnit, tree: Tree) -> Self {
        Self { unit, tree }
    }

    pub fn unit(&self) -> &'src SourceUnit {
        self.unit
    }

    pub fn source(&self) -> &'src str {
        self.unit.text()
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`; empty if the span is not valid UTF-8.
    pub fn text(&self, node: Node<'_>) -> &'src str {
        node.utf8_text(self.source().as_bytes()).unwrap_or("")
    }

    /// Text of the `name` field, used by definitions.
    pub fn name_of(&self, node: Node<'_>) -> Option<&'src str> {
        node.child_by_field_name("name").map(|name| self.text(name))
    }
}

/// The node shapes the analyzers care about. Everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    FunctionDef,
    ClassDef,
    DecoratedDef,
    Block,
    ExpressionStatement,
    StringLiteral,
    If,
    Elif,
    For,
    While,
    Try,
    Except,
    With,
    Match,
    Case,
    BoolOp,
    Conditional,
    ComprehensionFor,
    ComprehensionIf,
    Lambda,
    Import,
    ImportFrom,
    FutureImport,
    Assignment,
    Identifier,
    Comment,
    Semicolon,
    Error,
    Other,
}

impl NodeKind {
    pub fn of(node: Node<'_>) -> Self {
        if node.is_error() {
            return NodeKind::Error;
        }

        static KIND_MAP: &[(&str, NodeKind)] = &[
            ("module", NodeKind::Module),
            ("function_definition", NodeKind::FunctionDef),
            ("class_definition", NodeKind::ClassDef),
            ("decorated_definition", NodeKind::DecoratedDef),
            ("block", NodeKind::Block),
            ("expression_statement", NodeKind::ExpressionStatement),
            ("string", NodeKind::StringLiteral),
            ("concatenated_string", NodeKind::StringLiteral),
            ("if_statement", NodeKind::If),
            ("elif_clause", NodeKind::Elif),
            ("for_statement", NodeKind::For),
            ("while_statement", NodeKind::While),
            ("try_statement", NodeKind::Try),
            ("except_clause", NodeKind::Except),
            ("except_group_clause", NodeKind::Except),
            ("with_statement", NodeKind::With),
            ("match_statement", NodeKind::Match),
            ("case_clause", NodeKind::Case),
            ("boolean_operator", NodeKind::BoolOp),
            ("conditional_expression", NodeKind::Conditional),
            ("for_in_clause", NodeKind::ComprehensionFor),
            ("if_clause", NodeKind::ComprehensionIf),
            ("lambda", NodeKind::Lambda),
            ("import_statement", NodeKind::Import),
            ("import_from_statement", NodeKind::ImportFrom),
            ("future_import_statement", NodeKind::FutureImport),
            ("assignment", NodeKind::Assignment),
            ("identifier", NodeKind::Identifier),
            ("comment", NodeKind::Comment),
            (";", NodeKind::Semicolon),
        ];

        KIND_MAP
            .iter()
            .find(|(kind, _)| *kind == node.kind())
            .map(|(_, kind)| *kind)
            .unwrap_or(NodeKind::Other)
    }

    pub fn is_definition(&self) -> bool {
        matches!(self, NodeKind::FunctionDef | NodeKind::ClassDef)
    }

    pub fn is_import(&self) -> bool {
        matches!(
            self,
            NodeKind::Import | NodeKind::ImportFrom | NodeKind::FutureImport
        )
    }
}

/// Named children of `node` minus comments, in source order.
pub fn statements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| NodeKind::of(*child) != NodeKind::Comment)
        .collect()
}

/// Statements of a definition body (or of the module itself).
pub fn body_statements(node: Node<'_>) -> Vec<Node<'_>> {
    match NodeKind::of(node) {
        NodeKind::Module => statements(node),
        _ => node
            .child_by_field_name("body")
            .map(statements)
            .unwrap_or_default(),
    }
}

/// True when the first statement of `node`'s body is a bare string literal.
pub fn has_docstring(node: Node<'_>) -> bool {
    body_statements(node)
        .first()
        .is_some_and(|first| is_string_statement(*first))
}

pub fn is_string_statement(node: Node<'_>) -> bool {
    if NodeKind::of(node) != NodeKind::ExpressionStatement {
        return false;
    }
    let children = statements(node);
    children.len() == 1 && NodeKind::of(children[0]) == NodeKind::StringLiteral
}

/// 1-based line of a node's first byte.
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// 1-based line of a node's last byte.
pub fn end_line_of(node: Node<'_>) -> usize {
    node.end_position().row + 1
}

/// 1-based column of a node's first byte.
pub fn column_of(node: Node<'_>) -> usize {
    node.start_position().column + 1
}

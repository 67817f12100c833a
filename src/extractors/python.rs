//! Python syntax trees via tree-sitter
//!
//! Only two levels are inspected: statements directly in the module body, and
//! statements directly in the body of a top-level class.

use std::ops::Range;

use rustpython_parser::Mode;
use tree_sitter::{Node, Parser, Tree};

use crate::error::ParseError;

/// Syntax node kinds that produce declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefinitionNode {
    Function,
    Class,
}

impl DefinitionNode {
    fn classify(node: Node) -> Option<Self> {
        match node.kind() {
            "function_definition" => Some(DefinitionNode::Function),
            "class_definition" => Some(DefinitionNode::Class),
            _ => None,
        }
    }
}

/// Position of a definition in the module, before it becomes a `Declaration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Definition {
    Function(Span),
    Class { span: Span, methods: Vec<Span> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub name: String,
    /// Byte range of the definition, from `def`/`class` (or `async`) to the end
    /// of its body. Decorators are not included.
    pub bytes: Range<usize>,
    /// 1-based line of the definition header.
    pub line: usize,
}

/// Python refuses more than 200 open brackets at once.
const MAX_BRACKETS: usize = 200;

/// Deepest syntax tree accepted; the grammar check never sees anything deeper.
const MAX_NESTING: usize = 1000;

/// Parse `source`, failing on the first syntax error.
///
/// tree-sitter accepts some programs Python rejects (a missing indented block,
/// a stray indent, Python 2 `print` statements), so the source is also checked
/// against the Python grammar itself.
pub(crate) fn parse(source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError::Grammar(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;

    let problem = find_problem(&tree);
    if let Some(Problem::TooDeep(node)) = problem {
        return Err(syntax_error_at(node, "too many nested levels"));
    }

    check_grammar(source)?;

    if let Some(Problem::Error(node)) = problem {
        return Err(syntax_error_at(node, "invalid syntax"));
    }
    Ok(tree)
}

fn check_grammar(source: &str) -> Result<(), ParseError> {
    match rustpython_parser::parse(source, Mode::Module, "<source>") {
        Ok(_) => Ok(()),
        Err(e) => {
            let (line, column) = position_of(source, u32::from(e.offset) as usize);
            Err(ParseError::Syntax {
                line,
                column,
                message: e.error.to_string(),
            })
        }
    }
}

fn syntax_error_at(node: Node, message: &str) -> ParseError {
    let position = node.start_position();
    ParseError::Syntax {
        line: position.row + 1,
        column: position.column + 1,
        message: message.to_string(),
    }
}

/// 1-based line and column of a byte offset.
fn position_of(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset.min(source.len())).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// Definitions in the module body, in source order.
pub(crate) fn top_level_definitions(source: &str) -> Result<Vec<Definition>, ParseError> {
    let tree = parse(source)?;
    let root = tree.root_node();

    let mut definitions = Vec::new();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        let Some(node) = unwrap_decorated(statement) else {
            continue;
        };
        let Some(kind) = DefinitionNode::classify(node) else {
            continue;
        };
        let Some(span) = span_of(node, source) else {
            continue;
        };

        match kind {
            DefinitionNode::Function => definitions.push(Definition::Function(span)),
            DefinitionNode::Class => definitions.push(Definition::Class {
                span,
                methods: methods_of(node, source),
            }),
        }
    }

    Ok(definitions)
}

/// Functions declared directly in a class body, in source order.
fn methods_of(class: Node, source: &str) -> Vec<Span> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter_map(unwrap_decorated)
        .filter(|node| DefinitionNode::classify(*node) == Some(DefinitionNode::Function))
        .filter_map(|node| span_of(node, source))
        .collect()
}

/// `@decorator` wraps the real definition; look through it.
fn unwrap_decorated(node: Node) -> Option<Node> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition")
    } else {
        Some(node)
    }
}

fn span_of(node: Node, source: &str) -> Option<Span> {
    let name = node
        .child_by_field_name("name")?
        .utf8_text(source.as_bytes())
        .ok()?
        .to_string();

    Some(Span {
        name,
        bytes: node.start_byte()..node.end_byte(),
        line: node.start_position().row + 1,
    })
}

#[derive(Debug, Clone, Copy)]
enum Problem<'t> {
    /// First ERROR or MISSING node in source order.
    Error(Node<'t>),
    TooDeep(Node<'t>),
}

/// Walk the whole tree with a cursor, so stack use does not depend on nesting.
fn find_problem(tree: &Tree) -> Option<Problem<'_>> {
    let mut cursor = tree.walk();
    let mut depth = 0usize;
    let mut brackets = 0usize;
    let mut first_error = None;

    loop {
        let node = cursor.node();
        if depth > MAX_NESTING {
            return Some(Problem::TooDeep(node));
        }
        // Counted on tokens, so error recovery flattening the tree does not hide them.
        if node.child_count() == 0 {
            match node.kind() {
                "(" | "[" | "{" => {
                    brackets += 1;
                    if brackets > MAX_BRACKETS {
                        return Some(Problem::TooDeep(node));
                    }
                }
                ")" | "]" | "}" => brackets = brackets.saturating_sub(1),
                _ => {}
            }
        }
        if first_error.is_none() && (node.is_error() || node.is_missing()) {
            first_error = Some(node);
        }

        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return first_error.map(Problem::Error);
            }
            depth -= 1;
        }
    }
}

//! Tree-sitter based CST parser for PHP source code.
//!
//! Provides precise byte-range information for safe code rewriting, plus the
//! statement factory used to turn synthesized text back into a syntax node.

use thiserror::Error;
use tree_sitter::{Node, Parser};

/// Opening tag prepended to snippets parsed on their own.
const SNIPPET_PREFIX: &str = "<?php\n";

/// Node kinds that carry no statement semantics.
const TRIVIA_KINDS: &[&str] = &["comment", "php_tag"];

/// A point in source code (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Zero-indexed row number
    pub row: usize,
    /// Zero-indexed column (byte offset within line)
    pub column: usize,
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self {
            row: p.row,
            column: p.column,
        }
    }
}

/// A CST node with exact source location
#[derive(Debug, Clone)]
pub struct CstNode {
    /// Node kind (e.g., `foreach_statement`, `variable_name`)
    pub kind: String,
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Start point (row, column)
    pub start_point: Point,
    /// Whether this is a named node (vs anonymous like punctuation)
    pub is_named: bool,
    /// Whether the parser inserted or skipped this node during error recovery
    pub is_error: bool,
    /// Child nodes
    pub children: Vec<CstNode>,
}

impl CstNode {
    /// Create a `CstNode` from a tree-sitter `Node`
    fn from_ts_node(node: Node<'_>) -> Self {
        let mut children = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                children.push(Self::from_ts_node(cursor.node()));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        Self {
            kind: node.kind().to_owned(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_point: node.start_position().into(),
            is_named: node.is_named(),
            is_error: node.is_error() || node.is_missing(),
            children,
        }
    }

    /// Source text covered by this node
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start_byte..self.end_byte).unwrap_or_default()
    }

    /// Whether this node is a comment or an opening tag
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        TRIVIA_KINDS.contains(&self.kind.as_str())
    }

    /// Named children, skipping comments and tags
    pub fn named_children(&self) -> impl Iterator<Item = &CstNode> {
        self.children
            .iter()
            .filter(|child| child.is_named && !child.is_trivia())
    }

    /// First direct child of the given kind
    #[must_use]
    pub fn child_of_kind(&self, kind: &str) -> Option<&CstNode> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// Find the outermost node spanning exactly `start..end`
    #[must_use]
    pub fn find_exact(&self, start: usize, end: usize) -> Option<&CstNode> {
        if self.start_byte == start && self.end_byte == end {
            return Some(self);
        }
        self.children
            .iter()
            .filter(|child| child.start_byte <= start && child.end_byte >= end)
            .find_map(|child| child.find_exact(start, end))
    }

    /// Find all nodes of a specific kind, in pre-order (source order)
    #[must_use]
    pub fn find_by_kind(&self, kind: &str) -> Vec<&CstNode> {
        let mut result = Vec::new();
        self.find_by_kind_recursive(kind, &mut result);
        result
    }

    fn find_by_kind_recursive<'a>(&'a self, kind: &str, result: &mut Vec<&'a CstNode>) {
        if self.kind == kind {
            result.push(self);
        }
        for child in &self.children {
            child.find_by_kind_recursive(kind, result);
        }
    }

    /// Visit every node of this subtree in pre-order together with its parent
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CstNode, Option<&'a CstNode>)) {
        self.walk_with_parent(None, visit);
    }

    fn walk_with_parent<'a>(
        &'a self,
        parent: Option<&'a CstNode>,
        visit: &mut impl FnMut(&'a CstNode, Option<&'a CstNode>),
    ) {
        visit(self, parent);
        for child in &self.children {
            child.walk_with_parent(Some(self), visit);
        }
    }
}

/// A parsed CST tree
#[derive(Debug)]
pub struct CstTree {
    /// Root node of the CST
    pub root: CstNode,
    /// Original source code
    pub source: String,
    /// Whether the parser had to recover from syntax errors anywhere
    pub has_error: bool,
}

impl CstTree {
    /// Source text of a node belonging to this tree
    #[must_use]
    pub fn text(&self, node: &CstNode) -> &str {
        node.text(&self.source)
    }

    /// Find all `foreach` loops, outermost first
    #[must_use]
    pub fn find_foreach_loops(&self) -> Vec<&CstNode> {
        self.root.find_by_kind("foreach_statement")
    }

    /// Top-level statements of the program
    pub fn statements(&self) -> impl Iterator<Item = &CstNode> {
        self.root.named_children()
    }

    /// The single statement of a tree produced by [`CstParser::parse_statement`]
    #[must_use]
    pub fn statement(&self) -> Option<&CstNode> {
        let mut statements = self.statements();
        match (statements.next(), statements.next()) {
            (Some(statement), None) => Some(statement),
            _ => None,
        }
    }
}

/// Error during CST parsing
#[derive(Debug, Error)]
pub enum CstError {
    /// Failed to create parser
    #[error("Failed to create CST parser: {0}")]
    ParserCreation(String),
    /// Failed to parse source
    #[error("Failed to parse source as PHP")]
    ParseFailed,
    /// Snippet did not parse as exactly one well-formed statement
    #[error("Not a single PHP statement: {0}")]
    NotAStatement(String),
}

/// Tree-sitter based CST parser
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a new CST parser for PHP (with leading inline HTML allowed)
    ///
    /// # Errors
    /// Returns error if parser creation fails
    pub fn new() -> Result<Self, CstError> {
        let mut parser = Parser::new();

        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| CstError::ParserCreation(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse source code into a CST
    ///
    /// # Errors
    /// Returns error if parsing fails
    pub fn parse(&mut self, source: &str) -> Result<CstTree, CstError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(CstError::ParseFailed)?;
        let root_node = tree.root_node();

        Ok(CstTree {
            root: CstNode::from_ts_node(root_node),
            source: source.to_owned(),
            has_error: root_node.has_error(),
        })
    }

    /// Parse a bare statement snippet (no opening tag) into a detached tree.
    ///
    /// # Errors
    /// Returns [`CstError::NotAStatement`] unless the snippet is exactly one
    /// statement without syntax errors.
    pub fn parse_statement(&mut self, text: &str) -> Result<CstTree, CstError> {
        let tree = self.parse(&format!("{SNIPPET_PREFIX}{text}"))?;
        if tree.has_error || tree.statement().is_none() {
            return Err(CstError::NotAStatement(text.to_owned()));
        }
        Ok(tree)
    }
}

//! Quick-fix infrastructure.
//!
//! A quick-fix receives a [`ProblemDescriptor`] produced by an inspection and a
//! [`FixContext`] wrapping the parsed file. The context exposes the three
//! capabilities a fix needs from its host:
//!
//! - resolving the descriptor back to a node of the tree,
//! - turning synthesized text into a detached statement node,
//! - replacing one node of the tree with such a statement.
//!
//! Replacements are recorded as byte-range edits and only materialize when the
//! caller applies the context's rewriter.

mod foreach;

pub use foreach::{
    collect_captures, render_use_clause, replacement_text, ForeachToCollectionQuickFix, LoopBody,
    LoopShape, FOREACH_KIND, QUICK_FIX_NAME, SELF_NAME,
};

use crate::cst::{CstError, CstNode, CstParser, CstTree};
use crate::fix::{ByteRangeRewriter, Edit};
use serde::Serialize;
use thiserror::Error;

/// Error raised while applying a quick-fix.
///
/// Declining a fix is not an error: a fix whose preconditions do not hold
/// returns `Ok(())` without touching the context.
#[derive(Debug, Error)]
pub enum QuickFixError {
    /// The statement factory could not be created.
    #[error(transparent)]
    Parser(#[from] CstError),
    /// Synthesized replacement text did not parse as a single statement.
    #[error("Synthesized replacement is not a valid PHP statement: {0}")]
    Synthesis(String),
}

/// A problem reported by an inspection, anchored to one node of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDescriptor {
    /// Kind of the node the problem is reported on.
    pub kind: String,
    /// Start byte offset of the node (inclusive).
    pub start_byte: usize,
    /// End byte offset of the node (exclusive).
    pub end_byte: usize,
    /// 1-based line of the node start.
    pub line: usize,
    /// 1-based column of the node start.
    pub column: usize,
    /// Human readable description.
    pub message: String,
    /// Display name of the quick-fix offered for this problem.
    pub fix_name: &'static str,
}

impl ProblemDescriptor {
    /// Create a descriptor pointing at `node`.
    #[must_use]
    pub fn for_node(node: &CstNode, message: impl Into<String>, fix_name: &'static str) -> Self {
        Self {
            kind: node.kind.clone(),
            start_byte: node.start_byte,
            end_byte: node.end_byte,
            line: node.start_point.row + 1,
            column: node.start_point.column + 1,
            message: message.into(),
            fix_name,
        }
    }

    /// Whether this problem's node lies inside `other`'s node.
    #[must_use]
    pub fn is_nested_in(&self, other: &Self) -> bool {
        other.start_byte <= self.start_byte
            && self.end_byte <= other.end_byte
            && (other.start_byte, other.end_byte) != (self.start_byte, self.end_byte)
    }
}

/// A statement built from text, detached from the edited tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticStatement {
    /// Node kind of the parsed statement.
    pub kind: String,
    /// Exact source text of the statement.
    pub text: String,
}

/// A quick-fix that can be applied to a single reported problem.
pub trait LocalQuickFix {
    /// Name shown in menus and previews.
    fn family_name(&self) -> &'static str;

    /// Apply the fix for `descriptor`, recording at most one replacement in
    /// `context`. Returns `Ok(())` without changes when the fix does not apply.
    fn apply_fix(
        &self,
        context: &mut FixContext<'_>,
        descriptor: &ProblemDescriptor,
    ) -> Result<(), QuickFixError>;
}

/// Editing context for one parsed file.
pub struct FixContext<'t> {
    tree: &'t CstTree,
    factory: CstParser,
    rewriter: ByteRangeRewriter,
}

impl<'t> FixContext<'t> {
    /// Create a context editing `tree`.
    ///
    /// # Errors
    /// Returns an error if the statement factory cannot be created.
    pub fn new(tree: &'t CstTree) -> Result<Self, QuickFixError> {
        Ok(Self {
            tree,
            factory: CstParser::new()?,
            rewriter: ByteRangeRewriter::new(tree.source.as_str()),
        })
    }

    /// The tree being edited.
    #[must_use]
    pub fn tree(&self) -> &'t CstTree {
        self.tree
    }

    /// Resolve a descriptor to the node it was reported on.
    ///
    /// Returns the outermost node spanning the descriptor's range, preferring
    /// one of the descriptor's kind. `None` when nothing spans that range.
    #[must_use]
    pub fn element(&self, descriptor: &ProblemDescriptor) -> Option<&'t CstNode> {
        let (start, end) = (descriptor.start_byte, descriptor.end_byte);
        let outermost = self.tree.root.find_exact(start, end)?;

        let mut node = outermost;
        loop {
            if node.kind == descriptor.kind {
                return Some(node);
            }
            match node
                .children
                .iter()
                .find(|child| child.start_byte == start && child.end_byte == end)
            {
                Some(child) => node = child,
                None => return Some(outermost),
            }
        }
    }

    /// Parse `text` into a detached statement.
    ///
    /// # Errors
    /// Returns [`QuickFixError::Synthesis`] when the text is not exactly one
    /// well-formed statement.
    pub fn create_statement(&mut self, text: &str) -> Result<SyntheticStatement, QuickFixError> {
        let parsed = self.factory.parse_statement(text).map_err(|e| match e {
            CstError::NotAStatement(text) => QuickFixError::Synthesis(text),
            other => QuickFixError::Parser(other),
        })?;
        let statement = parsed
            .statement()
            .ok_or_else(|| QuickFixError::Synthesis(text.to_owned()))?;

        Ok(SyntheticStatement {
            kind: statement.kind.clone(),
            text: parsed.text(statement).to_owned(),
        })
    }

    /// Replace `node` with `statement`.
    pub fn replace(&mut self, node: &CstNode, statement: SyntheticStatement, description: &str) {
        self.rewriter.add_edit(Edit::with_description(
            node.start_byte,
            node.end_byte,
            statement.text,
            description,
        ));
    }

    /// Number of replacements recorded so far.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.rewriter.edit_count()
    }

    /// Replacements recorded so far.
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        self.rewriter.edits()
    }

    /// Hand the recorded replacements over for applying.
    #[must_use]
    pub fn into_rewriter(self) -> ByteRangeRewriter {
        self.rewriter
    }
}

//! Inspection deciding which `foreach` loops the collection fix is offered for.
//!
//! The quick-fix itself declines silently when a loop has an unexpected shape,
//! so this predicate is what keeps such loops from being reported at all. On top
//! of the shape check it rejects bodies whose control flow would change once
//! moved into a closure.

use crate::constants::SUPPRESSION_RE;
use crate::cst::{CstNode, CstTree};
use crate::quickfix::{LoopBody, LoopShape, ProblemDescriptor, FOREACH_KIND, QUICK_FIX_NAME};

/// Message attached to every reported loop.
pub const PROBLEM_MESSAGE: &str = "foreach can be refactored to a collection";

/// Statements that open a new `break`/`continue` target.
const LOOP_KINDS: &[&str] = &[
    "for_statement",
    "foreach_statement",
    "while_statement",
    "do_statement",
    "switch_statement",
];

/// Nodes that open a new function scope.
const SCOPE_KINDS: &[&str] = &[
    "anonymous_function",
    "anonymous_function_creation_expression",
    "arrow_function",
    "function_definition",
    "method_declaration",
    "class_declaration",
    "anonymous_class",
];

/// Reports `foreach` loops that can be rewritten to `collect(...)->each(...)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForeachInspection;

impl ForeachInspection {
    /// Create the inspection.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// All offerable loops of `tree`, outermost first.
    #[must_use]
    pub fn inspect(&self, tree: &CstTree) -> Vec<ProblemDescriptor> {
        let lines: Vec<&str> = tree.source.lines().collect();

        tree.find_foreach_loops()
            .into_iter()
            .filter(|foreach| self.is_offered(foreach, &tree.source))
            .filter(|foreach| !is_suppressed(foreach, &lines))
            .map(|foreach| ProblemDescriptor::for_node(foreach, PROBLEM_MESSAGE, QUICK_FIX_NAME))
            .collect()
    }

    /// Whether the fix should be offered for this loop.
    #[must_use]
    pub fn is_offered(&self, foreach: &CstNode, source: &str) -> bool {
        if foreach.kind != FOREACH_KIND {
            return false;
        }
        let Some(shape) = LoopShape::extract(foreach, source) else {
            return false;
        };
        if shape.body == LoopBody::Unsupported {
            return false;
        }
        !shape
            .body_nodes
            .iter()
            .any(|node| has_escaping_jump(node, source, 0, false))
    }
}

fn is_suppressed(foreach: &CstNode, lines: &[&str]) -> bool {
    let row = foreach.start_point.row;
    let previous = row.checked_sub(1).and_then(|r| lines.get(r));
    [lines.get(row), previous]
        .into_iter()
        .flatten()
        .any(|line| SUPPRESSION_RE().is_match(line))
}

/// Levels a `break`/`continue` jumps out of (`break 2;` leaves two loops).
fn jump_levels(jump: &CstNode, source: &str) -> usize {
    jump.named_children()
        .find(|child| child.kind == "integer")
        .and_then(|level| level.text(source).parse().ok())
        .unwrap_or(1)
}

/// Whether `node` holds a jump that would leave the loop body, given the
/// number of loops entered inside the body so far.
fn has_escaping_jump(node: &CstNode, source: &str, depth: usize, in_scope: bool) -> bool {
    if !in_scope {
        match node.kind.as_str() {
            "break_statement" | "continue_statement" => {
                if jump_levels(node, source) > depth {
                    return true;
                }
            }
            "return_statement" | "goto_statement" | "yield_expression" => return true,
            _ => {}
        }
    }

    let kind = node.kind.as_str();
    let depth = if LOOP_KINDS.contains(&kind) {
        depth + 1
    } else {
        depth
    };
    let in_scope = in_scope || SCOPE_KINDS.contains(&kind);

    node.children
        .iter()
        .any(|child| has_escaping_jump(child, source, depth, in_scope))
}

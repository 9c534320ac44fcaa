//! Rewrites a `foreach` loop into a collection `each` call.
//!
//! ```php
//! foreach ($items as $key => $item) { echo $item . $key . $extra; }
//! ```
//!
//! becomes
//!
//! ```php
//! collect($items)->each(function($item, $key) use ($extra) {echo $item . $key . $extra;});
//! ```

use rustc_hash::FxHashSet;

use super::{FixContext, LocalQuickFix, ProblemDescriptor, QuickFixError};
use crate::cst::CstNode;

/// Display name of the fix.
pub const QUICK_FIX_NAME: &str = "Refactor foreach to collection";

/// Node kind of a `foreach` loop.
pub const FOREACH_KIND: &str = "foreach_statement";

/// Name of the implicit receiver, never captured.
pub const SELF_NAME: &str = "this";

const VARIABLE_KIND: &str = "variable_name";
const DYNAMIC_VARIABLE_KIND: &str = "dynamic_variable_name";
const INLINE_HTML_KIND: &str = "text_interpolation";
const PAIR_KIND: &str = "pair";
const BLOCK_KINDS: &[&str] = &["compound_statement", "colon_block"];
const EMPTY_STATEMENT_KIND: &str = "empty_statement";

/// Parents whose `variable_name` child declares a name instead of reading one.
const DECLARATION_PARENTS: &[&str] = &[
    "simple_parameter",
    "variadic_parameter",
    "property_promotion_parameter",
    "property_element",
];

/// Body of a matched loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopBody<'t> {
    /// `{ ... }` or `: ... endforeach;`, one entry per statement.
    Block(Vec<&'t str>),
    /// A single statement without braces.
    SingleStatement(&'t str),
    /// No body, an empty `;` body, or something unparsable.
    Unsupported,
}

impl LoopBody<'_> {
    /// Text placed between the closure braces.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Block(statements) => Some(statements.join("\n")),
            Self::SingleStatement(statement) => Some((*statement).to_owned()),
            Self::Unsupported => None,
        }
    }
}

/// The parts of a `foreach` loop the rewrite needs.
#[derive(Debug, Clone)]
pub struct LoopShape<'t> {
    /// Expression being iterated.
    pub iterable: &'t CstNode,
    /// `$key` in `$key => $value`.
    pub key: Option<&'t CstNode>,
    /// `$value`.
    pub value: &'t CstNode,
    /// Nodes making up the body, in source order.
    pub body_nodes: Vec<&'t CstNode>,
    /// Classified body.
    pub body: LoopBody<'t>,
}

impl<'t> LoopShape<'t> {
    /// Extract the loop parts from a `foreach_statement` node.
    ///
    /// Returns `None` when the node is not a `foreach`, contains parse
    /// errors, or does not bind its value to a plain variable.
    #[must_use]
    pub fn extract(node: &'t CstNode, source: &'t str) -> Option<Self> {
        if node.kind != FOREACH_KIND || node.children.iter().any(|child| child.is_error) {
            return None;
        }

        let alternative_syntax = node.children.iter().any(|child| child.kind == ":");
        let mut parts = Vec::new();
        for child in &node.children {
            if child.kind.eq_ignore_ascii_case("endforeach") {
                break;
            }
            if child.is_named && !child.is_trivia() {
                parts.push(child);
            }
        }

        let mut parts = parts.into_iter();
        let iterable = parts.next()?;
        let (key, value) = split_binding(parts.next()?)?;
        let body_nodes: Vec<&CstNode> = parts.collect();

        let body = if has_inline_html(&body_nodes) {
            LoopBody::Unsupported
        } else if alternative_syntax {
            LoopBody::Block(body_nodes.iter().map(|node| node.text(source)).collect())
        } else {
            classify_body(&body_nodes, source)
        };

        Some(Self {
            iterable,
            key,
            value,
            body_nodes,
            body,
        })
    }

    /// Closure parameter list: value first, then key.
    #[must_use]
    pub fn arguments(&self, source: &str) -> String {
        match self.key {
            Some(key) => format!("{}, {}", self.value.text(source), key.text(source)),
            None => self.value.text(source).to_owned(),
        }
    }

    /// Bare names of the loop's own bindings plus the receiver.
    #[must_use]
    pub fn ignored_names(&self, source: &'t str) -> Vec<&'t str> {
        self.key
            .iter()
            .chain(std::iter::once(&self.value))
            .map(|node| bare_name(node, source))
            .chain(std::iter::once(SELF_NAME))
            .collect()
    }
}

fn split_binding(binding: &CstNode) -> Option<(Option<&CstNode>, &CstNode)> {
    match binding.kind.as_str() {
        VARIABLE_KIND => Some((None, binding)),
        PAIR_KIND => {
            let mut sides = binding.named_children();
            let key = sides.next()?;
            let value = sides.next()?;
            (key.kind == VARIABLE_KIND && value.kind == VARIABLE_KIND).then_some((Some(key), value))
        }
        // by_ref, list_literal, array destructuring
        _ => None,
    }
}

/// Whether the body leaves PHP mode (`?> ... <?php`) between statements.
fn has_inline_html(body_nodes: &[&CstNode]) -> bool {
    body_nodes.iter().any(|node| {
        node.kind == INLINE_HTML_KIND
            || (BLOCK_KINDS.contains(&node.kind.as_str())
                && node.children.iter().any(|child| child.kind == INLINE_HTML_KIND))
    })
}

fn classify_body<'t>(body_nodes: &[&'t CstNode], source: &'t str) -> LoopBody<'t> {
    match body_nodes {
        [block] if BLOCK_KINDS.contains(&block.kind.as_str()) => {
            LoopBody::Block(block.named_children().map(|s| s.text(source)).collect())
        }
        [statement] if statement.kind != EMPTY_STATEMENT_KIND => {
            LoopBody::SingleStatement(statement.text(source))
        }
        _ => LoopBody::Unsupported,
    }
}

/// Variable name without the `$` sigil.
fn bare_name<'s>(variable: &CstNode, source: &'s str) -> &'s str {
    variable
        .child_of_kind("name")
        .map_or_else(|| variable.text(source), |name| name.text(source))
        .trim_start_matches('$')
}

/// Name read by a variable reference. `${c}` reads `c`; `${'x'}` and
/// `${$expr}` have no static name and yield `""`.
fn reference_name<'s>(node: &CstNode, source: &'s str) -> &'s str {
    if node.kind == DYNAMIC_VARIABLE_KIND {
        return node.child_of_kind("name").map_or("", |name| name.text(source));
    }
    bare_name(node, source)
}

fn is_variable_reference(node: &CstNode, parent: Option<&CstNode>) -> bool {
    if node.kind == DYNAMIC_VARIABLE_KIND {
        return true;
    }
    if node.kind != VARIABLE_KIND {
        return false;
    }
    match parent {
        Some(parent) if DECLARATION_PARENTS.contains(&parent.kind.as_str()) => false,
        // `static::$count` names a property, `$class::$count` reads `$class`
        Some(parent) if parent.kind == "scoped_property_access_expression" => parent
            .child_of_kind("::")
            .is_none_or(|separator| node.start_byte < separator.start_byte),
        _ => true,
    }
}

/// Names of the variables read in `roots`, in first-occurrence pre-order,
/// without duplicates, blanks, or any of `ignored`.
#[must_use]
pub fn collect_captures(roots: &[&CstNode], source: &str, ignored: &[&str]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut captures = Vec::new();

    for root in roots {
        root.walk(&mut |node, parent| {
            if !is_variable_reference(node, parent) {
                return;
            }
            let name = reference_name(node, source);
            if name.trim().is_empty() || ignored.contains(&name) {
                return;
            }
            if seen.insert(name) {
                captures.push(name.to_owned());
            }
        });
    }

    captures
}

/// `use ($a, $b)`, or `None` when nothing is captured.
#[must_use]
pub fn render_use_clause(captures: &[String]) -> Option<String> {
    if captures.is_empty() {
        return None;
    }
    let list = captures
        .iter()
        .map(|name| format!("${name}"))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("use ({list})"))
}

/// Replacement statement text for a `foreach` node, or `None` if the loop
/// cannot be rewritten.
#[must_use]
pub fn replacement_text(foreach: &CstNode, source: &str) -> Option<String> {
    let shape = LoopShape::extract(foreach, source)?;
    let body = shape.body.text()?;

    let arguments = shape.arguments(source);
    let captures = collect_captures(&shape.body_nodes, source, &shape.ignored_names(source));
    let use_clause = render_use_clause(&captures).unwrap_or_default();

    Some(format!(
        "collect({})->each(function({arguments}) {use_clause} {{{body}}});",
        shape.iterable.text(source)
    ))
}

/// Quick-fix turning `foreach` loops into `collect(...)->each(...)` calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForeachToCollectionQuickFix;

impl LocalQuickFix for ForeachToCollectionQuickFix {
    fn family_name(&self) -> &'static str {
        QUICK_FIX_NAME
    }

    fn apply_fix(
        &self,
        context: &mut FixContext<'_>,
        descriptor: &ProblemDescriptor,
    ) -> Result<(), QuickFixError> {
        let tree = context.tree();
        let Some(foreach) = context.element(descriptor) else {
            return Ok(());
        };
        if foreach.kind != FOREACH_KIND {
            return Ok(());
        }
        let Some(text) = replacement_text(foreach, &tree.source) else {
            return Ok(());
        };

        let statement = context.create_statement(&text)?;
        context.replace(foreach, statement, QUICK_FIX_NAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{CstParser, CstTree};

    fn parse(source: &str) -> CstTree {
        CstParser::new().unwrap().parse(source).unwrap()
    }

    fn rewrite(source: &str) -> Option<String> {
        let tree = parse(source);
        let foreach = tree.find_foreach_loops()[0];
        replacement_text(foreach, &tree.source)
    }

    #[test]
    fn test_rewrites_key_value_loop_with_capture() {
        let out = rewrite(
            "<?php\nforeach ($items as $key => $item) { echo $item . $key . $extra; }\n",
        );
        assert_eq!(
            out.as_deref(),
            Some(
                "collect($items)->each(function($item, $key) use ($extra) {echo $item . $key . $extra;});"
            )
        );
    }

    #[test]
    fn test_no_capture_keeps_template_spacing() {
        let out = rewrite("<?php\nforeach ($items as $item) echo $item;\n");
        assert_eq!(
            out.as_deref(),
            Some("collect($items)->each(function($item)  {echo $item;});")
        );
    }

    #[test]
    fn test_block_statements_newline_joined() {
        let out = rewrite(
            "<?php\nforeach ($rows as $row) {\n    $row->touch();\n    // saved below\n    $row->save();\n}\n",
        );
        assert_eq!(
            out.as_deref(),
            Some("collect($rows)->each(function($row)  {$row->touch();\n$row->save();});")
        );
    }

    #[test]
    fn test_alternative_syntax_is_a_block() {
        let out = rewrite("<?php\nforeach ($a as $b):\n    echo $b;\n    echo $c;\nendforeach;\n");
        assert_eq!(
            out.as_deref(),
            Some("collect($a)->each(function($b) use ($c) {echo $b;\necho $c;});")
        );
    }

    #[test]
    fn test_captures_in_first_occurrence_order() {
        let tree = parse("<?php\nforeach ($xs as $x) { $b[] = $x + $a; $a++; echo \"$b {$c}\"; }\n");
        let foreach = tree.find_foreach_loops()[0];
        let shape = LoopShape::extract(foreach, &tree.source).unwrap();

        let captures =
            collect_captures(&shape.body_nodes, &tree.source, &shape.ignored_names(&tree.source));
        assert_eq!(captures, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_braced_interpolation_is_captured() {
        let out = rewrite("<?php\nforeach ($a as $b) { echo \"${c}\"; }\n");
        assert_eq!(
            out.as_deref(),
            Some("collect($a)->each(function($b) use ($c) {echo \"${c}\";});")
        );
    }

    #[test]
    fn test_variable_variables_without_static_name_are_skipped() {
        let out = rewrite("<?php\nforeach ($a as $b) { echo ${'x'} . \"${'y'}\" . $b; }\n");
        assert_eq!(
            out.as_deref(),
            Some("collect($a)->each(function($b)  {echo ${'x'} . \"${'y'}\" . $b;});")
        );
    }

    #[test]
    fn test_variable_variable_reads_inner_variable() {
        let tree = parse("<?php\nforeach ($xs as $x) { echo $$name; }\n");
        let foreach = tree.find_foreach_loops()[0];
        let shape = LoopShape::extract(foreach, &tree.source).unwrap();

        let captures =
            collect_captures(&shape.body_nodes, &tree.source, &shape.ignored_names(&tree.source));
        assert_eq!(captures, vec!["name"]);
    }

    #[test]
    fn test_declines_inline_html_body() {
        assert_eq!(
            rewrite("<?php\nforeach ($items as $b) { ?><li><?= $b ?></li><?php }\n"),
            None
        );
    }

    #[test]
    fn test_this_is_never_captured() {
        let out = rewrite("<?php\nforeach ($xs as $x) { $this->add($x, $limit); }\n");
        assert_eq!(
            out.as_deref(),
            Some("collect($xs)->each(function($x) use ($limit) {$this->add($x, $limit);});")
        );
    }

    #[test]
    fn test_nested_closure_parameters_are_not_captured() {
        let tree = parse(
            "<?php\nforeach ($xs as $x) { $f = function ($y) use ($z) { return $y; }; }\n",
        );
        let foreach = tree.find_foreach_loops()[0];
        let shape = LoopShape::extract(foreach, &tree.source).unwrap();

        let captures =
            collect_captures(&shape.body_nodes, &tree.source, &shape.ignored_names(&tree.source));
        assert_eq!(captures, vec!["f", "z", "y"]);
    }

    #[test]
    fn test_static_property_name_is_not_captured() {
        let tree = parse("<?php\nforeach ($xs as $x) { static::$seen[] = $x; }\n");
        let foreach = tree.find_foreach_loops()[0];
        let shape = LoopShape::extract(foreach, &tree.source).unwrap();

        let captures =
            collect_captures(&shape.body_nodes, &tree.source, &shape.ignored_names(&tree.source));
        assert!(captures.is_empty());
    }

    #[test]
    fn test_use_clause_rendering() {
        assert_eq!(render_use_clause(&[]), None);
        assert_eq!(
            render_use_clause(&["a".to_owned(), "b".to_owned()]).as_deref(),
            Some("use ($a, $b)")
        );
    }

    #[test]
    fn test_declines_by_reference_value() {
        assert_eq!(rewrite("<?php\nforeach ($xs as &$x) { $x++; }\n"), None);
    }

    #[test]
    fn test_declines_list_destructuring() {
        assert_eq!(rewrite("<?php\nforeach ($xs as [$a, $b]) { echo $a; }\n"), None);
        assert_eq!(rewrite("<?php\nforeach ($xs as list($a, $b)) { echo $a; }\n"), None);
    }

    #[test]
    fn test_declines_empty_statement_body() {
        assert_eq!(rewrite("<?php\nforeach ($xs as $x);\n"), None);
    }

    #[test]
    fn test_body_classification() {
        let tree = parse("<?php\nforeach ($xs as $x) echo $x;\n");
        let foreach = tree.find_foreach_loops()[0];
        let shape = LoopShape::extract(foreach, &tree.source).unwrap();
        assert_eq!(shape.body, LoopBody::SingleStatement("echo $x;"));
        assert!(shape.key.is_none());
        assert_eq!(tree.text(shape.iterable), "$xs");
    }
}

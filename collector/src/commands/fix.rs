//! Foreach-to-collection fix command.

use crate::analyzer::{AnalysisResult, FileProblem};
use crate::cst::CstParser;
use crate::quickfix::{FixContext, ForeachToCollectionQuickFix, LocalQuickFix, ProblemDescriptor};
use crate::utils::{normalize_display_path, validate_output_path};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options for the fix command
#[derive(Debug, Default)]
pub struct FixOptions {
    /// Write the rewritten files (otherwise only preview the replacements)
    pub apply: bool,
    /// Verbose output
    pub verbose: bool,
    /// Analysis root for path containment
    pub analysis_root: PathBuf,
}

/// Result of the fix command for one file
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FixResult {
    /// File that was processed
    pub file: String,
    /// Number of loops rewritten (or that would be rewritten)
    pub rewritten: usize,
    /// Loops inside a rewritten loop; they become fixable on the next run
    pub remaining: usize,
    /// Loops the quick-fix declined (file changed since analysis)
    pub declined: usize,
    /// Whether the file was written
    pub written: bool,
}

/// Apply the collection fix to every reported loop.
///
/// Loops nested in a loop rewritten in the same pass are left alone: their
/// text is carried verbatim into the closure body and will be reported again
/// on the next run.
///
/// # Errors
///
/// Returns an error if writing output fails, a file escapes the analysis
/// root, or a rewritten file cannot be written.
pub fn run_fix<W: Write>(
    results: &AnalysisResult,
    options: &FixOptions,
    mut writer: W,
) -> Result<Vec<FixResult>> {
    if options.apply {
        writeln!(writer, "\n{}", "Applying collection fixes...".cyan())?;
    } else {
        writeln!(
            writer,
            "\n{}",
            "[DRY-RUN] Loops that would be rewritten (use --apply to write):".yellow()
        )?;
    }

    let problems_by_file = group_by_file(&results.problems);
    if problems_by_file.is_empty() {
        writeln!(writer, "  No loops to fix.")?;
        return Ok(vec![]);
    }

    if options.verbose {
        writeln!(writer, "[VERBOSE] Fix Statistics:")?;
        writeln!(writer, "   Files to modify: {}", problems_by_file.len())?;
        writeln!(writer, "   Loops reported: {}", results.problems.len())?;
        writeln!(writer)?;
    }

    let mut all_results = Vec::new();
    for (file_path, problems) in problems_by_file {
        if let Some(res) = fix_file(&mut writer, file_path, &problems, options)? {
            all_results.push(res);
        }
    }

    let remaining: usize = all_results.iter().map(|r| r.remaining).sum();
    if remaining > 0 {
        writeln!(
            writer,
            "  {} {} nested loop(s) remain; re-run to rewrite them.",
            "Note:".yellow(),
            remaining
        )?;
    }

    Ok(all_results)
}

fn group_by_file(problems: &[FileProblem]) -> BTreeMap<&Path, Vec<&ProblemDescriptor>> {
    let mut by_file: BTreeMap<&Path, Vec<&ProblemDescriptor>> = BTreeMap::new();
    for FileProblem { file, problem } in problems {
        by_file.entry(file.as_path()).or_default().push(problem);
    }
    for descriptors in by_file.values_mut() {
        descriptors.sort_by_key(|d| (d.start_byte, std::cmp::Reverse(d.end_byte)));
    }
    by_file
}

fn fix_file<W: Write>(
    writer: &mut W,
    file_path: &Path,
    problems: &[&ProblemDescriptor],
    options: &FixOptions,
) -> Result<Option<FixResult>> {
    let file_path = validate_output_path(file_path, Some(&options.analysis_root))?;
    let display = normalize_display_path(&file_path);

    let content = match fs::read_to_string(&file_path) {
        Ok(c) => c,
        Err(e) => {
            writeln!(writer, "  {} {}: {}", "Skip:".yellow(), display, e)?;
            return Ok(None);
        }
    };

    let tree = match CstParser::new().and_then(|mut parser| parser.parse(&content)) {
        Ok(tree) => tree,
        Err(e) => {
            writeln!(writer, "  {} {}: {}", "Parse error:".red(), display, e)?;
            return Ok(None);
        }
    };

    let quick_fix = ForeachToCollectionQuickFix;
    let mut context = FixContext::new(&tree)?;
    let mut rewritten: Vec<&ProblemDescriptor> = Vec::new();
    let mut remaining = 0;
    let mut declined = 0;

    for &descriptor in problems {
        if rewritten.iter().any(|outer| descriptor.is_nested_in(outer)) {
            remaining += 1;
            continue;
        }

        let before = context.edit_count();
        if let Err(e) = quick_fix.apply_fix(&mut context, descriptor) {
            writeln!(
                writer,
                "  {} {}:{}: {}",
                "Error:".red(),
                display,
                descriptor.line,
                e
            )?;
            declined += 1;
            continue;
        }

        if context.edit_count() > before {
            rewritten.push(descriptor);
            if !options.apply {
                if let Some(edit) = context.edits().last() {
                    writeln!(
                        writer,
                        "  Would rewrite {}:{}\n    {}",
                        display,
                        descriptor.line,
                        edit.replacement.dimmed()
                    )?;
                }
            }
        } else {
            declined += 1;
        }
    }

    if options.verbose && declined > 0 {
        writeln!(
            writer,
            "[VERBOSE] {display}: {declined} loop(s) no longer match and were left unchanged"
        )?;
    }

    let mut written = false;
    if options.apply && !rewritten.is_empty() {
        match context.into_rewriter().apply_verified() {
            Ok(fixed) => {
                fs::write(&file_path, fixed)
                    .with_context(|| format!("Failed to write {display}"))?;
                written = true;
                writeln!(
                    writer,
                    "  {} {} ({} loop(s) rewritten)",
                    "Fixed:".green(),
                    display,
                    rewritten.len()
                )?;
            }
            Err(e) => {
                writeln!(writer, "  {} {}: {}", "Skip:".yellow(), display, e)?;
                return Ok(None);
            }
        }
    }

    Ok(Some(FixResult {
        file: display,
        rewritten: rewritten.len(),
        remaining,
        declined,
        written,
    }))
}

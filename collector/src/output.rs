use crate::analyzer::{AnalysisResult, AnalysisSummary, ParseError};
use crate::utils::normalize_display_path;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let mut defaults: Vec<&str> = crate::constants::DEFAULT_EXCLUDE_FOLDERS()
            .iter()
            .copied()
            .collect();
        defaults.sort_unstable();
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            defaults.join(", ").dimmed()
        )?;
    } else {
        writeln!(
            writer,
            "{} {}",
            "Excluding:".yellow().bold(),
            folders.join(", ")
        )?;
    }
    Ok(())
}

/// Create a progress bar with file count, drawn on stderr.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("looking for foreach loops...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        "║  Foreach To Collection Results         ║".cyan().bold()
    )?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(
    writer: &mut impl Write,
    summary: &AnalysisSummary,
) -> std::io::Result<()> {
    fn pill(label: &str, count: usize) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().green())
        } else {
            format!("{}: {}", label, count.to_string().red().bold())
        }
    }

    writeln!(
        writer,
        "Loops: {}  {}  {}",
        summary.total_loops.to_string().bold(),
        pill("Refactorable", summary.fixable_loops),
        pill("Parse Errors", summary.parse_errors_count),
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print analysis statistics (files and lines processed).
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_analysis_stats(
    writer: &mut impl Write,
    summary: &AnalysisSummary,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{}",
        format!(
            "Analyzed {} files ({} lines)",
            summary.total_files.to_string().bold(),
            summary.total_lines.to_string().bold()
        )
        .dimmed()
    )?;
    Ok(())
}

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Print the loops the fix is offered for.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_problems(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    if result.problems.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Refactorable Loops".bold().underline())?;

    let mut table = create_table(vec!["Location", "Message", "Fix"]);
    for entry in &result.problems {
        let location = format!(
            "{}:{}:{}",
            normalize_display_path(&entry.file),
            entry.problem.line,
            entry.problem.column
        );
        table.add_row(vec![
            Cell::new(location),
            Cell::new(&entry.problem.message).add_attribute(Attribute::Bold),
            Cell::new(entry.problem.fix_name).add_attribute(Attribute::Dim),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print a list of parse errors.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_parse_errors(writer: &mut impl Write, errors: &[ParseError]) -> std::io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Parse Errors".bold().underline().red())?;

    let mut table = create_table(vec!["File", "Error"]);
    for e in errors {
        table.add_row(vec![
            Cell::new(normalize_display_path(&e.file)).add_attribute(Attribute::Bold),
            Cell::new(&e.error).fg(Color::Red),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the full report.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    print_header(writer)?;

    if result.problems.is_empty() && result.parse_errors.is_empty() {
        writeln!(
            writer,
            "{}",
            "✓ All clean! No refactorable loops found.".green()
        )?;
        return Ok(());
    }

    print_problems(writer, result)?;
    print_parse_errors(writer, &result.parse_errors)?;
    Ok(())
}

/// Print a quiet report (no detailed tables) for CI/CD mode.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_report_quiet(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    writeln!(
        writer,
        "[SUMMARY] {} refactorable loops, {} parse errors",
        result.summary.fixable_loops, result.summary.parse_errors_count
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Collector;
    use std::path::Path;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_lists_problem_location() {
        colored::control::set_override(false);
        let result = Collector::new().analyze_code(
            "<?php\n\n  foreach ($a as $b) { echo $b; }\n",
            Path::new("./app/index.php"),
        );

        let output = render(|w| print_report(w, &result));
        assert!(output.contains("app/index.php:3:3"));
        assert!(output.contains("Refactor foreach to collection"));
    }

    #[test]
    fn test_clean_report() {
        colored::control::set_override(false);
        let result = Collector::new().analyze_code("<?php echo 1;", Path::new("index.php"));
        let output = render(|w| print_report(w, &result));
        assert!(output.contains("All clean!"));
    }

    #[test]
    fn test_quiet_report() {
        let result = Collector::new().analyze_code(
            "<?php foreach ($a as $b) { echo $b; }",
            Path::new("index.php"),
        );
        let output = render(|w| print_report_quiet(w, &result));
        assert_eq!(output, "[SUMMARY] 1 refactorable loops, 0 parse errors\n");
    }

    #[test]
    fn test_exclusion_list() {
        colored::control::set_override(false);
        let output = render(|w| print_exclusion_list(w, &["legacy".to_owned()]));
        assert_eq!(output, "Excluding: legacy\n");
        let defaults = render(|w| print_exclusion_list(w, &[]));
        assert!(defaults.contains("vendor"));
    }
}

use crate::analyzer::{AnalysisResult, Collector};
use crate::cli::{Cli, Commands, PathArgs};
use crate::commands::{FixOptions, FixResult};
use crate::config::Config;
use crate::utils::merge_folders;
use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs Collector with the given arguments, writing to stdout.
///
/// # Errors
///
/// Returns an error if a command fails (I/O, serialization, rewriting).
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run Collector with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Argument errors and missing paths are reported on stderr and yield exit code 1.
///
/// # Errors
///
/// Returns an error if a command fails (I/O, serialization, rewriting).
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["collector".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    if cli_var.output.verbose && !cli_var.output.json {
        eprintln!("[VERBOSE] Collector v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        if let Some(ref command) = cli_var.command {
            eprintln!("[VERBOSE] Executing subcommand: {command:?}");
        }
    }

    match cli_var.command {
        Some(Commands::Init) => {
            crate::commands::run_init(writer)?;
            Ok(0)
        }
        Some(Commands::Files { ref args }) => {
            let Some(paths) = resolve_paths(&args.paths) else {
                return Ok(1);
            };
            let config = load_config(&paths);
            let mut cli_excludes = cli_var.exclude_folders.clone();
            cli_excludes.extend(args.exclude.iter().cloned());
            let collector =
                build_collector(&cli_var, &config, &cli_excludes, cli_var.output.verbose);
            crate::commands::run_files(&collector, &paths, args.json, &mut *writer)?;
            Ok(0)
        }
        None => run_analysis(&cli_var, writer),
    }
}

/// Paths to analyze: `--root`, the positional paths, or the current directory.
/// `None` (after reporting on stderr) when a path does not exist.
fn resolve_paths(args: &PathArgs) -> Option<Vec<PathBuf>> {
    let paths = match &args.root {
        Some(root) => vec![root.clone()],
        None if args.paths.is_empty() => vec![PathBuf::from(".")],
        None => args.paths.clone(),
    };

    for path in &paths {
        if !path.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                path.display()
            );
            return None;
        }
    }
    Some(paths)
}

fn load_config(paths: &[PathBuf]) -> Config {
    let config_path = paths.first().map_or(Path::new("."), PathBuf::as_path);
    Config::load_from_path(config_path)
}

fn build_collector(
    cli_var: &Cli,
    config: &Config,
    cli_excludes: &[String],
    verbose: bool,
) -> Collector {
    let exclude_folders = merge_folders(config.collector.exclude_folders.as_deref(), cli_excludes);
    let include_folders = merge_folders(
        config.collector.include_folders.as_deref(),
        &cli_var.include_folders,
    );

    Collector::new()
        .with_config(config)
        .with_excludes(exclude_folders)
        .with_includes(include_folders)
        .with_verbose(verbose)
}

fn run_analysis<W: Write>(cli_var: &Cli, writer: &mut W) -> Result<i32> {
    let json = cli_var.output.json;
    let verbose = cli_var.output.verbose && !json;

    let Some(paths) = resolve_paths(&cli_var.paths) else {
        return Ok(1);
    };
    let analysis_root = cli_var
        .paths
        .root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let config = load_config(&paths);
    if verbose {
        if let Some(ref file) = config.config_file_path {
            eprintln!("[VERBOSE] Loaded configuration from {}", file.display());
        }
    }
    let fail_on_problems =
        cli_var.fail_on_problems || config.collector.fail_on_problems.unwrap_or(false);

    let collector = build_collector(cli_var, &config, &cli_var.exclude_folders, verbose);

    if !json && !cli_var.output.quiet {
        crate::output::print_exclusion_list(writer, &collector.exclude_folders).ok();
    }

    if verbose {
        eprintln!("[VERBOSE] Configuration:");
        eprintln!("   Paths: {paths:?}");
        eprintln!("   Extensions: {:?}", collector.extensions);
        if !collector.exclude_folders.is_empty() {
            eprintln!("   Exclude folders: {:?}", collector.exclude_folders);
        }
        if !collector.include_folders.is_empty() {
            eprintln!("   Include folders: {:?}", collector.include_folders);
        }
        eprintln!("   Fail on problems: {fail_on_problems}");
        eprintln!();
    }

    let progress = if json || cli_var.output.quiet {
        None
    } else {
        let total_files = collector.count_files(&paths);
        Some(Arc::new(crate::output::create_progress_bar(
            total_files as u64,
        )))
    };
    let collector = match &progress {
        Some(pb) => collector.with_progress(Arc::clone(pb)),
        None => collector,
    };

    let start_time = std::time::Instant::now();
    let result = collector.analyze(&paths);

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if verbose {
        eprintln!(
            "[VERBOSE] Analysis completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        eprintln!("   Files analyzed: {}", result.summary.total_files);
        eprintln!("   Lines analyzed: {}", result.summary.total_lines);
        eprintln!("   Loops found: {}", result.summary.total_loops);
        eprintln!("   Refactorable: {}", result.summary.fixable_loops);
        eprintln!("   Parse errors: {}", result.summary.parse_errors_count);
    }

    print_results(cli_var, &result, writer)?;

    let mut unresolved = result.summary.fixable_loops;
    if cli_var.fix {
        if verbose {
            eprintln!(
                "[VERBOSE] Fix mode: {}",
                if cli_var.apply {
                    "apply changes"
                } else {
                    "dry-run (preview)"
                }
            );
        }
        let fix_options = FixOptions {
            apply: cli_var.apply,
            verbose,
            analysis_root,
        };
        let fixed = if json {
            crate::commands::run_fix(&result, &fix_options, std::io::sink())?
        } else {
            crate::commands::run_fix(&result, &fix_options, &mut *writer)?
        };
        if cli_var.apply {
            unresolved = unresolved_after_fix(&result, &fixed);
        }
    }

    let mut exit_code = 0;
    if fail_on_problems {
        if unresolved > 0 {
            if !json {
                eprintln!("\n[GATE] Refactorable loops: {unresolved} - FAILED");
            }
            exit_code = 1;
        } else if !json {
            writeln!(writer, "\n[GATE] Refactorable loops: 0 - PASSED")?;
        }
    }

    Ok(exit_code)
}

fn print_results<W: Write>(cli_var: &Cli, result: &AnalysisResult, writer: &mut W) -> Result<()> {
    if cli_var.output.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(result)?)?;
    } else if cli_var.output.quiet {
        crate::output::print_report_quiet(writer, result)?;
    } else {
        crate::output::print_report(writer, result)?;
        writeln!(writer)?;
        crate::output::print_summary_pills(writer, &result.summary)?;
        crate::output::print_analysis_stats(writer, &result.summary)?;
    }
    Ok(())
}

/// Reported loops left in place after `--fix --apply`: everything in files
/// that were not written, plus nested and declined loops in written ones.
fn unresolved_after_fix(result: &AnalysisResult, fixed: &[FixResult]) -> usize {
    let rewritten: usize = fixed
        .iter()
        .filter(|r| r.written)
        .map(|r| r.rewritten)
        .sum();
    result.summary.fixable_loops.saturating_sub(rewritten)
}

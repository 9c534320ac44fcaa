//! Processing methods for the Collector analyzer.
//!
//! Contains: `collect_files`, `process_single_file`, `aggregate_results`, `analyze`, `analyze_code`

use super::types::FileOutcome;
use super::{AnalysisResult, AnalysisSummary, Collector, FileProblem, ParseError};
use crate::cst::CstParser;
use crate::inspection::ForeachInspection;
use crate::utils::{collect_php_files, count_lines};

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

impl Collector {
    /// Runs the analysis on files and directories.
    ///
    /// - No paths: the current directory is analyzed.
    /// - Directories are walked with the configured exclusions.
    /// - Individual files are analyzed when their extension is scanned.
    ///
    /// Files are processed in parallel using `rayon`; results come back
    /// ordered by path, then by position within the file.
    #[must_use]
    pub fn analyze(&self, paths: &[PathBuf]) -> AnalysisResult {
        let (files, total_directories) = self.collect_files(paths);

        if self.verbose {
            eprintln!(
                "[VERBOSE] Analyzing {} files in {} directories",
                files.len(),
                total_directories
            );
        }

        let outcomes: Vec<(PathBuf, FileOutcome)> = files
            .par_iter()
            .map(|file| {
                let outcome = self.process_single_file(file);
                if let Some(pb) = &self.progress_bar {
                    pb.inc(1);
                }
                (file.clone(), outcome)
            })
            .collect();

        let mut result = aggregate_results(outcomes);
        result.summary.total_directories = total_directories;
        result
    }

    /// Inspects a single in-memory source, reporting problems against `file_path`.
    #[must_use]
    pub fn analyze_code(&self, code: &str, file_path: &Path) -> AnalysisResult {
        let outcome = inspect_source(code, file_path);
        aggregate_results(vec![(file_path.to_path_buf(), outcome)])
    }

    /// Resolves `paths` to the sorted, de-duplicated list of files to scan,
    /// plus the number of directories walked.
    pub(crate) fn collect_files(&self, paths: &[PathBuf]) -> (Vec<PathBuf>, usize) {
        let default_paths = [PathBuf::from(".")];
        let paths = if paths.is_empty() {
            &default_paths[..]
        } else {
            paths
        };

        let mut files = Vec::new();
        let mut total_directories = 0;

        for path in paths {
            if path.is_dir() {
                let (dir_files, dir_count) = collect_php_files(
                    path,
                    &self.exclude_folders,
                    &self.include_folders,
                    &self.extensions,
                    self.verbose,
                );
                files.extend(dir_files);
                total_directories += dir_count;
            } else if path.is_file() && self.is_scanned_extension(path) {
                files.push(path.clone());
            } else if self.verbose {
                eprintln!("[VERBOSE] Skipping {}", path.display());
            }
        }

        files.sort();
        files.dedup();
        (files, total_directories)
    }

    fn is_scanned_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }

    /// Reads and inspects one file. I/O failures become parse errors.
    fn process_single_file(&self, file_path: &Path) -> FileOutcome {
        match fs::read_to_string(file_path) {
            Ok(source) => {
                let outcome = inspect_source(&source, file_path);
                if self.verbose && !outcome.problems.is_empty() {
                    eprintln!(
                        "[VERBOSE] {}: {} of {} loops fixable",
                        file_path.display(),
                        outcome.problems.len(),
                        outcome.loops
                    );
                }
                outcome
            }
            Err(e) => FileOutcome {
                parse_error: Some(ParseError {
                    file: file_path.to_path_buf(),
                    error: format!("Failed to read file: {e}"),
                }),
                ..FileOutcome::default()
            },
        }
    }
}

/// Parses `source` and runs the inspection on it.
///
/// Sources with syntax errors are still inspected: the parser recovers and
/// loops outside the broken region remain valid candidates.
fn inspect_source(source: &str, file_path: &Path) -> FileOutcome {
    let lines = count_lines(source);
    let tree = match CstParser::new().and_then(|mut parser| parser.parse(source)) {
        Ok(tree) => tree,
        Err(e) => {
            return FileOutcome {
                parse_error: Some(ParseError {
                    file: file_path.to_path_buf(),
                    error: e.to_string(),
                }),
                lines,
                ..FileOutcome::default()
            }
        }
    };

    let problems = ForeachInspection::new()
        .inspect(&tree)
        .into_iter()
        .map(|problem| FileProblem {
            file: file_path.to_path_buf(),
            problem,
        })
        .collect();

    let parse_error = tree.has_error.then(|| ParseError {
        file: file_path.to_path_buf(),
        error: "File contains syntax errors".to_owned(),
    });

    FileOutcome {
        problems,
        parse_error,
        lines,
        loops: tree.find_foreach_loops().len(),
    }
}

fn aggregate_results(outcomes: Vec<(PathBuf, FileOutcome)>) -> AnalysisResult {
    let mut result = AnalysisResult {
        summary: AnalysisSummary {
            total_files: outcomes.len(),
            ..AnalysisSummary::default()
        },
        ..AnalysisResult::default()
    };

    for (_, outcome) in outcomes {
        result.summary.total_lines += outcome.lines;
        result.summary.total_loops += outcome.loops;
        result.problems.extend(outcome.problems);
        result.parse_errors.extend(outcome.parse_error);
    }

    result.summary.fixable_loops = result.problems.len();
    result.summary.parse_errors_count = result.parse_errors.len();
    result
}

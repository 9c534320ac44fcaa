//! Type definitions for analysis results.

use crate::quickfix::ProblemDescriptor;
use serde::Serialize;
use std::path::PathBuf;

/// Represents a file that could not be read or parsed cleanly.
#[derive(Debug, Serialize, Clone)]
pub struct ParseError {
    /// The file where the error occurred.
    pub file: PathBuf,
    /// The error message.
    pub error: String,
}

/// A reported loop together with the file it was found in.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FileProblem {
    /// File containing the loop.
    pub file: PathBuf,
    /// Where the loop is and which fix is offered for it.
    #[serde(flatten)]
    pub problem: ProblemDescriptor,
}

/// Holds the results of the analysis.
/// This struct is serialized to JSON if requested.
#[derive(Debug, Serialize, Default)]
pub struct AnalysisResult {
    /// Loops the collection fix is offered for, ordered by file then position.
    pub problems: Vec<FileProblem>,
    /// Files that could not be read or contain syntax errors.
    pub parse_errors: Vec<ParseError>,
    /// Summary statistics of the analysis.
    pub summary: AnalysisSummary,
}

/// Summary statistics for the analysis result.
#[derive(Debug, Serialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Total number of files scanned.
    pub total_files: usize,
    /// Total number of directories walked.
    pub total_directories: usize,
    /// Total number of lines analyzed.
    pub total_lines: usize,
    /// Number of `foreach` loops seen.
    pub total_loops: usize,
    /// Number of loops the fix is offered for.
    pub fixable_loops: usize,
    /// Number of parse errors found.
    pub parse_errors_count: usize,
}

/// Per-file outcome produced by a worker.
#[derive(Debug, Default)]
pub(crate) struct FileOutcome {
    pub problems: Vec<FileProblem>,
    pub parse_error: Option<ParseError>,
    pub lines: usize,
    pub loops: usize,
}

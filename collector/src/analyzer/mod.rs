//! Collector analyzer module.
//!
//! - `types`: Result types (`AnalysisResult`, `FileProblem`, `ParseError`, `AnalysisSummary`)
//! - `processing`: File discovery, per-file inspection and aggregation
//! - Core `Collector` struct and its builder methods

mod processing;
/// Result types and analysis summaries.
pub mod types;

pub use types::{AnalysisResult, AnalysisSummary, FileProblem, ParseError};

use crate::config::Config;
use std::path::PathBuf;
use std::sync::Arc;

/// The main analyzer struct.
/// Configuration options for the analysis are stored here.
#[derive(Debug)]
pub struct Collector {
    /// Folders to exclude from analysis.
    pub exclude_folders: Vec<String>,
    /// Folders to force-include in analysis (overrides default exclusions).
    pub include_folders: Vec<String>,
    /// File extensions to scan.
    pub extensions: Vec<String>,
    /// Progress bar ticked once per analyzed file (thread-safe).
    pub progress_bar: Option<Arc<indicatif::ProgressBar>>,
    /// Whether to enable verbose logging.
    pub verbose: bool,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            exclude_folders: Vec::new(),
            include_folders: Vec::new(),
            extensions: Config::default().collector.extensions(),
            progress_bar: None,
            verbose: false,
        }
    }
}

impl Collector {
    /// Creates an analyzer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to set verbose mode.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder-style method to set excluded folders.
    #[must_use]
    pub fn with_excludes(mut self, folders: Vec<String>) -> Self {
        self.exclude_folders = folders;
        self
    }

    /// Builder-style method to set force-included folders.
    #[must_use]
    pub fn with_includes(mut self, folders: Vec<String>) -> Self {
        self.include_folders = folders;
        self
    }

    /// Builder-style method to set the scanned extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Builder-style method to apply the configured extensions.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.extensions = config.collector.extensions();
        self
    }

    /// Builder-style method to attach a progress bar.
    #[must_use]
    pub fn with_progress(mut self, progress_bar: Arc<indicatif::ProgressBar>) -> Self {
        self.progress_bar = Some(progress_bar);
        self
    }

    /// Counts the files an analysis of `paths` would visit.
    #[must_use]
    pub fn count_files(&self, paths: &[PathBuf]) -> usize {
        self.collect_files(paths).0.len()
    }
}

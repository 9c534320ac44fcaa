use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.collector.toml, or \"extra.collector\" in composer.json):
  Create this file in your project root to set defaults.

  [collector]
  exclude_folders = [\"build\"]   # vendor, node_modules, storage, ... are always excluded
  include_folders = []          # Force-include these
  extensions = [\"php\"]          # File extensions to scan
  fail_on_problems = false      # Exit 1 if any foreach can be refactored
";

/// Shared path arguments (mutually exclusive paths/root).
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Paths to analyze (files or directories).
    /// When no paths are provided, defaults to the current directory.
    /// Cannot be used with --root.
    #[arg(conflicts_with = "root")]
    pub paths: Vec<PathBuf>,

    /// Project root used as both the analysis target and the containment
    /// boundary for rewritten files.
    #[arg(long, conflicts_with = "paths")]
    pub root: Option<PathBuf>,
}

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (shows files being analyzed).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary (no detailed tables).
    #[arg(long)]
    pub quiet: bool,
}

/// Options for the files subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct FilesArgs {
    /// Path options (paths vs root).
    #[command(flatten)]
    pub paths: PathArgs,

    /// Output JSON.
    #[arg(long)]
    pub json: bool,

    /// Exclude folders.
    #[arg(long, alias = "exclude-folder")]
    pub exclude: Vec<String>,
}

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    name = "collector",
    author,
    version,
    about = "Collector - Refactor PHP foreach loops into collect(...)->each(...) calls",
    long_about = None,
    after_help = CONFIG_HELP
)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute (files, init).
    pub command: Option<Commands>,

    /// Global path options (paths vs root).
    #[command(flatten)]
    pub paths: PathArgs,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Folders to exclude from analysis.
    #[arg(long, alias = "exclude-folder")]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include in analysis (overrides default exclusions).
    #[arg(long, alias = "include-folder")]
    pub include_folders: Vec<String>,

    /// Rewrite the reported loops.
    /// By default, shows a preview of the replacement statements (dry-run).
    /// Use --apply to actually modify files.
    #[arg(long)]
    pub fix: bool,

    /// Apply the fixes to files (use with --fix).
    #[arg(short = 'a', long, requires = "fix")]
    pub apply: bool,

    /// Exit with code 1 if any loop can be refactored (and was not rewritten).
    #[arg(long)]
    pub fail_on_problems: bool,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// List the files a scan would visit
    Files {
        /// Options for listing files.
        #[command(flatten)]
        args: FilesArgs,
    },
    /// Create a .collector.toml with default settings in the current directory
    Init,
}

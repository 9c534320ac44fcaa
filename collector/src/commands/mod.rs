//! Commands module - CLI subcommand implementations.

mod files;
mod fix;
mod init;

pub use files::{run_files, FileEntry};
pub use fix::{run_fix, FixOptions, FixResult};
pub use init::{run_init, run_init_in};

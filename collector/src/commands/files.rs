//! Lists the files a scan would visit.

use crate::analyzer::Collector;
use crate::utils::{count_lines, normalize_display_path};

use anyhow::Result;
use comfy_table::Table;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Per-file statistics shown by the `files` command.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// File path as displayed.
    pub file: String,
    /// Number of lines.
    pub lines: usize,
    /// Size in kilobytes.
    pub size_kb: f64,
}

/// Executes the files command: lists every file `collector` would scan
/// under `paths`, with the exclusions of `collector`.
///
/// # Errors
///
/// Returns an error if writing output or JSON serialization fails.
pub fn run_files<W: Write>(
    collector: &Collector,
    paths: &[PathBuf],
    json: bool,
    mut writer: W,
) -> Result<Vec<FileEntry>> {
    let (files, _) = collector.collect_files(paths);

    let entries: Vec<FileEntry> = files
        .par_iter()
        .map(|file_path| {
            let code = fs::read_to_string(file_path).unwrap_or_default();
            let size_bytes = fs::metadata(file_path).map(|m| m.len()).unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let size_kb = size_bytes as f64 / 1024.0;
            FileEntry {
                file: normalize_display_path(file_path),
                lines: count_lines(&code),
                size_kb,
            }
        })
        .collect();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        let mut table = Table::new();
        table.set_header(vec!["File", "Lines", "Size (KB)"]);
        for entry in &entries {
            table.add_row(vec![
                entry.file.clone(),
                entry.lines.to_string(),
                format!("{:.2}", entry.size_kb),
            ]);
        }
        writeln!(writer, "{table}")?;
        writeln!(writer, "{} file(s)", entries.len())?;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_files_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.php"), "<?php\necho 1;\n").unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/b.php"), "<?php").unwrap();

        let mut out = Vec::new();
        let entries = run_files(
            &Collector::new(),
            &[dir.path().to_path_buf()],
            true,
            &mut out,
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines, 2);

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_run_files_table() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.php"), "<?php").unwrap();

        let mut out = Vec::new();
        run_files(
            &Collector::new(),
            &[dir.path().to_path_buf()],
            false,
            &mut out,
        )
        .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("index.php"));
        assert!(output.contains("1 file(s)"));
    }
}

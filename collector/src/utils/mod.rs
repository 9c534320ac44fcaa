//! Utilities module for Collector.

mod paths;

pub use paths::{
    collect_php_files, is_excluded, normalize_display_path, validate_output_path,
};

/// Merges configured and command-line folder lists, dropping duplicates
/// while keeping first-seen order.
#[must_use]
pub fn merge_folders(configured: Option<&[String]>, cli: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for folder in configured.unwrap_or_default().iter().chain(cli) {
        if !merged.contains(folder) {
            merged.push(folder.clone());
        }
    }
    merged
}

/// Number of lines in `source`, counting a trailing partial line.
#[must_use]
pub fn count_lines(source: &str) -> usize {
    source.lines().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_folders_dedups() {
        let configured = vec!["legacy".to_owned(), "tmp".to_owned()];
        let merged = merge_folders(Some(&configured), &["tmp".to_owned(), "build".to_owned()]);
        assert_eq!(merged, vec!["legacy", "tmp", "build"]);
        assert!(merge_folders(None, &[]).is_empty());
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("<?php\necho 1;"), 2);
        assert_eq!(count_lines("<?php\necho 1;\n"), 2);
    }
}

//! Path utilities for Collector.
//!
//! - Cross-platform path normalization for display
//! - Path containment checks for rewritten files
//! - PHP source discovery with gitignore support

use std::path::{Component, Path, PathBuf};

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;

/// Normalizes a path for CLI display.
///
/// Backslashes become forward slashes and a leading `./` is stripped.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use collector::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\app\\Models\\User.php")), "app/Models/User.php");
/// assert_eq!(normalize_display_path(Path::new("./src/index.php")), "src/index.php");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|exclude| match exclude.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => name.ends_with(suffix),
        _ => name == exclude,
    })
}

/// Validates that a file about to be written does not escape `root`
/// (the current directory when `None`).
///
/// The longest existing ancestor is canonicalized to resolve symlinks; the
/// part that does not exist yet must not contain `..`.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, the path leaves the root,
/// or the non-existent portion contains `..`.
pub fn validate_output_path(path: &Path, root: Option<&Path>) -> anyhow::Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    let root_dir = root.unwrap_or(&current_dir);
    let canonical_root = root_dir.canonicalize().map_err(|e| {
        anyhow::anyhow!(
            "Failed to canonicalize root directory {}: {}",
            root_dir.display(),
            e
        )
    })?;

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        canonical_root.join(path)
    };

    let mut ancestor = absolute_path.as_path();
    while !ancestor.exists() {
        match ancestor.parent() {
            Some(p) => ancestor = p,
            None => break,
        }
    }

    let canonical_ancestor = ancestor.canonicalize().map_err(|e| {
        anyhow::anyhow!(
            "Failed to canonicalize ancestor path {}: {}",
            ancestor.display(),
            e
        )
    })?;

    if !canonical_ancestor.starts_with(&canonical_root) {
        anyhow::bail!(
            "Refusing to write '{}': outside of '{}'",
            normalize_display_path(&canonical_ancestor),
            normalize_display_path(&canonical_root)
        );
    }

    if let Ok(remainder) = absolute_path.strip_prefix(ancestor) {
        if remainder
            .components()
            .any(|component| component == Component::ParentDir)
        {
            anyhow::bail!(
                "Security Error: Path contains '..' in non-existent portion: '{}'",
                path.display()
            );
        }
    }

    Ok(absolute_path)
}

/// Collects PHP source files under `root` with gitignore support.
///
/// Default exclusions (`vendor`, `node_modules`, ...) are merged with
/// `exclude`; folders listed in `include` are walked even when excluded.
/// Only files whose extension is listed in `extensions` are returned.
///
/// Returns the files found (sorted) and the number of directories walked.
#[must_use]
pub fn collect_php_files(
    root: &Path,
    exclude: &[String],
    include: &[String],
    extensions: &[String],
    verbose: bool,
) -> (Vec<PathBuf>, usize) {
    use ignore::WalkBuilder;

    let mut all_excludes: Vec<String> = exclude
        .iter()
        .cloned()
        .chain(DEFAULT_EXCLUDE_FOLDERS().iter().map(|&s| s.to_owned()))
        .collect();
    all_excludes.retain(|ex| !include.iter().any(|inc| ex == inc));

    let root_for_filter = root.to_path_buf();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !is_excluded(name, &all_excludes))
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }
                let wanted = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
                if wanted {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => {
                if verbose {
                    eprintln!("Walk error: {e}");
                }
            }
        }
    }

    files.sort();
    (files, dir_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn php() -> Vec<String> {
        vec!["php".to_owned()]
    }

    #[test]
    fn test_is_excluded_patterns() {
        let excludes = vec!["legacy".to_owned(), "*.blade.php".to_owned()];
        assert!(is_excluded("legacy", &excludes));
        assert!(is_excluded("welcome.blade.php", &excludes));
        assert!(!is_excluded("legacy2", &excludes));
    }

    #[test]
    fn test_validate_output_path_with_root() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("src"))?;

        assert!(validate_output_path(Path::new("src/index.php"), Some(root)).is_ok());
        assert!(validate_output_path(Path::new("src/new/../x.php"), Some(root)).is_err());
        assert!(validate_output_path(Path::new("../outside.php"), Some(root)).is_err());

        Ok(())
    }

    #[test]
    fn test_collect_php_files_exclusion() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::write(root.join("index.php"), "<?php")?;
        fs::write(root.join("README.md"), "# readme")?;
        fs::create_dir_all(root.join("vendor/acme"))?;
        fs::write(root.join("vendor/acme/lib.php"), "<?php")?;
        fs::create_dir_all(root.join("app/Models"))?;
        fs::write(root.join("app/Models/User.php"), "<?php")?;

        let (files, dirs) = collect_php_files(root, &[], &[], &php(), false);

        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|f| f.to_str())
            .collect();
        assert_eq!(names, vec!["User.php", "index.php"]);
        assert_eq!(dirs, 2);

        Ok(())
    }

    #[test]
    fn test_collect_php_files_force_include() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::create_dir_all(root.join("vendor"))?;
        fs::write(root.join("vendor/patched.php"), "<?php")?;

        let (files, _) = collect_php_files(root, &[], &["vendor".to_owned()], &php(), false);
        assert_eq!(files.len(), 1);

        Ok(())
    }

    #[test]
    fn test_collect_php_files_extra_extensions() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::write(root.join("a.php"), "<?php")?;
        fs::write(root.join("b.inc"), "<?php")?;
        fs::write(root.join("c.PHP"), "<?php")?;

        let extensions = vec!["php".to_owned(), "inc".to_owned()];
        let (files, _) = collect_php_files(root, &["legacy".to_owned()], &[], &extensions, false);
        assert_eq!(files.len(), 3);

        Ok(())
    }
}

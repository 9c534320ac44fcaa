use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::constants::{COMPOSER_FILENAME, CONFIG_FILENAME};

/// Default `.collector.toml` written by `collector init`.
const DEFAULT_CONFIG: &str = r#"
[collector]
# Path filters (vendor, node_modules, storage, ... are always excluded)
exclude_folders = ["build", "dist"]
include_folders = []       # Force-include these folders even if excluded by default

# File extensions to scan
extensions = ["php"]

# CI/CD
fail_on_problems = false   # Exit 1 if any foreach can be refactored
"#;

/// Executes the init command in the current directory.
///
/// # Errors
///
/// Returns an error if the current directory is unavailable or writing fails.
pub fn run_init<W: Write>(writer: &mut W) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    run_init_in(&current_dir, writer)
}

/// Executes the init command in a specific directory.
///
/// # Errors
///
/// Returns an error if reading an existing manifest or writing the config fails.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing Collector configuration...")?;

    let config_path = root.join(CONFIG_FILENAME);
    if config_path.exists() {
        writeln!(writer, "  • {CONFIG_FILENAME} already exists - skipping.")?;
        return Ok(());
    }

    let composer_path = root.join(COMPOSER_FILENAME);
    if composer_path.exists() {
        let content = fs::read_to_string(&composer_path)
            .with_context(|| format!("Failed to read {COMPOSER_FILENAME}"))?;
        let has_section = serde_json::from_str::<serde_json::Value>(&content)
            .ok()
            .and_then(|manifest| manifest.pointer("/extra/collector").cloned())
            .is_some();
        if has_section {
            writeln!(
                writer,
                "  • {COMPOSER_FILENAME} already contains extra.collector - skipping."
            )?;
            return Ok(());
        }
    }

    let mut file = fs::File::create(&config_path)
        .with_context(|| format!("Failed to create {CONFIG_FILENAME}"))?;
    writeln!(file, "{}", DEFAULT_CONFIG.trim())?;
    writeln!(
        writer,
        "  • Created {CONFIG_FILENAME} with default configuration."
    )?;

    writeln!(writer, "Initialization complete!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        run_init_in(dir.path(), &mut out).unwrap();

        assert!(dir.path().join(CONFIG_FILENAME).exists());
        let config = Config::load_from_path(dir.path());
        assert_eq!(config.collector.fail_on_problems, Some(false));
        assert_eq!(config.collector.extensions(), vec!["php"]);
        assert!(String::from_utf8(out).unwrap().contains("Created"));
    }

    #[test]
    fn test_init_skips_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[collector]\n").unwrap();

        let mut out = Vec::new();
        run_init_in(dir.path(), &mut out).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap(),
            "[collector]\n"
        );
        assert!(String::from_utf8(out).unwrap().contains("already exists"));
    }

    #[test]
    fn test_init_respects_composer_section() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(COMPOSER_FILENAME),
            r#"{"extra": {"collector": {}}}"#,
        )
        .unwrap();

        let mut out = Vec::new();
        run_init_in(dir.path(), &mut out).unwrap();
        assert!(!dir.path().join(CONFIG_FILENAME).exists());
    }

    #[test]
    fn test_init_ignores_unrelated_composer() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(COMPOSER_FILENAME), r#"{"name": "acme/app"}"#).unwrap();

        let mut out = Vec::new();
        run_init_in(dir.path(), &mut out).unwrap();
        assert!(dir.path().join(CONFIG_FILENAME).exists());
    }
}

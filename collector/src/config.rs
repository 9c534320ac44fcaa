use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{COMPOSER_FILENAME, CONFIG_FILENAME, DEFAULT_EXTENSIONS};

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section for Collector.
    pub collector: CollectorConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options for Collector.
pub struct CollectorConfig {
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to include even when excluded by default.
    pub include_folders: Option<Vec<String>>,
    /// File extensions to scan (without the dot).
    pub extensions: Option<Vec<String>>,
    /// Exit with code 1 when fixable loops are reported.
    pub fail_on_problems: Option<bool>,
}

impl CollectorConfig {
    /// Extensions to scan, falling back to the defaults.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.clone().unwrap_or_else(|| {
            DEFAULT_EXTENSIONS
                .iter()
                .map(|&ext| ext.to_owned())
                .collect()
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
struct ComposerJson {
    #[serde(default)]
    extra: ComposerExtra,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct ComposerExtra {
    collector: Option<CollectorConfig>,
}

impl Config {
    /// Loads configuration starting from a specific path and traversing up.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            // 1. Try CONFIG_FILENAME
            let collector_toml = current.join(CONFIG_FILENAME);
            if collector_toml.exists() {
                if let Ok(content) = fs::read_to_string(&collector_toml) {
                    if let Ok(mut config) = toml::from_str::<Config>(&content) {
                        config.config_file_path = Some(collector_toml);
                        return config;
                    }
                }
            }

            // 2. Try the composer manifest
            let composer_json = current.join(COMPOSER_FILENAME);
            if composer_json.exists() {
                if let Ok(content) = fs::read_to_string(&composer_json) {
                    if let Ok(ComposerJson {
                        extra:
                            ComposerExtra {
                                collector: Some(collector),
                            },
                    }) = serde_json::from_str::<ComposerJson>(&content)
                    {
                        return Config {
                            collector,
                            config_file_path: Some(composer_json),
                        };
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}

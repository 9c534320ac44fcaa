use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Name of the dedicated configuration file.
pub const CONFIG_FILENAME: &str = ".collector.toml";

/// Composer manifest, read for an `extra.collector` section.
pub const COMPOSER_FILENAME: &str = "composer.json";

/// File extensions scanned when the configuration does not list any.
pub const DEFAULT_EXTENSIONS: &[&str] = &["php"];

/// Identifier used in `@noinspection` suppression comments.
pub const INSPECTION_ID: &str = "ForeachToCollection";

/// Regex matching a suppression marker on a source line.
///
/// Both `/** @noinspection ForeachToCollection */` (also matching the
/// `...Inspection` suffix) and `// collector-ignore` are recognised.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_suppression_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)@noinspection\s+{INSPECTION_ID}|collector-ignore"))
            .expect("Invalid suppression regex pattern")
    })
}

/// Set of folders to exclude by default.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert(".git");
        s.insert(".idea");
        s.insert("vendor");
        s.insert("node_modules");
        s.insert("storage");
        s.insert("cache");
        s.insert(".phpunit.cache");
        s
    })
}

pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
pub use get_suppression_re as SUPPRESSION_RE;

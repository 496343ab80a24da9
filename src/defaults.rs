//! Default values for mbutane configuration.
//!
//! This module provides centralized default values for the working
//! directory layout, the storage scanner, the allowed path policy and the
//! translator, ensuring consistency between the library and the CLI.

use std::time::Duration;

/// The main config fragment, relative to the working directory.
pub const MAIN_CONFIG: &str = "config.bu";

/// Directory holding the merge fragments.
pub const MERGE_CONFIG_DIR: &str = "config.bu.d";

/// File extension of merge fragments.
pub const FRAGMENT_EXTENSION: &str = "bu";

/// Directory holding the storage trees, one per fragment.
pub const STORAGE_ROOT: &str = "src";

/// Storage tree name of the main fragment.
pub const MAIN_STORAGE: &str = "main";

/// File the translator output is written to.
pub const OUTPUT_FILE: &str = "config.ign";

/// Name of the per-directory override fragments inside storage trees.
pub const OVERRIDE_FILE_NAME: &str = "subconfig.bu";

/// Virtual path of the generated result file.
pub const RESULT_FILE_PATH: &str = "/etc/mbutane.json";

/// Default translator executable.
pub const TRANSLATOR: &str = "butane";

/// Wall-clock limit for a translator run.
pub const TRANSLATOR_TIMEOUT: Duration = Duration::from_secs(300);

/// Mode recorded for executable files found in a storage tree.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Mode of the generated result file.
pub const RESULT_FILE_MODE: u32 = 0o644;

/// Patterns of storage tree paths that never become storage entries.
///
/// Top-level directories and the direct children of `/usr` and `/var`
/// already exist on the target system.
pub fn ignore_patterns() -> Vec<String> {
    ["/*", "/usr/*", "/var/*", ".gitignore", ".gitkeep", "*~", "*.swp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Directory names that are skipped together with everything below them.
pub fn skip_dirs() -> Vec<String> {
    [".git", ".svn", ".hg"].iter().map(|s| s.to_string()).collect()
}

/// Path prefixes storage entries may be written below.
pub fn allowed_prefixes() -> Vec<String> {
    [
        "/etc",
        "/home",
        "/opt",
        "/root",
        "/srv",
        "/usr/local",
        "/var",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Patterns of paths no fragment may declare.
pub fn forbidden_patterns() -> Vec<String> {
    vec![RESULT_FILE_PATH.to_string()]
}

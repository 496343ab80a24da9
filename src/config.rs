//! # Composition Configuration
//!
//! This module defines the settings of a composition run. Ignore sets,
//! allowed paths and the result file are configured here and handed to each
//! stage at construction time.
//!
//! ## Key Components
//!
//! - **`ComposeConfig`**: the working directory plus all stage settings.
//! - **`ScannerConfig`**: how storage trees are turned into entries.
//! - **`PolicyConfig`**: the allowed prefixes and forbidden patterns that
//!   every storage path is validated against.
//!
//! All three implement `Default` using the values in [`crate::defaults`].

use std::path::{Path, PathBuf};

use crate::defaults;

/// Settings for the storage tree scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Name of the per-directory override fragments.
    pub override_file_name: String,
    /// Patterns of virtual paths to leave out. The override file name is
    /// always ignored in addition to these.
    pub ignore_patterns: Vec<String>,
    /// Directory names skipped together with their contents.
    pub skip_dirs: Vec<String>,
    /// Record `mode: 0755` for files with an execute bit set.
    pub record_executable: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            override_file_name: defaults::OVERRIDE_FILE_NAME.to_string(),
            ignore_patterns: defaults::ignore_patterns(),
            skip_dirs: defaults::skip_dirs(),
            record_executable: true,
        }
    }
}

impl ScannerConfig {
    /// Ignore patterns including the override file name.
    pub fn effective_ignore_patterns(&self) -> Vec<String> {
        let mut patterns = self.ignore_patterns.clone();
        if !patterns.contains(&self.override_file_name) {
            patterns.push(self.override_file_name.clone());
        }
        patterns
    }
}

/// Settings for the allowed path policy.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Entries must be equal to or below one of these paths.
    pub allowed_prefixes: Vec<String>,
    /// Entries must not match any of these patterns.
    pub forbidden_patterns: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_prefixes: defaults::allowed_prefixes(),
            forbidden_patterns: defaults::forbidden_patterns(),
        }
    }
}

impl PolicyConfig {
    /// A policy allowing every absolute path.
    pub fn unrestricted() -> Self {
        Self {
            allowed_prefixes: vec!["/".to_string()],
            forbidden_patterns: Vec::new(),
        }
    }
}

/// Settings of one composition run.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Directory holding `config.bu`, `config.bu.d/` and `src/`.
    pub working_dir: PathBuf,
    /// Storage tree scanner settings.
    pub scanner: ScannerConfig,
    /// Allowed path policy settings.
    pub policy: PolicyConfig,
    /// Virtual path of the generated result file, `None` to disable it.
    pub result_file: Option<String>,
    /// Translator output file name, relative to the working directory.
    pub output_file: PathBuf,
}

impl ComposeConfig {
    /// Default settings for the given working directory.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            scanner: ScannerConfig::default(),
            policy: PolicyConfig::default(),
            result_file: Some(defaults::RESULT_FILE_PATH.to_string()),
            output_file: PathBuf::from(defaults::OUTPUT_FILE),
        }
    }

    /// Disable the generated result file.
    pub fn without_result_file(mut self) -> Self {
        self.result_file = None;
        self
    }

    /// Use a different override fragment file name.
    pub fn with_override_file_name(mut self, name: impl Into<String>) -> Self {
        self.scanner.override_file_name = name.into();
        self
    }

    /// Use a different allowed path policy.
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// Path of the main config fragment.
    pub fn main_config_path(&self) -> PathBuf {
        self.working_dir.join(defaults::MAIN_CONFIG)
    }

    /// Path of the merge fragment directory.
    pub fn merge_config_dir(&self) -> PathBuf {
        self.working_dir.join(defaults::MERGE_CONFIG_DIR)
    }

    /// Path of the storage tree named `name`.
    pub fn storage_dir(&self, name: &str) -> PathBuf {
        self.working_dir.join(defaults::STORAGE_ROOT).join(name)
    }

    /// Path the translator output is written to.
    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_file)
    }
}

//! # Error Handling
//!
//! This module defines the centralized error type for the `mbutane` library.
//! It uses the `thiserror` library to create a single `Error` enum covering
//! every failure mode of a composition run, with messages that name the
//! offending file, key path or virtual path.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum representing all errors. The variants fall
//!   into four groups:
//!   - input errors (missing or malformed fragments and storage trees),
//!   - structural conflicts found while merging or deduplicating,
//!   - policy violations for paths that may not be written,
//!   - external translator failures.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every error is fatal for a run: nothing is written and the translator is
//! never fed a partially composed document.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for mbutane operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required input path does not exist.
    #[error("No such file or directory: {}", path.display())]
    NotFound { path: PathBuf },

    /// A storage tree path exists but is not a directory.
    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// A config fragment path exists but is not a regular file.
    #[error("Is a directory: {}", path.display())]
    NotAFile { path: PathBuf },

    /// A config fragment parsed, but its top level is not a mapping.
    #[error("Invalid config fragment {}: {message}", path.display())]
    InvalidFragment { path: PathBuf, message: String },

    /// Two fragments disagree on the type of a value.
    ///
    /// `path` is the dotted key path at which the merge failed.
    #[error("Merge conflict at '{path}': cannot merge {right} into {left}")]
    MergeConflict {
        path: String,
        left: &'static str,
        right: &'static str,
    },

    /// A storage entry is malformed (not a mapping, or missing `path`).
    #[error("Invalid {section} entry: {message}")]
    InvalidEntry {
        section: &'static str,
        message: String,
    },

    /// A directory or link is declared twice with different attributes.
    #[error("Duplicate declaration of {section} entry '{path}'")]
    DuplicatePath { section: &'static str, path: String },

    /// A file is declared twice and the later declaration sets `contents`.
    #[error("Cannot overwrite already declared file '{path}'")]
    FileOverwrite { path: String },

    /// A file is declared twice with attributes that cannot be reconciled.
    #[error("Unable to merge duplicate file declaration of '{path}'")]
    FileMerge { path: String },

    /// A storage entry targets a path the policy forbids.
    #[error("Policy violation: {path} - {message}")]
    PolicyViolation { path: String, message: String },

    /// An invalid path pattern.
    #[error("Invalid path pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The translator executable could not be found.
    #[error("Translator not found: {program}")]
    TranslatorNotFound { program: String },

    /// The translator exited unsuccessfully.
    #[error("Translator {program} failed ({status}): {stderr}")]
    TranslatorFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The translator did not finish in time and was killed.
    #[error("Translator {program} timed out after {}s", timeout.as_secs())]
    TranslatorTimeout { program: String, timeout: Duration },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

//! # mbutane
//!
//! This library merges multiple human-readable Butane config fragments into
//! one document and hands it to `butane`, which translates it into a
//! machine-readable Ignition config. It is used by the `mbutane`
//! command-line tool but works on its own as well.
//!
//! ## Quick Example
//!
//! ```
//! use mbutane::document::parse;
//! use mbutane::merge::merge_documents;
//!
//! let main = parse("variant: fcos\nversion: 1.4.0\n").unwrap();
//! let users = parse("passwd:\n  users:\n    - name: core\n").unwrap();
//!
//! let merged = merge_documents(vec![main, users]).unwrap();
//! assert_eq!(merged["passwd"]["users"][0]["name"].as_str(), Some("core"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`document`, `merge`)**: insertion-ordered YAML mappings and
//!   the recursive merge that folds fragments together.
//! - **Storage trees (`storage`)**: directories on disk whose contents become
//!   `storage.directories`, `storage.files` and `storage.links` entries,
//!   patched by `subconfig.bu` override fragments.
//! - **Deduplication (`dedup`, `policy`)**: one entry per path, append-merging
//!   repeated files and rejecting paths outside the allowed policy.
//! - **Translation (`translator`)**: running `butane` with a timeout.
//!
//! ## Execution Flow
//!
//! The entry point is [`compose::run`]:
//!
//! 1.  **Discovery**: find `config.bu`, `config.bu.d/*.bu` and their storage
//!     trees below `src/`.
//! 2.  **Loading**: parse each fragment and attach its storage section.
//! 3.  **Merging**: fold all fragments in order.
//! 4.  **Deduplication**: collapse and validate storage entries.
//! 5.  **Result file**: record who composed the config and when.
//! 6.  **Translation**: pipe the document through `butane` and write
//!     `config.ign`.

pub mod compose;
pub mod config;
pub mod dedup;
pub mod defaults;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod fragment;
pub mod merge;
pub mod output;
pub mod path;
pub mod policy;
pub mod result_file;
pub mod storage;
pub mod translator;

#[cfg(test)]
mod compose_proptest;

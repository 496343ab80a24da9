//! Storage path deduplication
//!
//! After all fragments are merged, the `storage` lists hold every entry any
//! fragment declared, possibly several times for the same path. This module
//! reduces each list to one entry per path, keeping first-seen order:
//!
//! - directories and links may only be repeated verbatim.
//! - files may be repeated to append content: a later declaration without
//!   `contents` whose other fields equal the first declaration's has its
//!   `append` list added to the first declaration's.
//!
//! Each path is checked against the [`AllowedPathPolicy`] on the way.

use std::collections::HashMap;

use log::debug;
use serde_yaml::Value;

use crate::document::{key, type_name, Document};
use crate::error::{Error, Result};
use crate::policy::AllowedPathPolicy;
use crate::storage::{entry_path, EntryKind, PathEntry};

/// Collapses duplicate storage entries.
#[derive(Debug)]
pub struct Deduplicator<'a> {
    policy: &'a AllowedPathPolicy,
}

impl<'a> Deduplicator<'a> {
    /// Create a deduplicator validating paths against `policy`.
    pub fn new(policy: &'a AllowedPathPolicy) -> Self {
        Self { policy }
    }

    /// Deduplicate the storage lists of `document` in place.
    ///
    /// Empty lists are removed, and so is a `storage` mapping left empty.
    pub fn deduplicate(&self, document: &mut Document) -> Result<()> {
        let storage = match document.get_mut("storage") {
            None => return Ok(()),
            Some(Value::Mapping(storage)) => storage,
            Some(other) => {
                return Err(Error::InvalidEntry {
                    section: "storage",
                    message: format!("expected a mapping, found {}", type_name(other)),
                })
            }
        };

        for kind in EntryKind::ALL {
            let section = kind.section();
            let entries = match storage.get_mut(section) {
                None => continue,
                Some(Value::Null) => Vec::new(),
                Some(Value::Sequence(entries)) => std::mem::take(entries),
                Some(other) => {
                    return Err(Error::InvalidEntry {
                        section,
                        message: format!("expected a list, found {}", type_name(other)),
                    })
                }
            };

            let entries = into_entries(kind, entries)?;
            let unique = match kind {
                EntryKind::File => self.unique_files(entries)?,
                EntryKind::Directory | EntryKind::Link => self.unique_paths(kind, entries)?,
            };

            if unique.is_empty() {
                storage.shift_remove(section);
            } else {
                storage.insert(
                    key(section),
                    Value::Sequence(unique.into_iter().map(Value::Mapping).collect()),
                );
            }
        }

        if storage.is_empty() {
            document.shift_remove("storage");
        }
        Ok(())
    }

    /// Deduplicate directory or link entries.
    ///
    /// A repeated path must be declared identically.
    pub fn unique_paths(&self, kind: EntryKind, entries: Vec<PathEntry>) -> Result<Vec<PathEntry>> {
        let mut known: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<PathEntry> = Vec::new();

        for entry in entries {
            let path = self.checked_path(kind, &entry)?;
            match known.get(&path) {
                None => {
                    known.insert(path, unique.len());
                    unique.push(entry);
                }
                Some(&index) => {
                    if unique[index] != entry {
                        return Err(Error::DuplicatePath {
                            section: kind.section(),
                            path,
                        });
                    }
                    debug!("Dropping repeated {} entry {}", kind.section(), path);
                }
            }
        }

        Ok(unique)
    }

    /// Deduplicate file entries, merging `append` lists of repeated files.
    pub fn unique_files(&self, entries: Vec<PathEntry>) -> Result<Vec<PathEntry>> {
        let mut known: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<PathEntry> = Vec::new();

        for mut entry in entries {
            let path = self.checked_path(EntryKind::File, &entry)?;
            let index = match known.get(&path) {
                None => {
                    known.insert(path, unique.len());
                    unique.push(entry);
                    continue;
                }
                Some(&index) => index,
            };

            let existing = &mut unique[index];
            if *existing == entry {
                continue;
            }
            if entry.contains_key("contents") {
                return Err(Error::FileOverwrite { path });
            }

            let appended = match entry.shift_remove("append") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Sequence(appended)) => appended,
                Some(other) => return Err(invalid_append(&path, &other)),
            };

            let mut declared = existing.clone();
            declared.shift_remove("contents");
            declared.shift_remove("append");
            if entry != declared {
                return Err(Error::FileMerge { path });
            }

            debug!("Appending {} fragment(s) to {}", appended.len(), path);
            match existing.get_mut("append") {
                Some(Value::Sequence(current)) => current.extend(appended),
                None | Some(Value::Null) => {
                    existing.insert(key("append"), Value::Sequence(appended));
                }
                Some(other) => return Err(invalid_append(&path, other)),
            }
        }

        Ok(unique)
    }

    fn checked_path(&self, kind: EntryKind, entry: &PathEntry) -> Result<String> {
        let path = entry_path(entry).ok_or_else(|| Error::InvalidEntry {
            section: kind.section(),
            message: "entry without a string 'path'".to_string(),
        })?;
        self.policy.check(path)?;
        Ok(path.to_string())
    }
}

fn into_entries(kind: EntryKind, values: Vec<Value>) -> Result<Vec<PathEntry>> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Mapping(entry) => Ok(entry),
            other => Err(Error::InvalidEntry {
                section: kind.section(),
                message: format!("expected a mapping, found {}", type_name(&other)),
            }),
        })
        .collect()
}

fn invalid_append(path: &str, value: &Value) -> Error {
    Error::InvalidEntry {
        section: "files",
        message: format!(
            "'append' of {} must be a list, found {}",
            path,
            type_name(value)
        ),
    }
}

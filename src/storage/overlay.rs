//! Override fragments
//!
//! A `subconfig.bu` placed in a storage tree patches the entries generated
//! for paths below its own directory. It holds optional `directories`,
//! `files` and `links` lists whose items carry a glob `path` plus the fields
//! to set:
//!
//! ```yaml
//! files:
//!   - path: "*.conf"
//!     mode: 0640
//!     user:
//!       name: app
//! ```
//!
//! The `path` is matched against each entry's path made relative to the
//! fragment's directory (see [`crate::path::PathPattern`]). Matching entries
//! get the remaining fields set, replacing fields they already have.

use std::path::Path;

use log::{debug, warn};
use serde_yaml::{Mapping, Value};

use super::{entry_path, EntryKind, PathEntry, StorageSection};
use crate::document::{self, type_name, Document};
use crate::error::{Error, Result};
use crate::path::{relative_to, PathPattern};

/// One override item: a path pattern and the fields to apply.
#[derive(Debug, Clone)]
pub struct OverlayDirective {
    pattern: PathPattern,
    fields: Mapping,
}

impl OverlayDirective {
    /// Build a directive from an override item, taking its `path` key as the
    /// pattern.
    pub fn from_mapping(kind: EntryKind, mut item: Mapping) -> Result<Self> {
        let pattern = match item.shift_remove("path") {
            Some(Value::String(pattern)) => pattern,
            Some(other) => {
                return Err(Error::InvalidEntry {
                    section: kind.section(),
                    message: format!("override path must be a string, found {}", type_name(&other)),
                })
            }
            None => {
                return Err(Error::InvalidEntry {
                    section: kind.section(),
                    message: "override item without 'path'".to_string(),
                })
            }
        };

        Ok(Self {
            pattern: PathPattern::new(&pattern)?,
            fields: item,
        })
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Fields set on matching entries.
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    /// Apply to every entry below `scope` whose scope-relative path matches.
    /// The scope directory itself is never patched by its own fragment.
    ///
    /// Returns the number of entries changed.
    pub fn apply(&self, entries: &mut [PathEntry], scope: &str) -> usize {
        let mut matched = 0;
        for entry in entries.iter_mut() {
            let is_match = entry_path(entry)
                .and_then(|path| relative_to(path, scope))
                .is_some_and(|relative| self.pattern.matches(&format!("/{}", relative)));
            if !is_match {
                continue;
            }

            for (key, value) in &self.fields {
                entry.insert(key.clone(), value.clone());
            }
            matched += 1;
        }
        matched
    }
}

/// The directives of one override fragment, bound to its directory.
#[derive(Debug, Clone)]
pub struct OverrideFragment {
    scope: String,
    directives: Vec<(EntryKind, OverlayDirective)>,
}

impl OverrideFragment {
    /// Load the fragment at `path`. `scope` is the virtual path of the
    /// directory holding it.
    pub fn load(path: &Path, scope: impl Into<String>) -> Result<Self> {
        let document = document::load(path)?;
        Self::from_document(document, scope).map_err(|err| match err {
            Error::InvalidEntry { section, message } => Error::InvalidEntry {
                section,
                message: format!("{} ({})", message, path.display()),
            },
            other => other,
        })
    }

    /// Build a fragment from a parsed document.
    pub fn from_document(mut document: Document, scope: impl Into<String>) -> Result<Self> {
        let mut directives = Vec::new();

        for kind in EntryKind::ALL {
            let items = match document.shift_remove(kind.section()) {
                None | Some(Value::Null) => continue,
                Some(Value::Sequence(items)) => items,
                Some(other) => {
                    return Err(Error::InvalidEntry {
                        section: kind.section(),
                        message: format!("expected a list of overrides, found {}", type_name(&other)),
                    })
                }
            };

            for item in items {
                match item {
                    Value::Mapping(item) => {
                        directives.push((kind, OverlayDirective::from_mapping(kind, item)?));
                    }
                    other => {
                        return Err(Error::InvalidEntry {
                            section: kind.section(),
                            message: format!("override item must be a mapping, found {}", type_name(&other)),
                        })
                    }
                }
            }
        }

        for unknown in document.keys() {
            warn!("Ignoring unknown override key {:?}", unknown);
        }

        Ok(Self {
            scope: scope.into(),
            directives,
        })
    }

    /// Virtual path of the directory the fragment applies to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Whether the fragment holds no directives.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Apply all directives in order, consuming the fragment.
    ///
    /// Returns the number of entry updates made.
    pub fn apply(self, storage: &mut StorageSection) -> usize {
        let mut updates = 0;
        for (kind, directive) in self.directives {
            let matched = directive.apply(storage.entries_mut(kind), &self.scope);
            if matched == 0 {
                debug!(
                    "Override '{}' in {} matched no {}",
                    directive.pattern(),
                    self.scope,
                    kind.section()
                );
            }
            updates += matched;
        }
        updates
    }
}

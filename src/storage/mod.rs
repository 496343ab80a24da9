//! # Storage Sections
//!
//! A Butane `storage` section lists the directories, files and symlinks to
//! create on the target system. This module builds such sections from
//! storage trees on disk:
//!
//! 1.  **Scanning** ([`scanner`]): every path below a storage tree becomes a
//!     directory, file or link entry whose `path` is the tree-relative path
//!     rooted at `/`.
//! 2.  **Overlaying** ([`overlay`]): `subconfig.bu` fragments placed anywhere
//!     in the tree patch the generated entries below their own directory,
//!     selecting entries with glob patterns.
//! 3.  **Assembling** ([`assembler`]): drives both steps for one tree and
//!     attaches the result to the owning config fragment.

use serde_yaml::{Mapping, Value};

use crate::document::{key, Document};

pub mod assembler;
pub mod overlay;
pub mod scanner;

pub use assembler::StorageAssembler;
pub use overlay::{OverlayDirective, OverrideFragment};
pub use scanner::Scanner;

/// A single storage entry, e.g. `{path: /etc/motd, contents: {...}}`.
///
/// Entries stay plain mappings so that any Butane field a fragment sets
/// survives composition untouched.
pub type PathEntry = Mapping;

/// The three entry lists of a storage section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
    Link,
}

impl EntryKind {
    /// All kinds, in the order their lists appear in a storage section.
    pub const ALL: [EntryKind; 3] = [EntryKind::Directory, EntryKind::File, EntryKind::Link];

    /// Key of the list holding entries of this kind.
    pub fn section(self) -> &'static str {
        match self {
            EntryKind::Directory => "directories",
            EntryKind::File => "files",
            EntryKind::Link => "links",
        }
    }
}

/// Create an entry holding only a `path`.
pub fn new_entry(path: &str) -> PathEntry {
    let mut entry = PathEntry::new();
    entry.insert(key("path"), Value::String(path.to_string()));
    entry
}

/// The `path` of an entry, if it has a string one.
pub fn entry_path(entry: &PathEntry) -> Option<&str> {
    entry.get("path").and_then(Value::as_str)
}

/// Directory, file and link entries of one storage section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageSection {
    pub directories: Vec<PathEntry>,
    pub files: Vec<PathEntry>,
    pub links: Vec<PathEntry>,
}

impl StorageSection {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of the given kind.
    pub fn entries(&self, kind: EntryKind) -> &[PathEntry] {
        match kind {
            EntryKind::Directory => &self.directories,
            EntryKind::File => &self.files,
            EntryKind::Link => &self.links,
        }
    }

    /// Mutable entries of the given kind.
    pub fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<PathEntry> {
        match kind {
            EntryKind::Directory => &mut self.directories,
            EntryKind::File => &mut self.files,
            EntryKind::Link => &mut self.links,
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len() + self.links.len()
    }

    /// Whether the section holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a `{directories, files, links}` document. All three keys
    /// are present, even for empty lists.
    pub fn into_document(self) -> Document {
        let mut document = Document::new();
        for (kind, entries) in [
            (EntryKind::Directory, self.directories),
            (EntryKind::File, self.files),
            (EntryKind::Link, self.links),
        ] {
            document.insert(
                key(kind.section()),
                Value::Sequence(entries.into_iter().map(Value::Mapping).collect()),
            );
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_path() {
        let entry = new_entry("/etc/motd");
        assert_eq!(entry_path(&entry), Some("/etc/motd"));
        assert_eq!(entry_path(&PathEntry::new()), None);
    }

    #[test]
    fn test_into_document_has_all_sections() {
        let mut section = StorageSection::new();
        section.files.push(new_entry("/etc/motd"));
        let document = section.into_document();

        let keys: Vec<_> = document.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["directories", "files", "links"]);
        assert_eq!(document["files"].as_sequence().unwrap().len(), 1);
        assert!(document["links"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_entries_by_kind() {
        let mut section = StorageSection::new();
        section
            .entries_mut(EntryKind::Link)
            .push(new_entry("/etc/localtime"));
        assert_eq!(section.entries(EntryKind::Link).len(), 1);
        assert_eq!(section.len(), 1);
        assert!(section.entries(EntryKind::File).is_empty());
    }
}

//! Storage tree scanning
//!
//! Walks a storage tree and turns every path into a storage entry:
//!
//! - symlinks become `links` entries with their `target`,
//! - regular files become `files` entries. Non-empty files reference their
//!   bytes with `contents: {local: ...}`; executables get `mode: 0755`,
//! - directories become `directories` entries.
//!
//! Paths are visited in lexicographic order of their full path string, so
//! `/etc/a.conf` comes before `/etc/a/b`. Symlinks are never followed.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_yaml::{Mapping, Value};
use walkdir::{DirEntry, WalkDir};

use super::{new_entry, StorageSection};
use crate::config::ScannerConfig;
use crate::defaults;
use crate::document::key;
use crate::error::{Error, Result};
use crate::path::{compile_patterns, virtual_path, PathPattern};

/// Scanner for one storage tree.
#[derive(Debug)]
pub struct Scanner {
    base: PathBuf,
    files_root: Option<PathBuf>,
    override_file_name: String,
    ignore: Vec<PathPattern>,
    skip_dirs: Vec<String>,
    record_executable: bool,
}

impl Scanner {
    /// Create a scanner for the tree at `base`.
    ///
    /// Fails if `base` does not exist or is not a directory, or if an ignore
    /// pattern is invalid.
    pub fn new(base: &Path, config: &ScannerConfig) -> Result<Self> {
        if !base.exists() {
            return Err(Error::NotFound {
                path: base.to_path_buf(),
            });
        }
        if !base.is_dir() {
            return Err(Error::NotADirectory {
                path: base.to_path_buf(),
            });
        }

        Ok(Self {
            base: base.to_path_buf(),
            files_root: None,
            override_file_name: config.override_file_name.clone(),
            ignore: compile_patterns(&config.effective_ignore_patterns())?,
            skip_dirs: config.skip_dirs.clone(),
            record_executable: config.record_executable,
        })
    }

    /// Make `contents.local` references relative to `root`, the directory the
    /// translator resolves local files against.
    pub fn with_files_root(mut self, root: &Path) -> Self {
        self.files_root = Some(root.to_path_buf());
        self
    }

    /// Scan the tree into directory, file and link entries.
    pub fn scan(&self) -> Result<StorageSection> {
        let mut storage = StorageSection::new();

        for entry in self.walk()? {
            let path = entry.path();
            let virtual_path = virtual_path(&self.base, path)?;
            if let Some(pattern) = self.ignore.iter().find(|p| p.matches(&virtual_path)) {
                debug!("Ignoring {} (matches '{}')", virtual_path, pattern.as_str());
                continue;
            }

            let mut config = new_entry(&virtual_path);
            let file_type = entry.file_type();

            if file_type.is_symlink() {
                let target = fs::read_link(path)?;
                let target = target.to_str().ok_or_else(|| Error::Path {
                    message: format!("Link target is not valid UTF-8: {}", path.display()),
                })?;
                config.insert(key("target"), Value::String(target.to_string()));
                storage.links.push(config);
            } else if file_type.is_file() {
                let metadata = entry.metadata()?;
                if metadata.len() > 0 {
                    let mut contents = Mapping::new();
                    contents.insert(key("local"), Value::String(self.local_reference(path)?));
                    config.insert(key("contents"), Value::Mapping(contents));
                }
                if self.record_executable && is_executable(&metadata) {
                    config.insert(key("mode"), Value::Number(defaults::EXECUTABLE_MODE.into()));
                }
                storage.files.push(config);
            } else if file_type.is_dir() {
                storage.directories.push(config);
            } else {
                debug!("Skipping special file {}", path.display());
            }
        }

        debug!(
            "Scanned {}: {} directories, {} files, {} links",
            self.base.display(),
            storage.directories.len(),
            storage.files.len(),
            storage.links.len()
        );
        Ok(storage)
    }

    /// Find the override fragments in the tree, in lexicographic path order.
    pub fn override_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .walk()?
            .into_iter()
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry.file_name().to_str() == Some(self.override_file_name.as_str())
            })
            .map(DirEntry::into_path)
            .collect())
    }

    /// All paths below the base, sorted by their full path string.
    fn walk(&self) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.base)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.is_skipped_dir(e))
        {
            entries.push(entry?);
        }
        entries.sort_by(|a, b| a.path().as_os_str().cmp(b.path().as_os_str()));
        Ok(entries)
    }

    fn is_skipped_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.skip_dirs.iter().any(|skip| skip == name))
    }

    fn local_reference(&self, path: &Path) -> Result<String> {
        let reference = match &self.files_root {
            Some(root) => path.strip_prefix(root).unwrap_or(path),
            None => path,
        };
        reference
            .to_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Path {
                message: format!("Path is not valid UTF-8: {}", path.display()),
            })
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

//! # Config Fragments
//!
//! A working directory contributes one main fragment and any number of merge
//! fragments:
//!
//! ```text
//! config.bu                  main fragment (required)
//! config.bu.d/10-users.bu    merge fragments, applied in file name order
//! src/main/                  storage tree of the main fragment
//! src/10-users/              storage tree of config.bu.d/10-users.bu
//! ```
//!
//! Loading a fragment parses its document and, when it has a storage tree,
//! merges the assembled `storage` section into it.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::ComposeConfig;
use crate::defaults;
use crate::document::{self, Document};
use crate::error::{Error, Result};
use crate::storage::assembler::attach_storage;
use crate::storage::StorageAssembler;

/// One config file plus its optional storage tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFragment {
    /// Fragment name: `main` or the merge fragment's file stem.
    pub name: String,
    /// Path of the config file.
    pub path: PathBuf,
    /// Path of the storage tree, if one exists.
    pub storage_dir: Option<PathBuf>,
}

impl ConfigFragment {
    /// Load the fragment's document, including its storage section.
    pub fn load(&self, assembler: &StorageAssembler) -> Result<Document> {
        let mut document = document::load(&self.path)?;
        debug!("Loaded {} ({} keys)", self.path.display(), document.len());

        if let Some(storage_dir) = &self.storage_dir {
            let storage = assembler.assemble(storage_dir)?;
            attach_storage(&mut document, storage)?;
        }
        Ok(document)
    }
}

/// Find the main fragment and all merge fragments, in merge order.
pub fn discover(config: &ComposeConfig) -> Result<Vec<ConfigFragment>> {
    let main_path = config.main_config_path();
    if !main_path.exists() {
        return Err(Error::NotFound { path: main_path });
    }

    let mut fragments = vec![ConfigFragment {
        name: defaults::MAIN_STORAGE.to_string(),
        path: main_path,
        storage_dir: existing(config.storage_dir(defaults::MAIN_STORAGE)),
    }];

    for path in merge_fragment_paths(&config.merge_config_dir())? {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::Path {
                message: format!("Invalid fragment file name: {}", path.display()),
            })?
            .to_string();
        let storage_dir = existing(config.storage_dir(&name));
        fragments.push(ConfigFragment {
            name,
            path,
            storage_dir,
        });
    }

    info!("Found {} config fragment(s)", fragments.len());
    Ok(fragments)
}

/// `*.bu` files in `dir`, sorted by path. A missing directory has none.
fn merge_fragment_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_fragment = path
            .extension()
            .is_some_and(|ext| ext == defaults::FRAGMENT_EXTENSION);
        if is_fragment && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(paths)
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(base: &Path, path: &str, content: &str) {
        let full = base.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_discover_requires_main_config() {
        let temp = TempDir::new().unwrap();
        let err = discover(&ComposeConfig::new(temp.path())).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.to_string().contains("config.bu"));
    }

    #[test]
    fn test_discover_orders_merge_fragments() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "config.bu", "variant: fcos\n");
        write(temp.path(), "config.bu.d/20-b.bu", "");
        write(temp.path(), "config.bu.d/10-a.bu", "");
        write(temp.path(), "config.bu.d/notes.txt", "");
        fs::create_dir_all(temp.path().join("src/10-a")).unwrap();

        let fragments = discover(&ComposeConfig::new(temp.path())).unwrap();
        let names: Vec<_> = fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "10-a", "20-b"]);

        assert!(fragments[0].storage_dir.is_none());
        assert_eq!(
            fragments[1].storage_dir.as_deref(),
            Some(temp.path().join("src/10-a").as_path())
        );
        assert!(fragments[2].storage_dir.is_none());
    }

    #[test]
    fn test_load_attaches_storage() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "config.bu", "variant: fcos\n");
        write(temp.path(), "src/main/etc/motd", "hello\n");

        let config = ComposeConfig::new(temp.path());
        let fragments = discover(&config).unwrap();
        let assembler =
            StorageAssembler::new(config.scanner.clone()).with_files_root(temp.path());
        let document = fragments[0].load(&assembler).unwrap();

        let files = document["storage"]["files"].as_sequence().unwrap();
        assert_eq!(files[0]["path"].as_str(), Some("/etc/motd"));
        assert_eq!(
            files[0]["contents"]["local"].as_str(),
            Some("src/main/etc/motd")
        );
    }

    #[test]
    fn test_load_storage_path_not_a_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "config.bu", "variant: fcos\n");
        write(temp.path(), "src/main", "not a directory");

        let config = ComposeConfig::new(temp.path());
        let fragments = discover(&config).unwrap();
        let err = fragments[0]
            .load(&StorageAssembler::new(config.scanner.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }
}

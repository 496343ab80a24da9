//! Storage section assembly
//!
//! Builds the complete `storage` section for one storage tree: scan the tree,
//! then apply every override fragment found in it, in lexicographic path
//! order.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_yaml::Value;

use super::{OverrideFragment, Scanner, StorageSection};
use crate::config::ScannerConfig;
use crate::document::{key, Document};
use crate::error::{Error, Result};
use crate::merge::merge_into;
use crate::path::virtual_path;

/// Builds storage sections from storage trees.
#[derive(Debug, Clone)]
pub struct StorageAssembler {
    config: ScannerConfig,
    files_root: Option<PathBuf>,
}

impl StorageAssembler {
    /// Create an assembler using the given scanner settings.
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            files_root: None,
        }
    }

    /// Make local file references relative to `root`.
    pub fn with_files_root(mut self, root: &Path) -> Self {
        self.files_root = Some(root.to_path_buf());
        self
    }

    /// Scan the tree at `base` and apply its override fragments.
    pub fn assemble(&self, base: &Path) -> Result<StorageSection> {
        let mut scanner = Scanner::new(base, &self.config)?;
        if let Some(root) = &self.files_root {
            scanner = scanner.with_files_root(root);
        }

        let mut storage = scanner.scan()?;

        for override_path in scanner.override_files()? {
            let directory = override_path.parent().ok_or_else(|| Error::Path {
                message: format!("No parent directory: {}", override_path.display()),
            })?;
            let scope = virtual_path(base, directory)?;
            let fragment = OverrideFragment::load(&override_path, scope)?;
            let directives = fragment.len();
            let scope = fragment.scope().to_string();
            let updates = fragment.apply(&mut storage);
            debug!(
                "Applied {} to {} ({} directives, {} updates)",
                override_path.display(),
                scope,
                directives,
                updates
            );
        }

        info!(
            "Assembled storage from {}: {} entries",
            base.display(),
            storage.len()
        );
        Ok(storage)
    }
}

/// Merge `storage` into the `storage` key of `document`.
///
/// Entries declared in the document itself come before the generated ones.
pub fn attach_storage(document: &mut Document, storage: StorageSection) -> Result<()> {
    let mut wrapper = Document::new();
    wrapper.insert(key("storage"), Value::Mapping(storage.into_document()));
    merge_into(document, wrapper)
}

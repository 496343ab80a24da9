//! Result file generation
//!
//! Unless disabled, the composed document gets one extra file entry: a small
//! JSON record of who composed the configuration and when, written by the
//! translator to a fixed path on the target system.

use chrono::Local;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::defaults;
use crate::document::{key, type_name, Document};
use crate::error::{Error, Result};
use crate::storage::{new_entry, PathEntry};

/// Contents of the result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    /// Login name of the user running the composition.
    pub user: String,
    /// Composition time, RFC 3339.
    pub date: String,
}

impl ResultRecord {
    /// Record for the current user and time.
    pub fn current() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            user,
            date: Local::now().to_rfc3339(),
        }
    }

    /// Serialize as a single-line JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build the storage file entry writing this record to `path`.
    pub fn to_entry(&self, path: &str) -> Result<PathEntry> {
        let mut contents = Mapping::new();
        contents.insert(key("inline"), Value::String(self.to_json()?));

        let mut entry = new_entry(path);
        entry.insert(key("mode"), Value::Number(defaults::RESULT_FILE_MODE.into()));
        entry.insert(key("overwrite"), Value::Bool(true));
        entry.insert(key("contents"), Value::Mapping(contents));
        Ok(entry)
    }
}

/// Append the result file entry for `record` to `storage.files`.
pub fn inject(document: &mut Document, path: &str, record: &ResultRecord) -> Result<()> {
    let entry = record.to_entry(path)?;

    let storage = document
        .entry(key("storage"))
        .or_insert(Value::Mapping(Mapping::new()));
    let storage = match storage {
        Value::Mapping(storage) => storage,
        other => {
            return Err(Error::InvalidEntry {
                section: "storage",
                message: format!("expected a mapping, found {}", type_name(other)),
            })
        }
    };

    let files = storage
        .entry(key("files"))
        .or_insert(Value::Sequence(Vec::new()));
    match files {
        Value::Sequence(files) => {
            files.push(Value::Mapping(entry));
            Ok(())
        }
        other => Err(Error::InvalidEntry {
            section: "files",
            message: format!("expected a list, found {}", type_name(other)),
        }),
    }
}

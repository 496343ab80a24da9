//! Document merging
//!
//! Config fragments are folded into one document with a recursive
//! structural merge:
//!
//! - mapping into mapping merges key by key. Keys only present in the source
//!   are appended. When both sides carry a key and the source value is a
//!   mapping or a sequence, the merge recurses; otherwise the source value
//!   replaces the target value.
//! - sequence into sequence concatenates, source items after target items.
//! - every other combination is a merge conflict.
//!
//! Merging is keyed, so key order never changes the result; only sequence
//! order depends on fragment order.

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::document::{type_name, Document};
use crate::error::{Error, Result};

/// Fold `documents` into a single document, in order.
pub fn merge_documents<I>(documents: I) -> Result<Document>
where
    I: IntoIterator<Item = Document>,
{
    let mut merged = Document::new();
    for document in documents {
        merge_into(&mut merged, document)?;
    }
    Ok(merged)
}

/// Merge `source` into `target` at the document root.
pub fn merge_into(target: &mut Document, source: Document) -> Result<()> {
    merge_mappings(target, source, "")
}

/// Recursively merge `source` into `target`.
///
/// `path` is the dotted key path of `target`, used for error messages.
pub fn merge_values(target: &mut Value, source: Value, path: &str) -> Result<()> {
    match (target, source) {
        (Value::Mapping(target_map), Value::Mapping(source_map)) => {
            merge_mappings(target_map, source_map, path)
        }
        (Value::Sequence(target_seq), Value::Sequence(source_seq)) => {
            target_seq.extend(source_seq);
            Ok(())
        }
        (target, source) => Err(Error::MergeConflict {
            path: display_path(path),
            left: type_name(target),
            right: type_name(&source),
        }),
    }
}

fn merge_mappings(target: &mut Mapping, source: Mapping, path: &str) -> Result<()> {
    for (key, value) in source {
        let key_path = join_path(path, &key);
        match target.get_mut(&key) {
            Some(existing) if matches!(value, Value::Mapping(_) | Value::Sequence(_)) => {
                merge_values(existing, value, &key_path)?;
            }
            Some(existing) => {
                debug!(
                    "Overwriting value at '{}': {} -> {}",
                    key_path,
                    type_name(existing),
                    type_name(&value)
                );
                *existing = value;
            }
            None => {
                target.insert(key, value);
            }
        }
    }
    Ok(())
}

fn join_path(path: &str, key: &Value) -> String {
    let key = match key {
        Value::String(s) => s.clone(),
        other => format!("{:?}", other),
    };
    if path.is_empty() {
        key
    } else {
        format!("{}.{}", path, key)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

//! Ordered configuration documents
//!
//! Every config fragment, override fragment and the final composed document
//! is held as a [`Document`]: a YAML mapping that keeps keys in insertion
//! order. Values are the tagged union `serde_yaml::Value`, so merge code
//! matches exhaustively on mapping, sequence and scalar variants.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// An insertion-ordered YAML mapping.
pub type Document = Mapping;

/// Read and parse a YAML document from `path`.
///
/// An empty file (or one holding only comments) is an empty document. Any
/// other top-level value than a mapping is rejected.
pub fn load(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(Error::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    parse(&content).map_err(|err| match err {
        Error::InvalidFragment { message, .. } => Error::InvalidFragment {
            path: path.to_path_buf(),
            message,
        },
        Error::Yaml(err) => Error::InvalidFragment {
            path: path.to_path_buf(),
            message: err.to_string(),
        },
        other => other,
    })
}

/// Parse a YAML document from a string.
pub fn parse(content: &str) -> Result<Document> {
    if content.trim().is_empty() {
        return Ok(Document::new());
    }

    match serde_yaml::from_str::<Value>(content)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Document::new()),
        other => Err(Error::InvalidFragment {
            path: Default::default(),
            message: format!("expected a mapping at the top level, found {}", type_name(&other)),
        }),
    }
}

/// Serialize a document to YAML.
///
/// Key order is preserved and multi-line strings are written as literal
/// block scalars.
pub fn to_yaml_string(document: &Document) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Get a human-readable type name for a YAML value
///
/// Used in error messages to describe the type of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Sequence(_) => "Sequence",
        Value::Mapping(_) => "Mapping",
        Value::Tagged(_) => "Tagged",
    }
}

/// Build a string key.
pub fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

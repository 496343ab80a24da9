//! Virtual path utilities
//!
//! Storage entries are addressed by *virtual paths*: absolute,
//! `/`-separated paths as they will exist on the provisioned machine. This
//! module converts host paths into virtual paths and matches virtual paths
//! against glob patterns.
//!
//! Patterns are matched from the right, one path component at a time, the
//! way a file name pattern like `*.conf` is expected to behave no matter how
//! deep the file lives. A pattern with a leading `/` is anchored and must
//! match the whole path.

use std::path::{Component, Path};

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled glob pattern for virtual paths.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    anchored: bool,
    components: Vec<Pattern>,
}

impl PathPattern {
    /// Compile a pattern such as `*.conf`, `sub/*.conf` or `/usr/*`.
    pub fn new(pattern: &str) -> Result<Self> {
        let components = pattern
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .map(|part| {
                Pattern::new(part).map_err(|err| Error::Pattern {
                    pattern: pattern.to_string(),
                    message: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if components.is_empty() {
            return Err(Error::Pattern {
                pattern: pattern.to_string(),
                message: "empty pattern".to_string(),
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            anchored: pattern.starts_with('/'),
            components,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether a virtual path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

        if self.anchored {
            if !path.starts_with('/') || parts.len() != self.components.len() {
                return false;
            }
        } else if parts.len() < self.components.len() {
            return false;
        }

        self.components
            .iter()
            .rev()
            .zip(parts.iter().rev())
            .all(|(pattern, part)| pattern.matches_with(part, MATCH_OPTIONS))
    }
}

/// Compile a list of patterns.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathPattern>> {
    patterns
        .iter()
        .map(|pattern| PathPattern::new(pattern.as_ref()))
        .collect()
}

/// Build the virtual path of `path`: relative to `base`, rooted at `/`.
pub fn virtual_path(base: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| Error::Path {
        message: format!(
            "{} is not inside {}",
            path.display(),
            base.display()
        ),
    })?;

    let mut virtual_path = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::Path {
                    message: format!("Path is not valid UTF-8: {}", path.display()),
                })?;
                virtual_path.push('/');
                virtual_path.push_str(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::Path {
                    message: format!("Unexpected component in {}", path.display()),
                })
            }
        }
    }

    if virtual_path.is_empty() {
        virtual_path.push('/');
    }
    Ok(virtual_path)
}

/// Path of `path` relative to the directory `scope`, or `None` when `path`
/// is not `scope` itself or below it.
///
/// Both arguments are virtual paths. The result has no leading slash and is
/// empty when `path == scope`.
pub fn relative_to<'a>(path: &'a str, scope: &str) -> Option<&'a str> {
    let scope = scope.trim_end_matches('/');
    if scope.is_empty() {
        return Some(path.trim_start_matches('/'));
    }

    let rest = path.strip_prefix(scope)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// Whether `path` equals `prefix` or lives below it.
pub fn is_under(path: &str, prefix: &str) -> bool {
    relative_to(path, prefix).is_some()
}

//! Allowed path policy
//!
//! Every storage entry is validated before it is accepted into the composed
//! document: its path must be absolute and normalized, must not match a
//! forbidden pattern, and must be equal to or below an allowed prefix.

use crate::config::PolicyConfig;
use crate::error::{Error, Result};
use crate::path::{compile_patterns, is_under, PathPattern};

/// Compiled allowed path policy.
#[derive(Debug, Clone)]
pub struct AllowedPathPolicy {
    allowed_prefixes: Vec<String>,
    forbidden: Vec<PathPattern>,
}

impl AllowedPathPolicy {
    /// Compile a policy from its settings.
    pub fn new(config: &PolicyConfig) -> Result<Self> {
        Ok(Self {
            allowed_prefixes: config.allowed_prefixes.clone(),
            forbidden: compile_patterns(&config.forbidden_patterns)?,
        })
    }

    /// Check that `path` may be declared.
    pub fn check(&self, path: &str) -> Result<()> {
        if !path.starts_with('/') {
            return Err(self.violation(path, "path must be absolute".to_string()));
        }
        if path
            .split('/')
            .skip(1)
            .any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(self.violation(path, "path must be normalized".to_string()));
        }

        if let Some(pattern) = self.forbidden.iter().find(|p| p.matches(path)) {
            return Err(self.violation(
                path,
                format!("matches forbidden pattern '{}'", pattern.as_str()),
            ));
        }

        if !self
            .allowed_prefixes
            .iter()
            .any(|prefix| is_under(path, prefix))
        {
            return Err(self.violation(
                path,
                format!(
                    "not below any allowed prefix ({})",
                    self.allowed_prefixes.join(", ")
                ),
            ));
        }

        Ok(())
    }

    fn violation(&self, path: &str, message: String) -> Error {
        Error::PolicyViolation {
            path: path.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_policy() -> AllowedPathPolicy {
        AllowedPathPolicy::new(&PolicyConfig::default()).unwrap()
    }

    #[test]
    fn test_allowed_prefixes() {
        let policy = default_policy();
        assert!(policy.check("/etc/motd").is_ok());
        assert!(policy.check("/etc").is_ok());
        assert!(policy.check("/usr/local/bin/tool").is_ok());
        assert!(policy.check("/var/lib/app").is_ok());
    }

    #[test]
    fn test_outside_allowed_prefixes() {
        let policy = default_policy();
        let err = policy.check("/usr/bin/evil").unwrap_err();
        assert!(matches!(err, Error::PolicyViolation { .. }));
        assert!(err.to_string().contains("not below any allowed prefix"));
        assert!(policy.check("/boot/grub").is_err());
        assert!(policy.check("/etcetera").is_err());
    }

    #[test]
    fn test_result_file_forbidden() {
        let err = default_policy().check("/etc/mbutane.json").unwrap_err();
        assert!(err.to_string().contains("forbidden pattern"));
    }

    #[test]
    fn test_unnormalized_paths_rejected() {
        let policy = default_policy();
        assert!(policy.check("/etc/../usr/bin/evil").is_err());
        assert!(policy.check("/etc//motd").is_err());
        assert!(policy.check("/etc/./motd").is_err());
        assert!(policy.check("etc/motd").is_err());
    }

    #[test]
    fn test_custom_policy() {
        let policy = AllowedPathPolicy::new(&PolicyConfig {
            allowed_prefixes: vec!["/opt".to_string()],
            forbidden_patterns: vec!["*.key".to_string()],
        })
        .unwrap();
        assert!(policy.check("/opt/app/config").is_ok());
        assert!(policy.check("/opt/app/server.key").is_err());
        assert!(policy.check("/etc/motd").is_err());
    }

    #[test]
    fn test_unrestricted_policy() {
        let policy = AllowedPathPolicy::new(&PolicyConfig::unrestricted()).unwrap();
        assert!(policy.check("/usr/bin/anything").is_ok());
    }
}

//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_main_config(configs::MINIMAL)
//!         .with_file("src/main/etc/motd", "hello\n");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common config fragments for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal main fragment.
    pub const MINIMAL: &str = r#"variant: fcos
version: 1.4.0
"#;

    /// Merge fragment adding a user.
    pub const USERS: &str = r#"passwd:
  users:
    - name: core
      ssh_authorized_keys:
        - ssh-ed25519 AAAA core@example
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";

    /// Translator script echoing its input.
    pub const ECHO_TRANSLATOR: &str = "#!/bin/sh\ncat\n";

    /// Translator script rejecting every input.
    pub const FAILING_TRANSLATOR: &str =
        "#!/bin/sh\ncat > /dev/null\necho 'error: unsupported config' >&2\nexit 1\n";
}

/// A working directory for one composition run.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_main_config(configs::MINIMAL)
///     .with_translator(configs::ECHO_TRANSLATOR);
///
/// fixture.command().assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    translator: Option<PathBuf>,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            translator: None,
        }
    }

    /// Add `config.bu` with the given content.
    pub fn with_main_config(self, content: &str) -> Self {
        self.with_file("config.bu", content)
    }

    /// Add `config.bu.d/<name>.bu` with the given content.
    pub fn with_fragment(self, name: &str, content: &str) -> Self {
        self.with_file(&format!("config.bu.d/{}.bu", name), content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an empty directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Install an executable translator script at `bin/butane`.
    #[cfg(unix)]
    pub fn with_translator(mut self, script: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let path = self.temp_dir.path().join("bin").join("butane");
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create bin dir");
        std::fs::write(&path, script).expect("Failed to write translator");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make translator executable");
        self.translator = Some(path);
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.ign")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory, using the
    /// installed translator if there is one.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mbutane");
        cmd.current_dir(self.path())
            .env_remove("MBUTANE_BUTANE")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        if let Some(translator) = &self.translator {
            cmd.arg("--butane").arg(translator);
        }
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_main_config() {
        let fixture = TestFixture::new().with_main_config(configs::MINIMAL);
        assert!(fixture.path().join("config.bu").exists());
    }

    #[test]
    fn test_fixture_with_fragment() {
        let fixture = TestFixture::new().with_fragment("10-users", configs::USERS);
        assert!(fixture.path().join("config.bu.d/10-users.bu").exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::MINIMAL, configs::USERS] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}

//! # Terminal Output
//!
//! Status lines of the CLI go to stderr so that `--print` output on stdout
//! stays clean YAML. Whether they carry colour and symbols depends on the
//! `--color` flag and the environment:
//!
//! - `--color=always|never|auto`
//! - `NO_COLOR` disables colours when set (any value)
//! - `CLICOLOR=0` disables colours
//! - `CLICOLOR_FORCE=1` forces colours even without a TTY
//! - `TERM=dumb` disables colours
//!
//! ```rust,ignore
//! use mbutane::output::{OutputConfig, Status};
//!
//! let output = OutputConfig::from_env_and_flag("auto");
//! output.status(Status::Success, "Wrote config.ign");
//! ```

use std::env;

use console::{style, Term};

/// Output configuration for controlling colours and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colours and symbols should be used in output.
    pub use_color: bool,
    /// Suppress status lines.
    pub quiet: bool,
}

/// Kind of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl OutputConfig {
    /// Create an output configuration from the environment and the
    /// `--color` flag value (`always`, `never` or `auto`).
    ///
    /// `always` wins over `NO_COLOR`. In `auto` mode colours are disabled
    /// when `NO_COLOR` is set, `CLICOLOR=0`, `TERM=dumb`, or stderr is not a
    /// colour-capable terminal (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self {
            use_color,
            quiet: false,
        }
    }

    /// Suppress status lines.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn detect_color_support() -> bool {
        // https://no-color.org/: presence alone disables colours
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        Term::stderr().features().colors_supported()
    }

    /// Format a status line without printing it.
    pub fn format_status(&self, status: Status, message: &str) -> String {
        let (symbol, plain) = match status {
            Status::Success => ("✅", "[OK]"),
            Status::Failure => ("❌", "[FAILED]"),
        };
        let prefix = emoji(self, symbol, plain);

        if !self.use_color {
            return format!("{} {}", prefix, message);
        }
        match status {
            Status::Success => format!("{} {}", prefix, style(message).green()),
            Status::Failure => format!("{} {}", prefix, style(message).red().bold()),
        }
    }

    /// Print a status line to stderr unless quiet.
    pub fn status(&self, status: Status, message: &str) {
        if !self.quiet {
            eprintln!("{}", self.format_status(status, message));
        }
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self {
            use_color: true,
            quiet: false,
        }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self {
            use_color: false,
            quiet: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// `emoji_str` when colours are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

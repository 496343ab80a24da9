//! CLI argument parsing and logging setup

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::commands;

/// mbutane - Merge Butane config fragments and translate them to Ignition
#[derive(Parser, Debug)]
#[command(name = "mbutane")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    compose: commands::compose::ComposeArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: LevelFilter,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level);
        commands::compose::execute(self.compose, &self.color)
    }
}

/// `RUST_LOG`, when set, takes precedence over `--log-level`.
fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger may already be installed when running under tests.
    let _ = builder.try_init();
}

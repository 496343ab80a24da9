//! Compose command implementation
//!
//! Composes the working directory's fragments into one document, optionally
//! prints it, translates it and writes `config.ign`.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use mbutane::compose;
use mbutane::config::ComposeConfig;
use mbutane::defaults;
use mbutane::document;
use mbutane::output::{OutputConfig, Status};
use mbutane::translator::Translator;

/// Arguments for composing a working directory
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Working directory holding config.bu
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Translator executable
    #[arg(long, value_name = "PATH", env = "MBUTANE_BUTANE", default_value = defaults::TRANSLATOR)]
    pub butane: String,

    /// Do not add the result file to the composed config
    #[arg(long)]
    pub no_result_file: bool,

    /// Print the merged document to stdout before translation
    #[arg(short, long)]
    pub print: bool,

    /// Pass --strict to the translator
    #[arg(long)]
    pub strict: bool,

    /// Pass --pretty to the translator
    #[arg(long)]
    pub pretty: bool,

    /// Translator timeout in seconds
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = defaults::TRANSLATOR_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// File name of the per-directory override fragments
    #[arg(long, value_name = "NAME", default_value = defaults::OVERRIDE_FILE_NAME)]
    pub config_name: String,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl ComposeArgs {
    fn compose_config(&self) -> ComposeConfig {
        let config =
            ComposeConfig::new(&self.dir).with_override_file_name(self.config_name.clone());
        if self.no_result_file {
            config.without_result_file()
        } else {
            config
        }
    }

    fn translator(&self) -> Translator {
        let mut translator =
            Translator::new(self.butane.clone()).with_timeout(Duration::from_secs(self.timeout));
        if self.strict {
            translator = translator.arg("--strict");
        }
        if self.pretty {
            translator = translator.arg("--pretty");
        }
        translator
    }
}

/// Execute the compose command
pub fn execute(args: ComposeArgs, color: &str) -> Result<()> {
    let output = OutputConfig::from_env_and_flag(color).quiet(args.quiet);
    let start_time = Instant::now();

    let config = args.compose_config();
    let translator = args.translator();

    let result = compose::compose(&config)
        .and_then(|document| {
            if args.print {
                print!("{}", document::to_yaml_string(&document)?);
            }
            compose::write_output(&config, &translator, &document)
        })
        .with_context(|| format!("Failed to compose {}", args.dir.display()));

    match result {
        Ok(path) => {
            output.status(
                Status::Success,
                &format!(
                    "Wrote {} in {:.2}s",
                    path.display(),
                    start_time.elapsed().as_secs_f64()
                ),
            );
            Ok(())
        }
        Err(e) => {
            output.status(Status::Failure, "Compose failed");
            Err(e)
        }
    }
}

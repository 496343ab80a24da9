//! Orchestrator for a complete composition run
//!
//! This module coordinates all stages:
//! 1. Discover the main and merge fragments
//! 2. Load each fragment, assembling its storage tree into a `storage` section
//! 3. Merge all fragment documents in order
//! 4. Deduplicate the storage lists and validate every path
//! 5. Add the result file entry (unless disabled)
//! 6. Translate the document and write the output file
//!
//! Stages 1-5 are [`compose`]; stage 6 is [`write_output`]. Nothing is
//! written unless every stage succeeds.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::config::ComposeConfig;
use crate::dedup::Deduplicator;
use crate::document::{self, Document};
use crate::error::Result;
use crate::fragment;
use crate::merge::merge_into;
use crate::policy::AllowedPathPolicy;
use crate::result_file::{self, ResultRecord};
use crate::storage::StorageAssembler;
use crate::translator::Translator;

/// Compose the final document for `config.working_dir`.
pub fn compose(config: &ComposeConfig) -> Result<Document> {
    let policy = AllowedPathPolicy::new(&config.policy)?;
    let assembler =
        StorageAssembler::new(config.scanner.clone()).with_files_root(&config.working_dir);

    let mut composed = Document::new();
    for fragment in fragment::discover(config)? {
        let document = fragment.load(&assembler)?;
        merge_into(&mut composed, document)?;
        info!("Merged fragment '{}'", fragment.name);
    }

    Deduplicator::new(&policy).deduplicate(&mut composed)?;

    if let Some(path) = &config.result_file {
        result_file::inject(&mut composed, path, &ResultRecord::current())?;
    }

    Ok(composed)
}

/// Translate `document` and write the translator output.
///
/// Returns the path of the written file.
pub fn write_output(
    config: &ComposeConfig,
    translator: &Translator,
    document: &Document,
) -> Result<PathBuf> {
    let yaml = document::to_yaml_string(document)?;
    let output = translator.translate(yaml.as_bytes(), &config.working_dir)?;

    let output_path = config.output_path();
    fs::write(&output_path, output)?;
    info!("Wrote {}", output_path.display());
    Ok(output_path)
}

/// Compose, translate and write in one go.
pub fn run(config: &ComposeConfig, translator: &Translator) -> Result<PathBuf> {
    let document = compose(config)?;
    write_output(config, translator, &document)
}

/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Merge command implementation
 */

//! Merge command implementation.
//!
//! Expands every `\input`, `\import` and `\include` reachable from the input
//! document and writes the flattened result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use texmerge_core::{MergeOptions, MergeReport, Merger, encoding_for_label};

/// Arguments for the merge command
#[derive(Debug)]
pub struct MergeArgs {
    /// Main LaTeX file
    pub input: PathBuf,
    /// Output file path
    pub output: Option<PathBuf>,
    /// Suffix for the derived output name
    pub suffix: String,
    /// Maximum inclusion depth
    pub max_depth: usize,
    /// Encoding label for sources and output
    pub encoding: String,
}

/// Execute the merge command
pub fn execute(args: MergeArgs) -> Result<()> {
    let report = run(&args)?;
    println!(
        "Merge completed! Processed {} files",
        report.files_processed
    );
    println!("Output file: {}", report.output_path.display());
    Ok(())
}

fn run(args: &MergeArgs) -> Result<MergeReport> {
    let options = MergeOptions::new()
        .with_max_depth(args.max_depth)
        .with_output_suffix(args.suffix.clone())
        .with_encoding(encoding_for_label(&args.encoding)?);
    debug!(?options, input = %args.input.display(), "Starting merge");

    Merger::new(options)
        .merge_file(&args.input, args.output.as_deref())
        .with_context(|| format!("Failed to merge {}", args.input.display()))
}

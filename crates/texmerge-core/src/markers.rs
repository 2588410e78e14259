/*
 * markers.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! In-band provenance and diagnostic markers.
//!
//! The merged document reports everything in LaTeX comments so that it stays
//! compilable. Downstream tools scan for these exact templates, so changing
//! any of them is a breaking change.

use crate::directive::DirectiveKind;
use std::fmt::Display;
use std::path::Path;

/// Wrap the merged content of one directive target in start/end markers.
pub fn provenance_block(
    kind: DirectiveKind,
    reference: &str,
    resolved: &Path,
    base_dir: &Path,
    body: &str,
) -> String {
    let mut block = format!("\n% ====== Start {}: {} ======\n", kind, reference);
    if kind == DirectiveKind::Include {
        block.push_str("% Note: \\include forces page breaks, may need adjustment\n");
    }
    block.push_str(&format!("% Original file: {}\n", resolved.display()));
    block.push_str(&format!("% Base directory: {}\n", base_dir.display()));
    block.push_str(body);
    block.push_str(&format!("\n% ====== End {}: {} ======\n", kind, reference));
    block
}

/// A directive whose target could not be resolved.
pub fn not_found(kind: DirectiveKind, reference: &str) -> String {
    format!("% Error: {} file not found: {}\n", kind.title(), reference)
}

/// A file that was already expanded earlier in the same run.
pub fn already_included(path: &Path) -> String {
    format!(
        "% Warning: File {} already included, skipping\n",
        path.display()
    )
}

/// A resolved file that could not be read.
pub fn unreadable(path: &Path, cause: impl Display) -> String {
    format!("% Error: Cannot read file {}: {}\n", path.display(), cause)
}

/// A file nested deeper than the configured limit.
pub fn depth_exceeded(max_depth: usize, path: &Path) -> String {
    format!(
        "% Error: Maximum inclusion depth {} exceeded, not expanding {}\n",
        max_depth,
        path.display()
    )
}

/*
 * discover.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Discover command implementation
 */

//! Discover command implementation.
//!
//! Prints every file a merge would read, with the base directory each one
//! is resolved against and the directive that reached it.

use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use texmerge_core::{DiscoveredFile, MergeOptions, Merger, encoding_for_label};

/// Arguments for the discover command
#[derive(Debug)]
pub struct DiscoverArgs {
    /// Main LaTeX file
    pub input: PathBuf,
    /// Maximum inclusion depth
    pub max_depth: usize,
    /// Encoding label for sources
    pub encoding: String,
}

/// Execute the discover command
pub fn execute(args: DiscoverArgs) -> Result<()> {
    let options = MergeOptions::new()
        .with_max_depth(args.max_depth)
        .with_encoding(encoding_for_label(&args.encoding)?);
    let merger = Merger::new(options);
    let files = merger
        .discover(&args.input)
        .with_context(|| format!("Failed to discover files for {}", args.input.display()))?;

    print!("{}", render_inventory(&files));
    Ok(())
}

/// Format the inventory with paths relative to the root document's directory.
fn render_inventory(files: &[DiscoveredFile]) -> String {
    let Some(root) = files.first() else {
        return "Found 0 related files\n".to_string();
    };
    let root_dir = root.base_dir.as_path();

    let mut out = format!("Found {} related files:\n", files.len());
    for (index, file) in files.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "  {:3}. {}",
            index + 1,
            relative_to(&file.path, root_dir).display()
        );
        let _ = writeln!(
            out,
            "       Base directory: {}",
            relative_to(&file.base_dir, root_dir).display()
        );
        let _ = writeln!(out, "       Import method: {}", file.kind);
    }
    out
}

/// Express `path` relative to `base`, climbing out with `..` where needed.
/// Paths on different roots (another drive, say) stay absolute.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    match (path_components.peek(), base_components.peek()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) if a != b => {
            return path.to_path_buf();
        }
        _ => {}
    }

    while let (Some(a), Some(b)) = (path_components.peek(), base_components.peek()) {
        if a != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut relative: PathBuf = base_components.map(|_| Component::ParentDir).collect();
    relative.extend(path_components);
    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}

/*
 * discovery.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Read-only inventory of the files a merge would touch.
//!
//! The walk follows the same directives as the merger, in the same pass
//! order, but never substitutes anything. Files are keyed by
//! (canonical path, base directory): a file reached through two different
//! base directories is listed, and walked, once per base directory. The
//! merger keys by path alone and expands such a file only once.

use crate::directive::{DirectiveKind, scan};
use crate::error::Result;
use crate::merger::{Merger, parent_dir};
use crate::resolver::{SourceLoader, resolve};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a file entered the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryKind {
    /// The document the walk started from.
    Root,
    /// Reached through a directive of the given kind.
    Directive(DirectiveKind),
}

impl fmt::Display for DiscoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryKind::Root => f.write_str("root"),
            DiscoveryKind::Directive(kind) => write!(f, "{}", kind),
        }
    }
}

/// One entry of the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Canonical path of the file.
    pub path: PathBuf,
    /// Base directory in effect for directives inside this file.
    pub base_dir: PathBuf,
    pub kind: DiscoveryKind,
}

#[derive(Debug, Default)]
struct DiscoveryState {
    visited: HashSet<(PathBuf, PathBuf)>,
    files: Vec<DiscoveredFile>,
}

impl<L: SourceLoader> Merger<L> {
    /// List every file reachable from `root` in depth-first,
    /// first-encountered order. The root comes first.
    ///
    /// # Errors
    ///
    /// Fails only when `root` does not exist.
    pub fn discover(&self, root: &Path) -> Result<Vec<DiscoveredFile>> {
        let root = self.root_document(root)?;
        let base_dir = parent_dir(&root);

        let mut state = DiscoveryState::default();
        self.visit(&mut state, &root, &base_dir, DiscoveryKind::Root, 0);

        info!(root = %root.display(), files = state.files.len(), "Discovery completed");
        Ok(state.files)
    }

    fn visit(
        &self,
        state: &mut DiscoveryState,
        file: &Path,
        base_dir: &Path,
        kind: DiscoveryKind,
        depth: usize,
    ) {
        let path = self
            .loader()
            .canonicalize(file)
            .unwrap_or_else(|_| file.to_path_buf());
        let key = (path.clone(), base_dir.to_path_buf());
        if state.visited.contains(&key) {
            return;
        }

        let max_depth = self.options().max_depth;
        if depth > max_depth {
            warn!(file = %path.display(), max_depth, "Maximum inclusion depth exceeded");
            return;
        }

        state.visited.insert(key);
        state.files.push(DiscoveredFile {
            path: path.clone(),
            base_dir: base_dir.to_path_buf(),
            kind,
        });

        let content = match self.loader().read_to_string(&path, self.options().encoding) {
            Ok(content) => content,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Cannot read file");
                return;
            }
        };

        for pass in DirectiveKind::PASSES {
            for occurrence in scan(&content, pass) {
                let search_dir = occurrence.search_dir(base_dir);
                match resolve(self.loader(), &occurrence.name, &search_dir) {
                    Some(target) => self.visit(
                        state,
                        &target,
                        &search_dir,
                        DiscoveryKind::Directive(occurrence.kind),
                        depth + 1,
                    ),
                    None => debug!(
                        reference = %occurrence.reference(),
                        search_dir = %search_dir.display(),
                        "Skipping unresolved reference"
                    ),
                }
            }
        }
    }
}

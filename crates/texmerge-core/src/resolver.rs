/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Source loading and directive target resolution.
//!
//! This module provides the [`SourceLoader`] trait used by the merger to touch
//! the filesystem, a native implementation, an in-memory implementation for
//! tests, and [`resolve`], which turns a directive's logical name into a
//! concrete path.

use encoding_rs::Encoding;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extensions tried, in order, when resolving a logical name.
///
/// Only `.tex` and the bare name are probed. Names like `macros.sty` resolve
/// through the bare probe.
pub const PROBE_EXTENSIONS: [&str; 2] = [".tex", ""];

/// Trait for reading documents referenced by directives.
///
/// Implementations decide where documents come from. Every read is a full,
/// scoped read: nothing is held open between calls.
pub trait SourceLoader {
    /// Whether anything (file or directory) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Absolute path with `.`/`..` removed and links followed where the
    /// backing store has them.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Read the whole document at `path`, decoding it with `encoding`.
    ///
    /// Bytes that are malformed in `encoding` are an error, not replaced.
    fn read_to_string(&self, path: &Path, encoding: &'static Encoding) -> io::Result<String>;
}

/// Loader backed by the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct NativeLoader;

impl SourceLoader for NativeLoader {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn read_to_string(&self, path: &Path, encoding: &'static Encoding) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("stream did not contain valid {}", encoding.name()),
                )
            })
    }
}

/// Loader backed by an in-memory map of absolute paths to contents.
///
/// Directories exist implicitly whenever some file lives below them.
/// Contents are already text, so the requested encoding is ignored.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Add a document. `path` should be absolute.
    pub fn add(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
        self.files
            .insert(normalize_lexically(path.as_ref()), content.into());
        self
    }

    /// Create a loader with the given documents.
    pub fn with_files(
        files: impl IntoIterator<Item = (impl AsRef<Path>, impl Into<String>)>,
    ) -> Self {
        let mut loader = Self::new();
        for (path, content) in files {
            loader.add(path, content);
        }
        loader
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }
}

impl SourceLoader for MemoryLoader {
    fn exists(&self, path: &Path) -> bool {
        let path = normalize_lexically(path);
        self.files.contains_key(&path) || self.is_dir(&path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let normalized = normalize_lexically(path);
        if self.exists(&normalized) {
            Ok(normalized)
        } else {
            Err(not_found(path))
        }
    }

    fn read_to_string(&self, path: &Path, _encoding: &'static Encoding) -> io::Result<String> {
        self.files
            .get(&normalize_lexically(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}

/// Remove `.` components and fold `..` into its parent without touching disk.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve a directive's logical name to a concrete document.
///
/// 1. An absolute `name` that exists is returned directly.
/// 2. Otherwise `search_dir/name` is tried with each of
///    [`PROBE_EXTENSIONS`] appended, in order.
/// 3. If nothing exists, `None`. Callers decide how to report it.
///
/// Found paths are canonicalized.
pub fn resolve(loader: &impl SourceLoader, name: &str, search_dir: &Path) -> Option<PathBuf> {
    let as_given = Path::new(name);
    if as_given.is_absolute() && loader.exists(as_given) {
        return Some(canonical_or_given(loader, as_given));
    }

    PROBE_EXTENSIONS
        .iter()
        .map(|ext| search_dir.join(format!("{}{}", name, ext)))
        .find(|candidate| loader.exists(candidate))
        .map(|found| canonical_or_given(loader, &found))
}

fn canonical_or_given(loader: &impl SourceLoader, path: &Path) -> PathBuf {
    loader
        .canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
}

/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Run configuration for the merger and discovery walk.

use crate::error::{MergeError, Result};
use encoding_rs::{Encoding, UTF_8};

/// Default maximum inclusion depth. The root document sits at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Default suffix appended to the root file stem when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_merged";

/// Options shared by [`crate::Merger`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Deepest nesting level that is still expanded.
    pub max_depth: usize,

    /// Suffix used by [`crate::default_output_path`].
    pub output_suffix: String,

    /// Encoding used to decode every source file and to encode the merged
    /// output.
    pub encoding: &'static Encoding,
}

impl MergeOptions {
    /// Create options with the default depth limit, output suffix and UTF-8.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            encoding: UTF_8,
        }
    }

    /// Set the maximum inclusion depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the suffix used when deriving the output path.
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    /// Set the encoding for reading sources and writing the merged output.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Look up an encoding by its WHATWG label (`utf-8`, `latin1`, `shift_jis`, ...).
///
/// # Errors
///
/// Fails with [`MergeError::UnknownEncoding`] for labels with no match.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| MergeError::UnknownEncoding {
        label: label.to_string(),
    })
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for merge and discovery runs.
//!
//! Only conditions that stop a run entirely are represented here. Problems
//! inside the reference graph (unresolved directives, unreadable files,
//! cycles, the depth limit) are reported in-band through [`crate::markers`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a merge or discovery run.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The root document does not exist.
    #[error("Main file not found: {}", .path.display())]
    MissingRootFile { path: PathBuf },

    /// The merged document could not be written.
    #[error("Cannot write merged output to {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested character encoding has no known label.
    #[error("Unknown encoding: {label}")]
    UnknownEncoding { label: String },
}

impl MergeError {
    /// Build the error for merged text the output encoding cannot represent.
    pub(crate) fn unencodable(path: &std::path::Path, encoding: &str) -> Self {
        MergeError::WriteOutput {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("merged text is not representable in {}", encoding),
            ),
        }
    }
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

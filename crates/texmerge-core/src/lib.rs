/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive LaTeX inclusion merger.
//!
//! Given a root `.tex` document, this crate expands every nested inclusion
//! directive into a single flattened document. It recognizes three directive
//! families:
//!
//! - `\input{name}` and `\input name`
//! - `\import{subdir}{name}`, which moves the base directory for everything
//!   nested inside the imported file
//! - `\include{name}` and `\includeonly{name}`
//!
//! Matching is purely textual. Directives inside comments or verbatim blocks
//! are expanded like any other.
//!
//! # Example
//!
//! ```ignore
//! use texmerge_core::{MergeOptions, Merger};
//!
//! let merger = Merger::new(MergeOptions::default());
//! let report = merger.merge_file("paper/main.tex".as_ref(), None)?;
//! println!("{} files merged into {}", report.files_processed, report.output_path.display());
//!
//! for entry in merger.discover("paper/main.tex".as_ref())? {
//!     println!("{} ({})", entry.path.display(), entry.kind);
//! }
//! ```

pub mod directive;
pub mod discovery;
pub mod error;
pub mod markers;
pub mod merger;
pub mod options;
pub mod resolver;

pub use directive::{DirectiveKind, DirectiveOccurrence, scan};
pub use discovery::{DiscoveredFile, DiscoveryKind};
pub use error::{MergeError, Result};
pub use merger::{MergeReport, MergeResult, Merger, default_output_path};
pub use options::{MergeOptions, encoding_for_label};
pub use resolver::{MemoryLoader, NativeLoader, SourceLoader, resolve};

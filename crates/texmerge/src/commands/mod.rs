//! Command implementations for the texmerge CLI
//!
//! Each command module handles the CLI interface and delegates to
//! texmerge-core for the actual work.

pub mod discover;
pub mod merge;

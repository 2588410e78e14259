/*
 * merger.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive expansion of inclusion directives.
//!
//! Each file goes through three passes (`\input`, then `\import`, then
//! `\include`), each pass scanning the output of the previous one. Every
//! resolved directive is replaced by the recursively merged target wrapped in
//! provenance markers; everything that goes wrong inside the graph is reported
//! in-band via [`crate::markers`].

use crate::directive::{DirectiveKind, DirectiveOccurrence, scan};
use crate::error::{MergeError, Result};
use crate::markers;
use crate::options::MergeOptions;
use crate::resolver::{NativeLoader, SourceLoader, resolve};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Merged text of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: String,
    /// Number of distinct files expanded, the root included.
    pub files_processed: usize,
}

/// Outcome of [`Merger::merge_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub files_processed: usize,
}

/// Per-run state. Created fresh by every top-level call.
#[derive(Debug, Default)]
struct MergeState {
    /// Canonical paths already expanded in this run.
    visited: HashSet<PathBuf>,
}

/// Flattens a LaTeX document tree into a single document.
///
/// A `Merger` holds only configuration and a loader, so one instance can
/// serve any number of runs.
#[derive(Debug, Clone)]
pub struct Merger<L = NativeLoader> {
    options: MergeOptions,
    loader: L,
}

impl Merger<NativeLoader> {
    /// Create a merger that reads from the real filesystem.
    pub fn new(options: MergeOptions) -> Self {
        Self::with_loader(options, NativeLoader)
    }
}

impl Default for Merger<NativeLoader> {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

impl<L: SourceLoader> Merger<L> {
    /// Create a merger with a custom source loader.
    pub fn with_loader(options: MergeOptions, loader: L) -> Self {
        Self { options, loader }
    }

    /// Options every run of this merger uses.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub(crate) fn loader(&self) -> &L {
        &self.loader
    }

    /// Merge `root` and everything it references into one string.
    ///
    /// # Errors
    ///
    /// Fails only when `root` does not exist.
    pub fn merge(&self, root: &Path) -> Result<MergeResult> {
        let root = self.root_document(root)?;
        let base_dir = parent_dir(&root);

        info!(root = %root.display(), "Merging main file");

        let mut state = MergeState::default();
        let content = self.process(&mut state, &root, &base_dir, 0);

        Ok(MergeResult {
            content,
            files_processed: state.visited.len(),
        })
    }

    /// Merge `root` and write the result.
    ///
    /// When `output` is `None` the result goes next to the root, named by
    /// [`default_output_path`]. The text is encoded with
    /// [`MergeOptions::encoding`]. Nothing is written if the root is missing
    /// or the merged text cannot be encoded.
    pub fn merge_file(&self, root: &Path, output: Option<&Path>) -> Result<MergeReport> {
        let root = self.root_document(root)?;
        let merged = self.merge(&root)?;
        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(&root, &self.options.output_suffix),
        };

        let encoding = self.options.encoding;
        let (bytes, _, unmappable) = encoding.encode(&merged.content);
        if unmappable {
            return Err(MergeError::unencodable(&output_path, encoding.name()));
        }

        std::fs::write(&output_path, &bytes).map_err(|source| {
            MergeError::WriteOutput {
                path: output_path.clone(),
                source,
            }
        })?;

        info!(
            files = merged.files_processed,
            output = %output_path.display(),
            "Merge completed"
        );

        Ok(MergeReport {
            output_path,
            files_processed: merged.files_processed,
        })
    }

    /// Check that the root exists and return its canonical path.
    pub(crate) fn root_document(&self, root: &Path) -> Result<PathBuf> {
        if !self.loader.exists(root) {
            return Err(MergeError::MissingRootFile {
                path: root.to_path_buf(),
            });
        }
        self.loader
            .canonicalize(root)
            .map_err(|_| MergeError::MissingRootFile {
                path: root.to_path_buf(),
            })
    }

    fn process(&self, state: &mut MergeState, file: &Path, base_dir: &Path, depth: usize) -> String {
        let key = self
            .loader
            .canonicalize(file)
            .unwrap_or_else(|_| file.to_path_buf());

        if state.visited.contains(&key) {
            warn!(file = %file.display(), "File already processed, skipping");
            return markers::already_included(file);
        }

        if depth > self.options.max_depth {
            warn!(
                file = %file.display(),
                max_depth = self.options.max_depth,
                "Maximum inclusion depth exceeded"
            );
            return markers::depth_exceeded(self.options.max_depth, file);
        }

        state.visited.insert(key);
        debug!(file = %file.display(), base_dir = %base_dir.display(), "Processing");

        let content = match self.loader.read_to_string(file, self.options.encoding) {
            Ok(content) => content,
            Err(err) => {
                error!(file = %file.display(), error = %err, "Cannot read file");
                return markers::unreadable(file, err);
            }
        };

        DirectiveKind::PASSES
            .iter()
            .fold(content, |text, &kind| {
                self.expand(state, &text, kind, base_dir, depth)
            })
    }

    /// Replace every `kind` directive in `content`.
    fn expand(
        &self,
        state: &mut MergeState,
        content: &str,
        kind: DirectiveKind,
        base_dir: &Path,
        depth: usize,
    ) -> String {
        let occurrences = scan(content, kind);
        if occurrences.is_empty() {
            return content.to_string();
        }

        let mut expanded = String::with_capacity(content.len());
        let mut cursor = 0;
        for occurrence in &occurrences {
            expanded.push_str(&content[cursor..occurrence.span.start]);
            expanded.push_str(&self.substitute(state, occurrence, base_dir, depth));
            cursor = occurrence.span.end;
        }
        expanded.push_str(&content[cursor..]);
        expanded
    }

    fn substitute(
        &self,
        state: &mut MergeState,
        occurrence: &DirectiveOccurrence,
        base_dir: &Path,
        depth: usize,
    ) -> String {
        let reference = occurrence.reference();
        let search_dir = occurrence.search_dir(base_dir);

        match resolve(&self.loader, &occurrence.name, &search_dir) {
            Some(target) => {
                let body = self.process(state, &target, &search_dir, depth + 1);
                markers::provenance_block(occurrence.kind, &reference, &target, &search_dir, &body)
            }
            None => {
                error!(
                    kind = %occurrence.kind,
                    reference = %reference,
                    search_dir = %search_dir.display(),
                    "File not found"
                );
                markers::not_found(occurrence.kind, &reference)
            }
        }
    }
}

/// Output path used when none is given: `<dir>/<stem><suffix>.<ext>`.
pub fn default_output_path(root: &Path, suffix: &str) -> PathBuf {
    let stem = root
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}{}", stem, suffix);
    if let Some(ext) = root.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    root.with_file_name(name)
}

pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryLoader;
    use pretty_assertions::assert_eq;

    fn merger(files: &[(&str, &str)]) -> Merger<MemoryLoader> {
        Merger::with_loader(
            MergeOptions::default(),
            MemoryLoader::with_files(files.iter().copied()),
        )
    }

    fn merge(files: &[(&str, &str)]) -> MergeResult {
        merger(files)
            .merge(Path::new("/doc/main.tex"))
            .expect("root exists")
    }

    #[test]
    fn test_document_without_directives_is_unchanged() {
        let result = merge(&[("/doc/main.tex", "Just text.\n")]);
        assert_eq!(result.content, "Just text.\n");
        assert_eq!(result.files_processed, 1);
    }

    #[test]
    fn test_input_is_expanded_with_provenance() {
        let result = merge(&[
            ("/doc/main.tex", "A\n\\input{chapter1}\nB\n"),
            ("/doc/chapter1.tex", "Chapter one."),
        ]);
        assert_eq!(
            result.content,
            "A\n\n% ====== Start input: chapter1 ======\n\
             % Original file: /doc/chapter1.tex\n\
             % Base directory: /doc\n\
             Chapter one.\n\
             % ====== End input: chapter1 ======\n\nB\n"
        );
        assert_eq!(result.files_processed, 2);
    }

    #[test]
    fn test_import_moves_base_directory_for_nested_inputs() {
        let result = merge(&[
            ("/doc/main.tex", "\\import{sections}{intro}"),
            ("/doc/sections/intro.tex", "\\input{fig}"),
            ("/doc/sections/fig.tex", "nested figure"),
            ("/doc/fig.tex", "wrong figure"),
        ]);
        assert!(result.content.contains("% Original file: /doc/sections/fig.tex"));
        assert!(result.content.contains("nested figure"));
        assert!(!result.content.contains("wrong figure"));
        assert!(
            result
                .content
                .contains("% ====== Start import: sections/intro ======")
        );
        assert!(result.content.contains("% Base directory: /doc/sections\n"));
    }

    #[test]
    fn test_input_keeps_base_directory() {
        let result = merge(&[
            ("/doc/main.tex", "\\input{parts/one}"),
            ("/doc/parts/one.tex", "\\input{two}"),
            ("/doc/two.tex", "root level two"),
            ("/doc/parts/two.tex", "parts level two"),
        ]);
        assert!(result.content.contains("root level two"));
        assert!(!result.content.contains("parts level two"));
    }

    #[test]
    fn test_missing_reference_is_reported_inline() {
        let result = merge(&[("/doc/main.tex", "before \\input{missing} after")]);
        assert_eq!(
            result.content,
            "before % Error: Input file not found: missing\n after"
        );
    }

    #[test]
    fn test_missing_import_reports_full_reference() {
        let result = merge(&[("/doc/main.tex", "\\import{sections}{gone}")]);
        assert!(
            result
                .content
                .contains("% Error: Import file not found: sections/gone\n")
        );
    }

    #[test]
    fn test_direct_cycle_terminates() {
        let result = merge(&[
            ("/doc/main.tex", "Root\n\\input{a}\n"),
            ("/doc/a.tex", "A\n\\input{main}\n"),
        ]);
        assert_eq!(result.content.matches("Start input: a ").count(), 1);
        assert_eq!(
            result
                .content
                .matches("% Warning: File /doc/main.tex already included, skipping")
                .count(),
            1
        );
        assert_eq!(result.files_processed, 2);
    }

    #[test]
    fn test_self_reference_terminates() {
        let result = merge(&[("/doc/main.tex", "\\input{main}")]);
        assert!(result.content.contains("already included, skipping"));
    }

    #[test]
    fn test_shared_file_is_merged_once() {
        let result = merge(&[
            ("/doc/main.tex", "\\input{a}\n\\input{b}\n"),
            ("/doc/a.tex", "\\input{shared}"),
            ("/doc/b.tex", "\\input{shared}"),
            ("/doc/shared.tex", "SHARED"),
        ]);
        assert_eq!(result.content.matches("SHARED").count(), 1);
        assert_eq!(result.files_processed, 4);
    }

    #[test]
    fn test_same_file_through_two_bases_is_merged_once() {
        let result = merge(&[
            ("/doc/main.tex", "\\input{sub/x}\n\\import{sub}{x}\n"),
            ("/doc/sub/x.tex", "X"),
        ]);
        assert_eq!(result.content.matches("\nX\n").count(), 1);
        assert!(result.content.contains("already included"));
    }

    #[test]
    fn test_input_pass_runs_before_include_pass() {
        let result = merge(&[
            ("/doc/main.tex", "\\include{shared}\n\\input{shared}\n"),
            ("/doc/shared.tex", "SHARED"),
        ]);
        let input_at = result.content.find("Start input: shared").unwrap();
        let include_at = result.content.find("Start include: shared").unwrap();
        let shared_at = result.content.find("SHARED").unwrap();
        assert!(include_at < input_at);
        assert!(shared_at > input_at);
        assert_eq!(result.content.matches("SHARED").count(), 1);
    }

    #[test]
    fn test_includeonly_resolves_like_include() {
        let result = merge(&[
            ("/doc/main.tex", "\\includeonly{ch1}"),
            ("/doc/ch1.tex", "Chapter"),
        ]);
        assert!(result.content.contains("% ====== Start include: ch1 ======"));
        assert!(result.content.contains("Chapter"));
    }

    #[test]
    fn test_unreadable_target_is_reported_inline() {
        let result = merge(&[
            ("/doc/main.tex", "\\input{sections}"),
            ("/doc/sections/intro.tex", "intro"),
        ]);
        assert!(
            result
                .content
                .contains("% Error: Cannot read file /doc/sections: ")
        );
    }

    #[test]
    fn test_depth_limit_stops_expansion() {
        let merger = Merger::with_loader(
            MergeOptions::default().with_max_depth(2),
            MemoryLoader::with_files([
                ("/doc/main.tex", "\\input{l1}"),
                ("/doc/l1.tex", "\\input{l2}"),
                ("/doc/l2.tex", "\\input{l3}"),
                ("/doc/l3.tex", "too deep"),
            ]),
        );
        let result = merger.merge(Path::new("/doc/main.tex")).unwrap();
        assert!(result.content.contains(
            "% Error: Maximum inclusion depth 2 exceeded, not expanding /doc/l3.tex"
        ));
        assert!(!result.content.contains("too deep"));
        assert_eq!(result.files_processed, 3);
    }

    #[test]
    fn test_unrepresentable_output_is_a_write_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("merged.tex");
        let merger = Merger::with_loader(
            MergeOptions::default().with_encoding(encoding_rs::WINDOWS_1252),
            MemoryLoader::with_files([("/doc/main.tex", "Snowman \u{2603}\n")]),
        );

        let err = merger
            .merge_file(Path::new("/doc/main.tex"), Some(&output))
            .unwrap_err();
        assert!(matches!(err, MergeError::WriteOutput { ref path, .. } if path == &output));
        assert!(err.to_string().contains("not representable in windows-1252"));
        assert!(!output.exists());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let merger = merger(&[
            ("/doc/main.tex", "\\input{a}\\input{a}"),
            ("/doc/a.tex", "A"),
        ]);
        let first = merger.merge(Path::new("/doc/main.tex")).unwrap();
        let second = merger.merge(Path::new("/doc/main.tex")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err = merger(&[]).merge(Path::new("/doc/main.tex")).unwrap_err();
        assert!(matches!(err, MergeError::MissingRootFile { .. }));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/doc/main.tex"), "_merged"),
            PathBuf::from("/doc/main_merged.tex")
        );
        assert_eq!(
            default_output_path(Path::new("/doc/README"), "-flat"),
            PathBuf::from("/doc/README-flat")
        );
    }
}

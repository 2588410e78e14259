/*
 * directive.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Inclusion directive scanning.
//!
//! Scanning is textual. A directive-looking token anywhere in the text is
//! reported, including inside `%` comments and verbatim environments.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

static INPUT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\input\s*(?:\{([^}]+)\}|([^\s{]+))").expect("input pattern is valid")
});

static IMPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\import\s*\{([^}]+)\}\s*\{([^}]+)\}").expect("import pattern is valid")
});

static INCLUDE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\include(?:only)?\s*\{([^}]+)\}").expect("include pattern is valid")
});

/// The three directive families, in the order the merger processes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `\input{name}` or `\input name`. Nested files keep the current base
    /// directory.
    Input,
    /// `\import{subdir}{name}`. The base directory becomes `base/subdir` for
    /// the imported file and everything nested inside it.
    Import,
    /// `\include{name}` or `\includeonly{name}`. Resolves like `Input` but
    /// forces a page break when compiled.
    Include,
}

impl DirectiveKind {
    /// Pass order used by the merger and the discovery walk.
    pub const PASSES: [DirectiveKind; 3] = [
        DirectiveKind::Input,
        DirectiveKind::Import,
        DirectiveKind::Include,
    ];

    /// Lowercase name used in provenance markers.
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Input => "input",
            DirectiveKind::Import => "import",
            DirectiveKind::Include => "include",
        }
    }

    /// Capitalized name used in not-found markers.
    pub fn title(self) -> &'static str {
        match self {
            DirectiveKind::Input => "Input",
            DirectiveKind::Import => "Import",
            DirectiveKind::Include => "Include",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            DirectiveKind::Input => Lazy::force(&INPUT_PATTERN),
            DirectiveKind::Import => Lazy::force(&IMPORT_PATTERN),
            DirectiveKind::Include => Lazy::force(&INCLUDE_PATTERN),
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single directive found in a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveOccurrence {
    pub kind: DirectiveKind,
    /// Byte range of the whole directive in the scanned text.
    pub span: Range<usize>,
    /// Subdirectory argument. Only set for [`DirectiveKind::Import`].
    pub directory: Option<String>,
    /// Referenced file name, possibly without extension.
    pub name: String,
}

impl DirectiveOccurrence {
    /// Logical reference as shown in markers: `name`, or `subdir/name` for
    /// imports.
    pub fn reference(&self) -> String {
        match &self.directory {
            Some(directory) => format!("{}/{}", directory, self.name),
            None => self.name.clone(),
        }
    }

    /// Directory the target is searched in. This is also the base directory
    /// for anything nested inside the target.
    pub fn search_dir(&self, base_dir: &Path) -> PathBuf {
        match &self.directory {
            Some(directory) => base_dir.join(directory),
            None => base_dir.to_path_buf(),
        }
    }
}

/// Find every directive of `kind` in `text`, in text order.
pub fn scan(text: &str, kind: DirectiveKind) -> Vec<DirectiveOccurrence> {
    kind.pattern()
        .captures_iter(text)
        .filter_map(|caps| occurrence(kind, &caps))
        .collect()
}

fn occurrence(kind: DirectiveKind, caps: &Captures<'_>) -> Option<DirectiveOccurrence> {
    let whole = caps.get(0)?;
    let (directory, name) = match kind {
        DirectiveKind::Input => {
            let name = caps.get(1).or_else(|| caps.get(2))?;
            (None, name.as_str())
        }
        DirectiveKind::Import => (Some(clean_name(caps.get(1)?.as_str())), caps.get(2)?.as_str()),
        DirectiveKind::Include => (None, caps.get(1)?.as_str()),
    };

    Some(DirectiveOccurrence {
        kind,
        span: whole.range(),
        directory,
        name: clean_name(name),
    })
}

/// Strip surrounding whitespace, then double quotes, then single quotes.
fn clean_name(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str, kind: DirectiveKind) -> Vec<String> {
        scan(text, kind).into_iter().map(|o| o.reference()).collect()
    }

    #[test]
    fn test_input_braced_and_bare() {
        let text = "\\input{intro}\n\\input body\n\\input {  spaced  }";
        assert_eq!(
            names(text, DirectiveKind::Input),
            vec!["intro", "body", "spaced"]
        );
    }

    #[test]
    fn test_input_span_covers_directive() {
        let text = "before \\input{a} after";
        let found = scan(text, DirectiveKind::Input);
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].span.clone()], "\\input{a}");
    }

    #[test]
    fn test_quotes_are_stripped() {
        let text = "\\input{\"quoted\"}\\include{'single'}";
        assert_eq!(names(text, DirectiveKind::Input), vec!["quoted"]);
        assert_eq!(names(text, DirectiveKind::Include), vec!["single"]);
    }

    #[test]
    fn test_import_two_arguments() {
        let text = "\\import{sections/}{intro}\n\\import {figs} {plot}";
        let found = scan(text, DirectiveKind::Import);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].directory.as_deref(), Some("sections/"));
        assert_eq!(found[0].name, "intro");
        assert_eq!(found[1].reference(), "figs/plot");
    }

    #[test]
    fn test_import_requires_both_arguments() {
        assert!(scan("\\import{only-one}", DirectiveKind::Import).is_empty());
    }

    #[test]
    fn test_include_and_includeonly() {
        let text = "\\include{ch1}\n\\includeonly{ch2}";
        assert_eq!(names(text, DirectiveKind::Include), vec!["ch1", "ch2"]);
    }

    #[test]
    fn test_includegraphics_is_not_an_include() {
        let text = "\\includegraphics{figure.png}";
        assert!(scan(text, DirectiveKind::Include).is_empty());
    }

    #[test]
    fn test_kinds_do_not_overlap() {
        let text = "\\import{dir}{file}";
        assert!(scan(text, DirectiveKind::Input).is_empty());
        assert!(scan(text, DirectiveKind::Include).is_empty());
    }

    #[test]
    fn test_commented_directive_is_still_found() {
        let text = "% \\input{commented}\n";
        assert_eq!(names(text, DirectiveKind::Input), vec!["commented"]);
    }

    #[test]
    fn test_search_dir() {
        let base = Path::new("/doc");
        let import = &scan("\\import{sections}{intro}", DirectiveKind::Import)[0];
        assert_eq!(import.search_dir(base), PathBuf::from("/doc/sections"));

        let input = &scan("\\input{intro}", DirectiveKind::Input)[0];
        assert_eq!(input.search_dir(base), PathBuf::from("/doc"));
    }
}

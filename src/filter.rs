//! # Path Filter Module
//!
//! Decides whether an entry found during the walk is skipped.
//!
//! Two rules apply:
//! - the output root and everything below it is always skipped, so an output
//!   tree nested inside the input tree is never fed back into the pipeline;
//! - ignore patterns, matched against the root-relative path with `/`
//!   separators. A pattern starting with a separator is anchored at the root
//!   (prefix match after dropping the separator), any other pattern matches
//!   as a plain substring anywhere in the relative path.
//!
//! This is deliberately not gitignore: no globs, no negation, no
//! directory-only anchors. `log` also matches `catalog/`.

use crate::error::BatchError;
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Component, Path};
use tracing::debug;

/// Name of the pattern file looked up in the input root when none is configured
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Immutable set of ignore patterns, loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    patterns: BTreeSet<String>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from in-memory patterns, applying the same line rules as `parse`
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| Self::clean_line(p.as_ref()))
            .collect();
        Self { patterns }
    }

    /// Parse a line-oriented pattern file body.
    /// Blank lines and lines starting with `#` are dropped, the rest trimmed.
    pub fn parse(content: &str) -> Self {
        Self::from_patterns(content.lines())
    }

    /// Read a pattern file; failure to read it is a configuration error
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BatchError::Configuration(format!(
                "Cannot read ignore file {}: {}",
                path.display(),
                e
            ))
        })?;
        let rules = Self::parse(&content);
        debug!("Loaded {} ignore patterns from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Load `<dir>/.gitignore` if present, empty rules otherwise
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let candidate = dir.join(DEFAULT_IGNORE_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::new())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// True if `relative` (root-relative, `/`-separated) matches any pattern
    pub fn matches(&self, relative: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            match pattern.strip_prefix(is_separator) {
                Some(anchored) => relative.starts_with(anchored),
                None => relative.contains(pattern.as_str()),
            }
        })
    }

    fn clean_line(line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            None
        } else {
            Some(line.to_string())
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// Root-relative form of `path` with `/` separators, or None if `path` is not under `root`
pub fn relative_key(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Whether a discovered entry must be left out of the batch
pub fn should_skip(candidate: &Path, root: &Path, output_root: &Path, rules: &IgnoreRules) -> bool {
    if candidate.starts_with(output_root) {
        return true;
    }

    if rules.is_empty() {
        return false;
    }

    match relative_key(candidate, root) {
        Some(relative) if !relative.is_empty() => rules.matches(&relative),
        _ => false,
    }
}

//! Path exclusion by folder name

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Component, Path};

use glob::Pattern;
use tracing::warn;

/// Check whether any segment of `path` equals one of `ignored_names`.
///
/// Every component is tested, so an ignored name excludes the entry itself
/// and everything below it, however deep it appears.
pub fn is_excluded(path: &Path, ignored_names: &BTreeSet<String>) -> bool {
    path.components().any(|component| match component {
        Component::Normal(segment) => segment
            .to_str()
            .is_some_and(|s| ignored_names.contains(s)),
        _ => false,
    })
}

/// Exclusion rules for one scan: exact folder names plus optional glob patterns.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    ignored_names: BTreeSet<String>,
    patterns: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(ignored_names: BTreeSet<String>) -> Self {
        Self {
            ignored_names,
            patterns: Vec::new(),
        }
    }

    /// Add glob patterns. Invalid patterns are logged and skipped.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        for raw in patterns {
            match Pattern::new(raw.as_ref()) {
                Ok(p) => self.patterns.push(p),
                Err(e) => warn!(pattern = raw.as_ref(), "ignoring invalid glob pattern: {}", e),
            }
        }
        self
    }

    /// Check whether a single path segment is excluded.
    pub fn is_excluded_name(&self, name: &OsStr) -> bool {
        let Some(name) = name.to_str() else {
            return false;
        };
        self.ignored_names.contains(name) || self.patterns.iter().any(|p| p.matches(name))
    }

    /// Check whether any segment of `path` is excluded.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return is_excluded(path, &self.ignored_names);
        }
        path.components().any(|component| match component {
            Component::Normal(segment) => self.is_excluded_name(segment),
            _ => false,
        })
    }
}

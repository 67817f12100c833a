//! Configuration types for tree walkers

use std::collections::BTreeSet;

use crate::file_utils::DEFAULT_MAX_FILE_SIZE;

/// Folder names ignored by the command line tool when no `-I` is given.
pub const DEFAULT_IGNORED_NAMES: &[&str] = &["__pycache__", ".git"];

/// Configuration for one scan. Immutable once the walk has started.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Entries with any path segment equal to one of these names are skipped.
    pub ignored_names: BTreeSet<String>,
    /// Glob patterns matched against each path segment, on top of `ignored_names`.
    pub ignore_patterns: Vec<String>,
    /// Descend only this many levels below the root (1 = root's children only).
    pub max_depth: Option<usize>,
    /// List files that are not Python sources as bare name lines.
    pub show_all_files: bool,
    /// Also honor `.gitignore`, `.ignore` and git exclude files.
    pub respect_gitignore: bool,
    /// Source files larger than this are listed but not parsed.
    pub max_file_size: u64,
}

impl WalkerConfig {
    /// Configuration that ignores exactly the given folder names.
    pub fn with_ignored<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            ignored_names: BTreeSet::new(),
            ignore_patterns: Vec::new(),
            max_depth: None,
            show_all_files: false,
            respect_gitignore: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

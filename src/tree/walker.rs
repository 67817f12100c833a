//! TreeWalker - enumerates filesystem entries in sorted order

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::{Walk, WalkBuilder};
use tracing::debug;

use crate::error::{Error, Result};
use crate::file_utils::is_source_file;

use super::config::WalkerConfig;
use super::filter::PathFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One directory or file found below the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEntry {
    pub path: PathBuf,
    /// Path relative to the scan root; never empty.
    pub relative_path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    /// Segments between the root and this entry, minus one. Children of the root are at 0.
    pub depth: usize,
}

impl FileSystemEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_source_file(&self) -> bool {
        self.kind == EntryKind::File && is_source_file(&self.path)
    }
}

/// Walks a directory tree depth-first, siblings sorted by name.
///
/// Directories and files are interleaved, so `a.py` sorts before `b/`, which
/// sorts before `c.py`, and every directory is immediately followed by its
/// contents.
pub struct TreeWalker {
    config: WalkerConfig,
    filter: PathFilter,
}

impl TreeWalker {
    pub fn new(config: WalkerConfig) -> Self {
        let filter = PathFilter::new(config.ignored_names.clone())
            .with_patterns(&config.ignore_patterns);
        Self { config, filter }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Start a walk. Fails only if `root` itself cannot be read as a directory;
    /// errors further down are yielded by the iterator.
    pub fn walk(&self, root: &Path) -> Result<Entries> {
        check_root(root)?;

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if self.config.respect_gitignore {
            builder
                .git_ignore(true)
                .git_exclude(true)
                .git_global(true)
                .ignore(true)
                .parents(true)
                .require_git(false);
        }

        // The walk counts the root as depth 0, so N levels below it is max_depth N.
        builder.max_depth(self.config.max_depth);

        // Prune excluded directories early; `Entries` re-checks every entry anyway.
        let prune = self.filter.clone();
        builder.filter_entry(move |entry| {
            entry.depth() == 0 || !prune.is_excluded_name(entry.file_name())
        });

        debug!(root = %root.display(), "walking directory tree");

        Ok(Entries {
            root: root.to_path_buf(),
            inner: builder.build(),
            filter: self.filter.clone(),
        })
    }
}

fn check_root(root: &Path) -> Result<()> {
    let access = |source| Error::Access {
        path: root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(root).map_err(access)?;
    if !metadata.is_dir() {
        return Err(access(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }
    fs::read_dir(root).map_err(access)?;
    Ok(())
}

/// Lazy sequence of retained entries, in walk order.
pub struct Entries {
    root: PathBuf,
    inner: Walk,
    filter: PathFilter,
}

impl Iterator for Entries {
    type Item = Result<FileSystemEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::Walk(e))),
            };

            if entry.depth() == 0 {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if self.filter.is_excluded(relative) {
                continue;
            }

            let path = entry.path();
            let kind = match entry.file_type() {
                Some(ft) if ft.is_dir() => EntryKind::Directory,
                // Symlinks are resolved for classification but never descended into.
                _ if path.is_dir() => EntryKind::Directory,
                _ if path.is_file() => EntryKind::File,
                _ => {
                    debug!(path = %path.display(), "skipping special or dangling entry");
                    continue;
                }
            };

            return Some(Ok(FileSystemEntry {
                path: path.to_path_buf(),
                relative_path: relative.to_path_buf(),
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
                depth: relative.components().count() - 1,
            }));
        }
    }
}

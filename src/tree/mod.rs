//! Directory tree walking logic
//!
//! `TreeWalker` yields every retained `FileSystemEntry` below a root, depth-first
//! with siblings sorted by name. Exclusion is decided per entry by `PathFilter`,
//! so an ignored folder name hides the folder and everything beneath it.

mod config;
mod filter;
mod walker;

pub use config::{DEFAULT_IGNORED_NAMES, WalkerConfig};
pub use filter::{PathFilter, is_excluded};
pub use walker::{Entries, EntryKind, FileSystemEntry, TreeWalker};

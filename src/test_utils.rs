//! Test utilities for building temporary source trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory populated with files for a test.
///
/// The directory is removed when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Create an empty directory.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Populate a package of `modules` Python files under each of `packages`
    /// directories, each with a class and a couple of functions.
    pub fn with_packages(packages: usize, modules: usize) -> Self {
        let tree = Self::new();
        for p in 0..packages {
            tree.add_file(&format!("pkg{p}/__init__.py"), "");
            for m in 0..modules {
                tree.add_file(&format!("pkg{p}/mod{m}.py"), &sample_module(m));
            }
        }
        tree
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Python source with two functions and a class holding three methods.
pub fn sample_module(seed: usize) -> String {
    format!(
        r#""""Module {seed}."""
import os


def load_{seed}(path):
    with open(path) as f:
        return f.read()


@dataclass
class Record{seed}:
    name: str

    def __init__(self, name):
        self.name = name

    @property
    def label(self):
        return self.name.upper()

    async def save(self):
        pass


def main():
    print(load_{seed}(os.getcwd()))
"#
    )
}

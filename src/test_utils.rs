//! Test utilities for building temporary project directories.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory for testing.
///
/// The directory is removed when dropped.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add an empty directory.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Read a file back as text.
    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.dir.path().join(path)).expect("Failed to read file")
    }

    /// File names directly inside `path`, sorted.
    pub fn list(&self, path: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path().join(path))
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// A header block carrying every mandatory directive.
pub fn full_header(comment: &str, order: Option<u32>, name: &str, tag: &str) -> String {
    let part = order.map(|n| format!("[{}] ", n)).unwrap_or_default();
    format!(
        "{c} {part}File: {name}\n{c} Version: 1.0\n{c} Description: test fixture\n{c} TAG: {tag}\n",
        c = comment,
        part = part,
        name = name,
        tag = tag
    )
}

//! File tree capability
//!
//! The engines never touch `std::fs` directly. They talk to a [`FileTree`],
//! which has two implementations:
//!
//! - `DiskTree`: the real filesystem
//! - `MemoryTree`: an in-memory fake with fault injection, used by tests
//!
//! Reads of "live" content go through [`read_live_text`] / [`read_live_head`],
//! which prefer an unsaved editor buffer over what is on disk.

mod disk;
mod memory;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub use disk::DiskTree;
pub use memory::MemoryTree;

/// Handle to a file or directory inside a [`FileTree`].
///
/// The parent is derived from the path, so an entry never owns or pins its
/// parent directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { path, name, is_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Text after the last dot of the name, or `""` when there is none.
    pub fn extension(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[i + 1..],
            None => "",
        }
    }

    pub fn parent_path(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Name of the containing directory.
    pub fn parent_name(&self) -> Option<String> {
        self.parent_path()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
    }
}

/// Narrow view of a file tree owned by the host environment.
pub trait FileTree {
    /// Look up an entry by absolute path.
    fn entry(&self, path: &Path) -> Option<FileEntry>;

    /// Direct children of a directory.
    fn children(&self, dir: &FileEntry) -> io::Result<Vec<FileEntry>>;

    fn read_bytes(&self, file: &FileEntry) -> io::Result<Vec<u8>>;

    /// Whole file as text. Invalid UTF-8 is replaced, not rejected.
    fn read_text(&self, file: &FileEntry) -> io::Result<String> {
        let bytes = self.read_bytes(file)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// First `max_lines` lines of a file.
    fn read_head(&self, file: &FileEntry, max_lines: usize) -> io::Result<Vec<String>> {
        let text = self.read_text(file)?;
        Ok(text.lines().take(max_lines).map(str::to_string).collect())
    }

    /// Named child of a directory, if present.
    fn child(&self, dir: &FileEntry, name: &str) -> Option<FileEntry> {
        self.entry(&dir.path().join(name))
    }

    /// Create a single directory. Fails if anything already uses the name.
    fn create_dir(&self, parent: &FileEntry, name: &str) -> io::Result<FileEntry>;

    /// Write a file, creating `dir` first when it is missing.
    ///
    /// Either the complete content becomes visible under `name` or nothing does.
    fn write_file(&self, dir: &FileEntry, name: &str, content: &[u8]) -> io::Result<FileEntry>;

    /// Remove a directory that has no children.
    fn remove_empty_dir(&self, dir: &FileEntry) -> io::Result<()>;

    /// Let host views pick up a newly written entry.
    fn refresh(&self, _entry: &FileEntry) {}
}

/// Source of unsaved editor content that shadows what is on disk.
pub trait EditorBuffers {
    fn unsaved_text(&self, path: &Path) -> Option<String>;
}

/// No editor attached: every read goes to the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBuffers;

impl EditorBuffers for NoBuffers {
    fn unsaved_text(&self, _path: &Path) -> Option<String> {
        None
    }
}

impl EditorBuffers for HashMap<PathBuf, String> {
    fn unsaved_text(&self, path: &Path) -> Option<String> {
        self.get(path).cloned()
    }
}

/// Read a file's current text, preferring an unsaved buffer.
pub fn read_live_text(
    tree: &dyn FileTree,
    buffers: &dyn EditorBuffers,
    file: &FileEntry,
) -> io::Result<String> {
    match buffers.unsaved_text(file.path()) {
        Some(text) => Ok(text),
        None => tree.read_text(file),
    }
}

/// Read the first `max_lines` lines of a file's current text, preferring an
/// unsaved buffer.
pub fn read_live_head(
    tree: &dyn FileTree,
    buffers: &dyn EditorBuffers,
    file: &FileEntry,
    max_lines: usize,
) -> io::Result<Vec<String>> {
    match buffers.unsaved_text(file.path()) {
        Some(text) => Ok(text.lines().take(max_lines).map(str::to_string).collect()),
        None => tree.read_head(file, max_lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(FileEntry::new("/p/my.test.file.rs", false).extension(), "rs");
        assert_eq!(FileEntry::new("/p/Makefile", false).extension(), "");
        assert_eq!(FileEntry::new("/p/.gitignore", false).extension(), "gitignore");
        assert_eq!(FileEntry::new("/p/App.VUE", false).extension(), "VUE");
    }

    #[test]
    fn test_parent_name() {
        let entry = FileEntry::new("/project/src/main.go", false);
        assert_eq!(entry.name(), "main.go");
        assert_eq!(entry.parent_name().as_deref(), Some("src"));
        assert_eq!(entry.parent_path(), Some(Path::new("/project/src")));
    }

    #[test]
    fn test_live_read_prefers_unsaved_buffer() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/a.go", "on disk\nline 2");
        let file = tree.entry(Path::new("/p/a.go")).unwrap();

        let mut buffers = HashMap::new();
        assert_eq!(read_live_text(&tree, &buffers, &file).unwrap(), "on disk\nline 2");

        buffers.insert(PathBuf::from("/p/a.go"), "edited\nline 2\nline 3".to_string());
        assert_eq!(read_live_text(&tree, &buffers, &file).unwrap(), "edited\nline 2\nline 3");
        assert_eq!(
            read_live_head(&tree, &buffers, &file, 2).unwrap(),
            vec!["edited".to_string(), "line 2".to_string()]
        );
    }

    #[test]
    fn test_live_read_falls_back_to_tree_error() {
        let tree = MemoryTree::new("/p");
        tree.add_unreadable("/p/locked.go");
        let file = tree.entry(Path::new("/p/locked.go")).unwrap();
        assert!(read_live_head(&tree, &NoBuffers, &file, 15).is_err());
    }
}

//! In-memory [`FileTree`] for tests and benchmarks

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use super::{FileEntry, FileTree};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
    /// Listed like a file but every read fails.
    Unreadable,
}

/// A file tree held entirely in memory.
///
/// Supports fault injection: unreadable files, directories that refuse to be
/// created, and a switch that makes every write fail.
#[derive(Debug)]
pub struct MemoryTree {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    denied_dirs: RefCell<HashSet<PathBuf>>,
    fail_writes: Cell<bool>,
}

impl MemoryTree {
    /// Create a tree containing only the directory `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let tree = Self {
            nodes: RefCell::new(BTreeMap::new()),
            denied_dirs: RefCell::new(HashSet::new()),
            fail_writes: Cell::new(false),
        };
        tree.add_dir(root);
        tree
    }

    /// Add a directory and any missing ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Add (or replace) a file, creating missing ancestors.
    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(content.as_bytes().to_vec()));
    }

    /// Add a file whose reads always fail.
    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::Unreadable);
    }

    /// Make `create_dir` fail for this exact path.
    pub fn deny_create(&self, path: impl AsRef<Path>) {
        self.denied_dirs
            .borrow_mut()
            .insert(path.as_ref().to_path_buf());
    }

    /// Make every subsequent `write_file` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Text content of a file, if present and readable.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().contains_key(path.as_ref())
    }
}

impl FileTree for MemoryTree {
    fn entry(&self, path: &Path) -> Option<FileEntry> {
        self.nodes
            .borrow()
            .get(path)
            .map(|node| FileEntry::new(path, matches!(node, Node::Dir)))
    }

    fn children(&self, dir: &FileEntry) -> io::Result<Vec<FileEntry>> {
        let nodes = self.nodes.borrow();
        match nodes.get(dir.path()) {
            Some(Node::Dir) => {}
            Some(_) => return Err(io::Error::other("not a directory")),
            None => return Err(io::Error::from(io::ErrorKind::NotFound)),
        }
        Ok(nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir.path()))
            .map(|(path, node)| FileEntry::new(path.clone(), matches!(node, Node::Dir)))
            .collect())
    }

    fn read_bytes(&self, file: &FileEntry) -> io::Result<Vec<u8>> {
        match self.nodes.borrow().get(file.path()) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Unreadable) => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
            Some(Node::Dir) => Err(io::Error::other("is a directory")),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn create_dir(&self, parent: &FileEntry, name: &str) -> io::Result<FileEntry> {
        let path = parent.path().join(name);
        if self.denied_dirs.borrow().contains(&path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let mut nodes = self.nodes.borrow_mut();
        if !matches!(nodes.get(parent.path()), Some(Node::Dir)) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        if nodes.contains_key(&path) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        nodes.insert(path.clone(), Node::Dir);
        Ok(FileEntry::new(path, true))
    }

    fn write_file(&self, dir: &FileEntry, name: &str, content: &[u8]) -> io::Result<FileEntry> {
        if self.fail_writes.get() {
            return Err(io::Error::other("simulated write failure"));
        }
        self.add_dir(dir.path());
        let path = dir.path().join(name);
        self.nodes
            .borrow_mut()
            .insert(path.clone(), Node::File(content.to_vec()));
        Ok(FileEntry::new(path, false))
    }

    fn remove_empty_dir(&self, dir: &FileEntry) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.keys().any(|p| p.parent() == Some(dir.path())) {
            return Err(io::Error::other("directory not empty"));
        }
        nodes.remove(dir.path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_ancestors() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/a/b/c.go", "package c");
        assert!(tree.entry(Path::new("/p/a")).unwrap().is_dir());
        assert!(tree.entry(Path::new("/p/a/b")).unwrap().is_dir());
        assert!(!tree.entry(Path::new("/p/a/b/c.go")).unwrap().is_dir());
    }

    #[test]
    fn test_children_are_direct_only() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/a/deep.go", "");
        tree.add_file("/p/top.go", "");
        let root = tree.entry(Path::new("/p")).unwrap();
        let names: Vec<_> = tree
            .children(&root)
            .unwrap()
            .into_iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "top.go"]);
    }

    #[test]
    fn test_create_dir_rejects_existing_and_denied() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/devOnly", "a file");
        tree.deny_create("/p/locked");
        let root = tree.entry(Path::new("/p")).unwrap();

        let err = tree.create_dir(&root, "devOnly").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        let err = tree.create_dir(&root, "locked").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(tree.create_dir(&root, "fresh").unwrap().is_dir());
    }

    #[test]
    fn test_remove_empty_dir_refuses_non_empty() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/d/x.txt", "");
        let d = tree.entry(Path::new("/p/d")).unwrap();
        assert!(tree.remove_empty_dir(&d).is_err());

        tree.add_dir("/p/e");
        let e = tree.entry(Path::new("/p/e")).unwrap();
        tree.remove_empty_dir(&e).unwrap();
        assert!(!tree.exists("/p/e"));
    }
}

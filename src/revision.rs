//! Revision-numbered output files and their directories
//!
//! Revisions are never stored. The next one is computed from the names
//! already in the output directory, so a directory can hold `R00`..`R99`
//! side by side without any bookkeeping file.

use regex::Regex;

use crate::error::{Error, Result};
use crate::file_tree::{FileEntry, FileTree};

/// How revisions are spelled for one kind of document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingScheme {
    /// `Combined_Codes_R<NN>.md`
    Combined,
    /// `<base>_R.<NN>.md`
    Tree(String),
}

impl NamingScheme {
    /// File name for the given two-digit revision.
    pub fn file_name(&self, revision: &str) -> String {
        match self {
            NamingScheme::Combined => format!("Combined_Codes_R{}.md", revision),
            NamingScheme::Tree(base) => format!("{}_R.{}.md", base, revision),
        }
    }

    fn pattern(&self) -> Regex {
        let source = match self {
            NamingScheme::Combined => r"^Combined_Codes_R(\d+)\.md$".to_string(),
            NamingScheme::Tree(base) => format!(r"^{}_R\.(\d+)\.md$", regex::escape(base)),
        };
        // Built from a fixed template and an escaped literal.
        Regex::new(&source).expect("revision regex is invalid")
    }
}

/// Directories created by one [`ensure_path`] call.
struct CreatedDirs<'a> {
    tree: &'a dyn FileTree,
    created: Vec<FileEntry>,
}

impl<'a> CreatedDirs<'a> {
    fn new(tree: &'a dyn FileTree) -> Self {
        Self {
            tree,
            created: Vec::new(),
        }
    }

    fn ensure(&mut self, parent: &FileEntry, name: &str) -> Result<FileEntry> {
        if let Some(existing) = self.tree.child(parent, name) {
            if existing.is_dir() {
                return Ok(existing);
            }
            return Err(Error::NotADirectory(existing.path().to_path_buf()));
        }
        let dir = self
            .tree
            .create_dir(parent, name)
            .map_err(|source| Error::DirectoryCreate {
                parent: parent.path().to_path_buf(),
                name: name.to_string(),
                source,
            })?;
        log::debug!("Created {:?}", dir.path());
        self.created.push(dir.clone());
        Ok(dir)
    }

    fn rollback(self) {
        for dir in self.created.iter().rev() {
            if let Err(e) = self.tree.remove_empty_dir(dir) {
                log::warn!("Could not remove {:?}: {}", dir.path(), e);
            }
        }
    }
}

/// Make sure `parent/name` exists as a directory.
///
/// An existing directory is reused. A non-directory with the same name is
/// [`Error::NotADirectory`].
pub fn ensure_dir(tree: &dyn FileTree, parent: &FileEntry, name: &str) -> Result<FileEntry> {
    CreatedDirs::new(tree).ensure(parent, name)
}

/// Make sure every level of `anchor/names[0]/names[1]/...` exists.
///
/// All or nothing: when a level fails, the directories this call created are
/// removed again before the error is returned.
pub fn ensure_path(tree: &dyn FileTree, anchor: &FileEntry, names: &[&str]) -> Result<FileEntry> {
    let mut dirs = CreatedDirs::new(tree);
    let mut current = anchor.clone();
    for name in names {
        match dirs.ensure(&current, name) {
            Ok(dir) => current = dir,
            Err(e) => {
                dirs.rollback();
                return Err(e);
            }
        }
    }
    Ok(current)
}

/// Next free revision in `dir`: highest existing number plus one, as at least
/// two digits, or `"00"` when nothing matches.
///
/// A directory that cannot be listed is treated as empty.
pub fn next_revision(tree: &dyn FileTree, dir: &FileEntry, scheme: &NamingScheme) -> String {
    let pattern = scheme.pattern();
    let children = tree.children(dir).unwrap_or_else(|e| {
        log::debug!("Cannot list {:?} for revisions: {}", dir.path(), e);
        Vec::new()
    });

    // A number with no successor cannot be continued and is skipped.
    let next = children
        .iter()
        .filter(|c| !c.is_dir())
        .filter_map(|c| pattern.captures(c.name()))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .filter_map(|n| n.checked_add(1))
        .max();

    match next {
        Some(n) => format!("{:02}", n),
        None => "00".to_string(),
    }
}

/// Name for the next revision of a document in `dir`.
pub fn next_file_name(tree: &dyn FileTree, dir: &FileEntry, scheme: &NamingScheme) -> String {
    scheme.file_name(&next_revision(tree, dir, scheme))
}

/// Write `content` as `dir/file_name` and let the host view pick it up.
pub fn write(
    tree: &dyn FileTree,
    dir: &FileEntry,
    file_name: &str,
    content: &str,
) -> Result<FileEntry> {
    let written = tree
        .write_file(dir, file_name, content.as_bytes())
        .map_err(|source| Error::Write {
            path: dir.path().join(file_name),
            source,
        })?;
    tree.refresh(&written);
    log::debug!("Wrote {:?} ({} bytes)", written.path(), content.len());
    Ok(written)
}

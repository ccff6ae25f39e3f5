//! Real filesystem implementation of [`FileTree`]

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use super::{FileEntry, FileTree};

/// [`FileTree`] over the local filesystem.
///
/// Symlinks are reported as plain entries (never directories), so a walk
/// cannot loop through a link back to an ancestor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskTree;

impl DiskTree {
    pub fn new() -> Self {
        Self
    }
}

impl FileTree for DiskTree {
    fn entry(&self, path: &Path) -> Option<FileEntry> {
        let meta = fs::symlink_metadata(path).ok()?;
        Some(FileEntry::new(path, meta.file_type().is_dir()))
    }

    fn children(&self, dir: &FileEntry) -> io::Result<Vec<FileEntry>> {
        let mut entries: Vec<_> = fs::read_dir(dir.path())?.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|a| a.file_name());

        Ok(entries
            .into_iter()
            .map(|entry| {
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                FileEntry::new(entry.path(), is_dir)
            })
            .collect())
    }

    fn read_bytes(&self, file: &FileEntry) -> io::Result<Vec<u8>> {
        fs::read(file.path())
    }

    fn read_head(&self, file: &FileEntry, max_lines: usize) -> io::Result<Vec<String>> {
        let mut reader = BufReader::new(fs::File::open(file.path())?);
        let mut lines = Vec::with_capacity(max_lines);
        let mut buf = Vec::new();
        while lines.len() < max_lines {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buf);
            lines.push(text.trim_end_matches(['\n', '\r']).to_string());
        }
        Ok(lines)
    }

    fn create_dir(&self, parent: &FileEntry, name: &str) -> io::Result<FileEntry> {
        let path = parent.path().join(name);
        fs::create_dir(&path)?;
        Ok(FileEntry::new(path, true))
    }

    fn write_file(&self, dir: &FileEntry, name: &str, content: &[u8]) -> io::Result<FileEntry> {
        fs::create_dir_all(dir.path())?;
        let target = dir.path().join(name);
        let staging = dir.path().join(format!(".{}.partial", name));

        let result = fs::File::create(&staging)
            .and_then(|mut f| {
                f.write_all(content)?;
                f.sync_all()
            })
            .and_then(|_| fs::rename(&staging, &target));

        if let Err(e) = result {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        Ok(FileEntry::new(target, false))
    }

    fn remove_empty_dir(&self, dir: &FileEntry) -> io::Result<()> {
        fs::remove_dir(dir.path())
    }
}

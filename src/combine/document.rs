//! Markdown assembly for combined documents

use std::fmt::Write;

use chrono::NaiveDateTime;

use super::OrderedFile;
use crate::file_tree::{EditorBuffers, FileTree, read_live_text};

/// `dd-MM-yyyy hh:mm AM`
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %I:%M %p";

/// A rendered combined document, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedDocument {
    pub content: String,
    pub file_count: usize,
    /// Files whose content could not be read and was replaced by a marker.
    pub unreadable: usize,
}

/// Render the index table and one fenced section per file, in the given order.
///
/// A file that cannot be read is rendered with an inline `// Error:` marker in
/// place of its content; the rest of the document is unaffected.
pub fn render_document(
    tree: &dyn FileTree,
    buffers: &dyn EditorBuffers,
    files: &[OrderedFile],
    now: NaiveDateTime,
) -> AggregatedDocument {
    let mut out = String::new();
    let mut unreadable = 0;

    out.push_str("# Combined Codes\n\n");
    let _ = writeln!(out, "Generated on: {}", now.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Total Files: {}\n", files.len());

    out.push_str("## Index\n\n");
    out.push_str("| File Name | Source Directory | Absolute Path |\n");
    out.push_str("|---|---|---|\n");
    for file in files {
        let source_dir = file
            .entry
            .parent_name()
            .unwrap_or_else(|| "Unknown".to_string());
        let _ = writeln!(out, "| {} | {} | {} |", file.entry.name(), source_dir, file.path);
    }
    out.push('\n');

    for (index, file) in files.iter().enumerate() {
        let _ = write!(
            out,
            "## Part[{}] - {}\n\n```{}\n",
            file.label(index),
            file.entry.name(),
            file.entry.extension()
        );
        match read_live_text(tree, buffers, &file.entry) {
            Ok(text) => out.push_str(&text),
            Err(e) => {
                log::warn!("Cannot read {:?}: {}", file.entry.path(), e);
                unreadable += 1;
                let _ = write!(out, "// Error: {}", e);
            }
        }
        out.push_str("\n```\n\n");
    }

    AggregatedDocument {
        content: out,
        file_count: files.len(),
        unreadable,
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;

    use super::*;
    use crate::combine::order;
    use crate::file_tree::{FileEntry, MemoryTree, NoBuffers};
    use crate::header::HeaderInspector;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn ordered(tree: &MemoryTree, paths: &[&str]) -> Vec<OrderedFile> {
        let files = paths
            .iter()
            .map(|p| tree.entry(Path::new(p)).unwrap())
            .collect();
        order(&HeaderInspector::new(tree, &NoBuffers), files)
    }

    #[test]
    fn test_document_layout() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/src/b.go", "// [1] File: b.go\npackage b");
        tree.add_file("/p/src/a.py", "print('a')");
        let files = ordered(&tree, &["/p/src/a.py", "/p/src/b.go"]);

        let doc = render_document(&tree, &NoBuffers, &files, fixed_time());
        let expected = "# Combined Codes\n\n\
            Generated on: 09-03-2024 02:05 PM\n\
            Total Files: 2\n\n\
            ## Index\n\n\
            | File Name | Source Directory | Absolute Path |\n\
            |---|---|---|\n\
            | b.go | src | /p/src/b.go |\n\
            | a.py | src | /p/src/a.py |\n\n\
            ## Part[1] - b.go\n\n```go\n// [1] File: b.go\npackage b\n```\n\n\
            ## Part[2] - a.py\n\n```py\nprint('a')\n```\n\n";
        assert_eq!(doc.content, expected);
        assert_eq!(doc.file_count, 2);
        assert_eq!(doc.unreadable, 0);
    }

    #[test]
    fn test_unreadable_file_gets_inline_marker() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/a.go", "package a");
        tree.add_unreadable("/p/b.go");
        let files = ordered(&tree, &["/p/a.go", "/p/b.go"]);

        let doc = render_document(&tree, &NoBuffers, &files, fixed_time());
        assert!(doc.content.contains("## Part[2] - b.go\n\n```go\n// Error: "));
        assert!(doc.content.contains("package a"));
        assert_eq!(doc.unreadable, 1);
    }

    #[test]
    fn test_content_prefers_unsaved_buffer() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/a.go", "saved");
        let files = ordered(&tree, &["/p/a.go"]);
        let mut buffers = std::collections::HashMap::new();
        buffers.insert(PathBuf::from("/p/a.go"), "unsaved".to_string());

        let doc = render_document(&tree, &buffers, &files, fixed_time());
        assert!(doc.content.contains("```go\nunsaved\n```"));
    }

    #[test]
    fn test_index_paths_resolve_back_to_entries() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/src/main.go", "package main");
        tree.add_file("/p/lib/util.ts", "export {}");
        tree.add_file("/p/notes.md", "notes");
        let files = ordered(&tree, &["/p/src/main.go", "/p/lib/util.ts", "/p/notes.md"]);
        let doc = render_document(&tree, &NoBuffers, &files, fixed_time());

        let resolved: Vec<FileEntry> = doc
            .content
            .lines()
            .skip_while(|l| *l != "|---|---|---|")
            .skip(1)
            .take_while(|l| l.starts_with('|'))
            .map(|row| {
                let cells: Vec<_> = row.trim_matches('|').split(" | ").map(str::trim).collect();
                tree.entry(Path::new(cells[2])).unwrap()
            })
            .collect();

        let originals: Vec<_> = files.iter().map(|f| f.entry.clone()).collect();
        assert_eq!(resolved, originals);
    }
}

//! Deterministic file ordering

use crate::file_tree::FileEntry;
use crate::header::{HeaderInspector, PartNumber, compare_sort_keys};

/// A collected file with its sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedFile {
    pub entry: FileEntry,
    pub part: PartNumber,
    pub path: String,
}

impl OrderedFile {
    /// Section label: the explicit part number, else the 1-based position.
    pub fn label(&self, index: usize) -> String {
        match self.part {
            PartNumber::Explicit(n) => n.to_string(),
            PartNumber::Unordered => (index + 1).to_string(),
        }
    }
}

/// Sort files by part number, then by path.
pub fn order(inspector: &HeaderInspector<'_>, files: Vec<FileEntry>) -> Vec<OrderedFile> {
    let mut ordered: Vec<OrderedFile> = files
        .into_iter()
        .map(|entry| OrderedFile {
            part: inspector.extract_order_number(&entry),
            path: entry.path().to_string_lossy().to_string(),
            entry,
        })
        .collect();
    ordered.sort_by(|a, b| compare_sort_keys((a.part, &a.path), (b.part, &b.path)));
    ordered
}

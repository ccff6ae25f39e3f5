//! Candidate file collection

use crate::config::CombineConfig;
use crate::file_tree::{FileEntry, FileTree};
use crate::walker::{WalkEvent, walk};

/// Every file under `roots` that qualifies for a combined document.
///
/// Directory roots whose name is excluded contribute nothing, and no excluded
/// directory below a root is ever entered. File roots are taken as-is when
/// their extension qualifies. Overlapping roots yield duplicates.
pub fn collect(tree: &dyn FileTree, roots: &[FileEntry], config: &CombineConfig) -> Vec<FileEntry> {
    let mut files = Vec::new();
    for root in roots {
        let events = walk(
            tree,
            root.clone(),
            |dir| !config.exclusions.is_hidden(dir.name()),
            |entry| !entry.is_dir() && config.accepts_extension(entry.extension()),
        );
        for event in events {
            match event {
                WalkEvent::Visit { entry, .. } => files.push(entry),
                WalkEvent::Pruned { entry, .. } => {
                    log::debug!("Skipping excluded folder {:?}", entry.path());
                }
            }
        }
    }
    log::debug!("Collected {} files from {} roots", files.len(), roots.len());
    files
}

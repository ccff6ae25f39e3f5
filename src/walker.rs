//! Lazy depth-first walk over a [`FileTree`]
//!
//! The walk is pre-order and starts with the root itself. Sibling order is
//! whatever the tree reports; callers that need a specific order sort the
//! results afterwards.

use crate::file_tree::{FileEntry, FileTree};

/// One step of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    /// An entry accepted by the visit predicate.
    Visit { entry: FileEntry, depth: usize },
    /// A directory the descend predicate refused; reported but not expanded.
    Pruned { entry: FileEntry, depth: usize },
}

/// Iterator returned by [`walk`].
pub struct Walk<'a, D, V> {
    tree: &'a dyn FileTree,
    stack: Vec<(FileEntry, usize)>,
    should_descend: D,
    should_visit: V,
}

/// Walk `root` and everything beneath it.
///
/// Directories for which `should_descend` returns false are yielded as
/// [`WalkEvent::Pruned`] and their children are never listed. Every other
/// entry is yielded as [`WalkEvent::Visit`] when `should_visit` accepts it.
/// A directory that cannot be listed is logged and treated as empty.
pub fn walk<'a, D, V>(
    tree: &'a dyn FileTree,
    root: FileEntry,
    should_descend: D,
    should_visit: V,
) -> Walk<'a, D, V>
where
    D: FnMut(&FileEntry) -> bool,
    V: FnMut(&FileEntry) -> bool,
{
    Walk {
        tree,
        stack: vec![(root, 0)],
        should_descend,
        should_visit,
    }
}

impl<D, V> Iterator for Walk<'_, D, V>
where
    D: FnMut(&FileEntry) -> bool,
    V: FnMut(&FileEntry) -> bool,
{
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        while let Some((entry, depth)) = self.stack.pop() {
            if entry.is_dir() {
                if !(self.should_descend)(&entry) {
                    log::trace!("Pruned {:?}", entry.path());
                    return Some(WalkEvent::Pruned { entry, depth });
                }
                match self.tree.children(&entry) {
                    Ok(children) => {
                        // Reverse so the first child is popped first.
                        self.stack
                            .extend(children.into_iter().rev().map(|c| (c, depth + 1)));
                    }
                    Err(e) => {
                        log::warn!("Cannot list {:?}: {}", entry.path(), e);
                    }
                }
            }
            if (self.should_visit)(&entry) {
                return Some(WalkEvent::Visit { entry, depth });
            }
        }
        None
    }
}

//! Box-drawing tree rendering
//!
//! Lists and recurses on its own rather than through `walker::walk`, since each
//! line's prefix depends on the sorted position among its siblings.

use std::path::Path;

use crate::config::{STAGING_DIR, TreeConfig, TreeMode};
use crate::file_tree::{FileEntry, FileTree};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Running totals for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeScanState {
    pub files: usize,
    pub folders: usize,
    /// Ignored folder labels in first-seen order, without duplicates.
    pub ignored: Vec<String>,
}

impl TreeScanState {
    fn ignore(&mut self, label: String) {
        if !self.ignored.contains(&label) {
            self.ignored.push(label);
        }
    }
}

/// Rendered diagram plus its statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeResult {
    pub content: String,
    pub files: usize,
    pub folders: usize,
    pub ignored: Vec<String>,
}

struct Renderer<'a> {
    tree: &'a dyn FileTree,
    config: &'a TreeConfig,
    state: TreeScanState,
    out: String,
}

impl Renderer<'_> {
    /// Whether a child is shown at all. Excluded folders are recorded.
    fn is_shown(&mut self, entry: &FileEntry) -> bool {
        let name = entry.name();
        if entry.is_dir() && (self.config.exclusions.is_hidden(name) || name == STAGING_DIR) {
            self.state.ignore(name.to_string());
            return false;
        }
        if self.config.is_hidden_name(name) {
            return false;
        }
        entry.is_dir() || self.config.mode.shows_files()
    }

    fn visible_children(&mut self, dir: &FileEntry) -> Vec<FileEntry> {
        let children = match self.tree.children(dir) {
            Ok(children) => children,
            Err(e) => {
                log::warn!("Cannot list {:?}: {}", dir.path(), e);
                return Vec::new();
            }
        };
        let mut shown: Vec<FileEntry> =
            children.into_iter().filter(|c| self.is_shown(c)).collect();
        // Directories first, then by name.
        shown.sort_by(|a, b| {
            b.is_dir()
                .cmp(&a.is_dir())
                .then_with(|| a.name().cmp(b.name()))
        });
        shown
    }

    fn render_dir(&mut self, dir: &FileEntry, prefix: &str, depth: usize) {
        let children = self.visible_children(dir);
        let count = children.len();

        for (i, child) in children.iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            self.out.push_str(prefix);
            self.out.push_str(connector);
            self.out.push_str(child.name());
            self.out.push('\n');

            if !child.is_dir() {
                self.state.files += 1;
                continue;
            }
            self.state.folders += 1;

            if self.config.exclusions.is_terminal(child.name()) {
                self.state.ignore(format!("{} (Terminal)", child.name()));
                continue;
            }
            if self.at_depth_limit(depth) {
                continue;
            }
            let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
            self.render_dir(child, &child_prefix, depth + 1);
        }
    }

    /// Limited mode counts folders at the cutoff but does not expand them.
    fn at_depth_limit(&self, depth: usize) -> bool {
        self.config.mode == TreeMode::LimitedFoldersOnly && depth + 1 >= self.config.max_depth
    }
}

/// Label shown above a root's diagram.
///
/// `<project>/<relative path>` when the root sits below `project_root`,
/// otherwise the root's own name.
pub fn display_label(root: &FileEntry, project_root: Option<&FileEntry>) -> String {
    let Some(project) = project_root else {
        return root.name().to_string();
    };
    match root.path().strip_prefix(project.path()) {
        Ok(rel) if rel != Path::new("") => {
            let rel: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            format!("{}/{}", project.name(), rel.join("/"))
        }
        _ => root.name().to_string(),
    }
}

/// Render every root, one diagram after another.
///
/// Each diagram is the root's label, one line per shown descendant, and a
/// trailing blank line.
pub fn render(
    tree: &dyn FileTree,
    roots: &[FileEntry],
    project_root: Option<&FileEntry>,
    config: &TreeConfig,
) -> TreeResult {
    let mut renderer = Renderer {
        tree,
        config,
        state: TreeScanState::default(),
        out: String::new(),
    };

    for root in roots {
        renderer.out.push_str(&display_label(root, project_root));
        renderer.out.push('\n');
        renderer.render_dir(root, "", 0);
        renderer.out.push('\n');
    }

    log::debug!(
        "Rendered {} roots: {} folders, {} files",
        roots.len(),
        renderer.state.folders,
        renderer.state.files
    );
    TreeResult {
        content: renderer.out,
        files: renderer.state.files,
        folders: renderer.state.folders,
        ignored: renderer.state.ignored,
    }
}

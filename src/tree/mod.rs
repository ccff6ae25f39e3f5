//! Directory tree reports
//!
//! Renders one or more directories as a box-drawing diagram and files the
//! result as `<base>_R.<NN>.md` under `devOnly/Directory_Tree_Map` in the
//! project root.
//!
//! Three kinds of folder are treated specially:
//!
//! - hidden folders (and the staging folder) are left out and listed as ignored
//! - terminal folders are shown and counted but never expanded
//! - dot-prefixed names are skipped without a trace

mod render;
mod report;

pub use render::{TreeResult, TreeScanState, display_label, render};
pub use report::{TreeReport, TreeScope};

use chrono::NaiveDateTime;

use crate::config::{STAGING_DIR, TREE_OUTPUT_DIR, TreeConfig};
use crate::error::{Error, Result};
use crate::file_tree::{FileEntry, FileTree};
use crate::revision::{self, NamingScheme, ensure_path};
use crate::session::OperationLog;

/// Renders and saves tree reports for one project.
pub struct TreeGenerator<'a> {
    tree: &'a dyn FileTree,
    config: &'a TreeConfig,
    project_root: &'a FileEntry,
}

impl<'a> TreeGenerator<'a> {
    pub fn new(tree: &'a dyn FileTree, config: &'a TreeConfig, project_root: &'a FileEntry) -> Self {
        Self {
            tree,
            config,
            project_root,
        }
    }

    /// Render the directories in `scope`.
    pub fn generate(&self, scope: &TreeScope, log: &mut OperationLog) -> Result<TreeReport> {
        if matches!(scope, TreeScope::Selected(dirs) if dirs.is_empty()) {
            log.error("Error: No directories selected.");
            return Err(Error::EmptySelection("no directories selected".to_string()));
        }
        let scan_name = scope.scan_name(self.project_root);
        log.info(format!("Generating tree for: {}...", scan_name));

        let roots = scope.roots(self.project_root);
        let result = render(self.tree, &roots, Some(self.project_root), self.config);
        Ok(TreeReport {
            base_name: scope.base_name().to_string(),
            scan_name,
            result,
        })
    }

    /// Write the next revision of `report`.
    pub fn save(
        &self,
        report: &TreeReport,
        now: NaiveDateTime,
        log: &mut OperationLog,
    ) -> Result<FileEntry> {
        let saved = ensure_path(self.tree, self.project_root, &[STAGING_DIR, TREE_OUTPUT_DIR])
            .and_then(|dir| {
                let scheme = NamingScheme::Tree(report.base_name.clone());
                let name = revision::next_file_name(self.tree, &dir, &scheme);
                revision::write(self.tree, &dir, &name, &report.to_markdown(now))
            });

        match saved {
            Ok(file) => {
                log.success("Success! Tree saved.");
                log.info(format!("Name: {}", file.name()));
                if let Some(parent) = file.parent_path() {
                    log.info(format!("Path: {}", parent.display()));
                }
                Ok(file)
            }
            Err(e) => {
                log.error(format!("Failed to save file: {}", e));
                Err(e)
            }
        }
    }

    pub fn run(
        &self,
        scope: &TreeScope,
        now: NaiveDateTime,
        log: &mut OperationLog,
    ) -> Result<FileEntry> {
        let report = self.generate(scope, log)?;
        self.save(&report, now, log)
    }
}

//! Code aggregation
//!
//! Collects source files under the selected roots, orders them by their
//! `// [<n>] File:` directive (then by path) and renders them into one
//! indexed Markdown document under `devOnly/Combined_Codes`.
//!
//! # Module Structure
//!
//! - `collect` - candidate files, with folder and extension exclusions
//! - `order` - part numbers and the total sort order
//! - `document` - Markdown rendering
//! - `target` - output directory resolution

mod collect;
mod document;
mod order;
mod target;

pub use collect::collect;
pub use document::{AggregatedDocument, TIMESTAMP_FORMAT, render_document};
pub use order::{OrderedFile, order};
pub use target::resolve_output_directory;

use chrono::NaiveDateTime;

use crate::config::CombineConfig;
use crate::error::{Error, Result};
use crate::file_tree::{EditorBuffers, FileEntry, FileTree};
use crate::header::HeaderInspector;
use crate::revision::{self, NamingScheme};
use crate::session::{OperationLog, Session};
use crate::validate::SelectionMode;

/// Inputs for one combine run.
#[derive(Debug, Clone)]
pub struct CombineRequest {
    pub mode: SelectionMode,
    pub roots: Vec<FileEntry>,
    /// Output anchor for every mode except [`SelectionMode::SingleDir`].
    pub project_root: FileEntry,
}

impl CombineRequest {
    /// Directory the staging folders are created under.
    fn anchor(&self) -> &FileEntry {
        match (self.mode, self.roots.first()) {
            (SelectionMode::SingleDir, Some(dir)) => dir,
            _ => &self.project_root,
        }
    }
}

/// A rendered document and the directory it belongs in.
///
/// Kept by the caller until [`PreparedDocument::save`] succeeds, so a failed
/// write can be retried without scanning again.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub directory: FileEntry,
    pub document: AggregatedDocument,
}

impl PreparedDocument {
    /// Write the next `Combined_Codes_R<NN>.md` revision.
    pub fn save(&self, tree: &dyn FileTree, log: &mut OperationLog) -> Result<FileEntry> {
        let name = revision::next_file_name(tree, &self.directory, &NamingScheme::Combined);
        match revision::write(tree, &self.directory, &name, &self.document.content) {
            Ok(written) => {
                log.success("Success! File created.");
                log.info(format!("Name: {}", name));
                log.info(format!("Path: {}", self.directory.path().display()));
                Ok(written)
            }
            Err(e) => {
                log.error(format!("Error saving file: {}", e));
                Err(e)
            }
        }
    }
}

/// Runs the aggregation pipeline against a file tree.
pub struct Combiner<'a> {
    tree: &'a dyn FileTree,
    buffers: &'a dyn EditorBuffers,
    config: &'a CombineConfig,
}

impl<'a> Combiner<'a> {
    pub fn new(
        tree: &'a dyn FileTree,
        buffers: &'a dyn EditorBuffers,
        config: &'a CombineConfig,
    ) -> Self {
        Self {
            tree,
            buffers,
            config,
        }
    }

    fn inspector(&self) -> HeaderInspector<'a> {
        HeaderInspector::new(self.tree, self.buffers)
            .with_exempt_extensions(self.config.order_exempt_extensions.clone())
    }

    /// Collect, resolve the output directory, order and render.
    ///
    /// Nothing is written except the output directories themselves.
    pub fn prepare(
        &self,
        request: &CombineRequest,
        now: NaiveDateTime,
        log: &mut OperationLog,
    ) -> Result<PreparedDocument> {
        if request.roots.is_empty() {
            log.error("No files selected. Please add items first.");
            return Err(Error::EmptySelection("no files selected".to_string()));
        }
        log.info("Starting combination process...");

        let files = collect(self.tree, &request.roots, self.config);
        if files.is_empty() {
            log.error("No valid files found in selection (Check exclusions).");
            return Err(Error::EmptySelection(
                "no valid files found in selection".to_string(),
            ));
        }

        let inspector = self.inspector();
        let directory = resolve_output_directory(self.tree, &inspector, request.anchor(), &files)
            .inspect_err(|_| log.error("Failed to create/find target directory."))?;

        let ordered = order(&inspector, files);
        let document = render_document(self.tree, self.buffers, &ordered, now);
        if document.unreadable > 0 {
            log.warning(format!(
                "{} file(s) could not be read and were marked inline.",
                document.unreadable
            ));
        }
        Ok(PreparedDocument {
            directory,
            document,
        })
    }

    /// Prepare and save the session's selection, marking it succeeded.
    pub fn run(
        &self,
        session: &mut Session,
        project_root: FileEntry,
        now: NaiveDateTime,
    ) -> Result<FileEntry> {
        let request = CombineRequest {
            mode: session.mode(),
            roots: session.selected().to_vec(),
            project_root,
        };
        let prepared = self.prepare(&request, now, session.log_mut())?;
        let written = prepared.save(self.tree, session.log_mut())?;
        session.mark_succeeded();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;

    use super::*;
    use crate::config::Settings;
    use crate::file_tree::{MemoryTree, NoBuffers};
    use crate::session::SessionSnapshot;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn project() -> MemoryTree {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/api/main.go", "// [1] File: main.go\npackage main");
        tree.add_file("/p/api/util.go", "package main");
        tree.add_file("/p/web/app.ts", "export {}");
        tree
    }

    fn entry(tree: &MemoryTree, path: &str) -> FileEntry {
        tree.entry(Path::new(path)).unwrap()
    }

    fn config() -> CombineConfig {
        CombineConfig::from_settings(&Settings::default()).unwrap()
    }

    #[test]
    fn test_single_dir_writes_under_selected_directory() {
        let tree = project();
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);
        let mut session = Session::new(SelectionMode::SingleDir);
        let request = CombineRequest {
            mode: SelectionMode::SingleDir,
            roots: vec![entry(&tree, "/p/api")],
            project_root: entry(&tree, "/p"),
        };

        let prepared = combiner.prepare(&request, now(), session.log_mut()).unwrap();
        let written = prepared.save(&tree, session.log_mut()).unwrap();
        assert_eq!(
            written.path(),
            Path::new("/p/api/devOnly/Combined_Codes/Combined_Codes_R00.md")
        );
        let content = tree.contents(written.path()).unwrap();
        assert!(content.contains("Total Files: 2"));
        assert!(content.contains("## Part[1] - main.go"));
        assert!(content.contains("## Part[2] - util.go"));
    }

    #[test]
    fn test_multi_dir_writes_under_project_root() {
        let tree = project();
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);
        let request = CombineRequest {
            mode: SelectionMode::MultiDir,
            roots: vec![entry(&tree, "/p/api"), entry(&tree, "/p/web")],
            project_root: entry(&tree, "/p"),
        };
        let mut log = OperationLog::new();

        let prepared = combiner.prepare(&request, now(), &mut log).unwrap();
        assert_eq!(prepared.directory.path(), Path::new("/p/devOnly/Combined_Codes"));
        assert_eq!(prepared.document.file_count, 3);
    }

    #[test]
    fn test_empty_selection_and_no_valid_files() {
        let tree = project();
        tree.add_file("/p/assets/logo.png", "");
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);
        let mut log = OperationLog::new();

        let empty = CombineRequest {
            mode: SelectionMode::MultiDir,
            roots: vec![],
            project_root: entry(&tree, "/p"),
        };
        let err = combiner.prepare(&empty, now(), &mut log).unwrap_err();
        assert!(matches!(err, Error::EmptySelection(_)));

        let images = CombineRequest {
            roots: vec![entry(&tree, "/p/assets")],
            ..empty
        };
        let err = combiner.prepare(&images, now(), &mut log).unwrap_err();
        assert!(matches!(err, Error::EmptySelection(_)));
        assert!(!err.is_directory_failure());
        assert!(!tree.exists("/p/devOnly"));
        assert_eq!(
            log.messages().last(),
            Some("No valid files found in selection (Check exclusions).")
        );
    }

    #[test]
    fn test_directory_failure_is_reported_distinctly() {
        let tree = project();
        tree.deny_create("/p/devOnly");
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);
        let request = CombineRequest {
            mode: SelectionMode::MultiDir,
            roots: vec![entry(&tree, "/p/api")],
            project_root: entry(&tree, "/p"),
        };
        let mut log = OperationLog::new();

        let err = combiner.prepare(&request, now(), &mut log).unwrap_err();
        assert!(err.is_directory_failure());
        assert_eq!(log.messages().last(), Some("Failed to create/find target directory."));
    }

    #[test]
    fn test_failed_save_can_be_retried() {
        let tree = project();
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);
        let request = CombineRequest {
            mode: SelectionMode::MultiDir,
            roots: vec![entry(&tree, "/p/web")],
            project_root: entry(&tree, "/p"),
        };
        let mut log = OperationLog::new();
        let prepared = combiner.prepare(&request, now(), &mut log).unwrap();

        tree.fail_writes(true);
        assert!(matches!(prepared.save(&tree, &mut log), Err(Error::Write { .. })));
        assert!(!tree.exists("/p/devOnly/Combined_Codes/Combined_Codes_R00.md"));

        tree.fail_writes(false);
        let written = prepared.save(&tree, &mut log).unwrap();
        assert_eq!(written.name(), "Combined_Codes_R00.md");
    }

    #[test]
    fn test_repeated_runs_increment_revision() {
        let tree = project();
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);

        for expected in ["Combined_Codes_R00.md", "Combined_Codes_R01.md"] {
            let snapshot = SessionSnapshot {
                mode: SelectionMode::MultiDir,
                selected: vec![PathBuf::from("/p/api")],
                log: OperationLog::new(),
            };
            let mut session = Session::restore(snapshot, &tree);
            let written = combiner.run(&mut session, entry(&tree, "/p"), now()).unwrap();
            assert_eq!(written.name(), expected);
            assert!(session.succeeded());
        }
    }

    #[test]
    fn test_previous_output_is_never_collected() {
        let tree = project();
        let config = config();
        let combiner = Combiner::new(&tree, &NoBuffers, &config);
        let request = CombineRequest {
            mode: SelectionMode::MultiDir,
            roots: vec![entry(&tree, "/p")],
            project_root: entry(&tree, "/p"),
        };
        let mut log = OperationLog::new();

        let first = combiner.prepare(&request, now(), &mut log).unwrap();
        first.save(&tree, &mut log).unwrap();
        let second = combiner.prepare(&request, now(), &mut log).unwrap();
        assert_eq!(first.document.file_count, second.document.file_count);
    }
}

//! Pre-flight checks for items added to a combine selection
//!
//! Nothing is added while any finding remains. Mode mismatches and excluded
//! folders are rejected before their contents are scanned.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ExclusionSet;
use crate::file_tree::{FileEntry, FileTree};
use crate::header::HeaderInspector;
use crate::walker::{WalkEvent, walk};

/// What kind of items a combine selection holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Exactly one directory; output goes under it.
    #[default]
    SingleDir,
    /// Any number of directories; output goes under the project root.
    MultiDir,
    /// Any number of individual files.
    SpecificFiles,
}

impl SelectionMode {
    pub fn display_name(self) -> &'static str {
        match self {
            SelectionMode::SingleDir => "Single Directory",
            SelectionMode::MultiDir => "Multiple Directories",
            SelectionMode::SpecificFiles => "Specific Files",
        }
    }

    pub fn accepts_directories(self) -> bool {
        self != SelectionMode::SpecificFiles
    }
}

/// Host query for compiler or linter problems.
pub trait Diagnostics {
    fn has_problems(&self, entry: &FileEntry) -> bool;
}

/// No problem source attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn has_problems(&self, _entry: &FileEntry) -> bool {
        false
    }
}

/// Paths known to have problems.
impl Diagnostics for HashSet<PathBuf> {
    fn has_problems(&self, entry: &FileEntry) -> bool {
        self.contains(entry.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One reason an item cannot be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Checks items against the selection mode, exclusions, diagnostics and the
/// mandatory header rules.
pub struct Validator<'a> {
    tree: &'a dyn FileTree,
    inspector: &'a HeaderInspector<'a>,
    diagnostics: &'a dyn Diagnostics,
    exclusions: &'a ExclusionSet,
}

impl<'a> Validator<'a> {
    pub fn new(
        tree: &'a dyn FileTree,
        inspector: &'a HeaderInspector<'a>,
        diagnostics: &'a dyn Diagnostics,
        exclusions: &'a ExclusionSet,
    ) -> Self {
        Self {
            tree,
            inspector,
            diagnostics,
            exclusions,
        }
    }

    /// Reject excluded folders and items of the wrong kind for `mode`.
    pub fn check_mode(&self, entry: &FileEntry, mode: SelectionMode) -> Option<Finding> {
        let name = entry.name();
        if entry.is_dir() && self.exclusions.is_hidden(name) {
            return Some(Finding::warning(format!(
                "Folder '{}' is excluded in Settings.",
                name
            )));
        }
        match (mode.accepts_directories(), entry.is_dir()) {
            (true, false) => Some(Finding::warning(format!(
                "Ignored '{}': Mode is '{}'.",
                name,
                mode.display_name()
            ))),
            (false, true) => Some(Finding::warning(format!(
                "Ignored folder '{}': Mode is '{}'.",
                name,
                mode.display_name()
            ))),
            _ => None,
        }
    }

    /// Validate a file, or every non-dot file beneath a directory.
    pub fn deep_validate(&self, entry: &FileEntry) -> Vec<Finding> {
        if !entry.is_dir() {
            return self.validate_file(entry);
        }

        let mut findings = Vec::new();
        let mut empty = true;
        let events = walk(
            self.tree,
            entry.clone(),
            |dir| dir == entry || !self.exclusions.is_hidden(dir.name()),
            |e| !e.is_dir() && !e.name().starts_with('.'),
        );
        for event in events {
            if let WalkEvent::Visit { entry: file, .. } = event {
                empty = false;
                findings.extend(self.validate_file(&file));
            }
        }
        if empty {
            findings.push(Finding::warning(format!(
                "WARNING: Directory '{}' is empty.",
                entry.name()
            )));
        }
        findings
    }

    fn validate_file(&self, file: &FileEntry) -> Vec<Finding> {
        let mut findings = Vec::new();
        if self.diagnostics.has_problems(file) {
            findings.push(Finding::error(format!(
                "ERROR: '{}' has syntax errors.",
                file.name()
            )));
        }
        let missing = self.inspector.find_missing_directives(file);
        if !missing.is_empty() {
            findings.push(Finding::warning(format!(
                "WARNING: '{}' is missing/empty: [{}]",
                file.name(),
                missing.join(", ")
            )));
        }
        findings
    }

    /// Validate every item; an empty result means all of them may be added.
    ///
    /// An item failing the mode check is not scanned further.
    pub fn validate_selection(&self, items: &[FileEntry], mode: SelectionMode) -> Vec<Finding> {
        let mut findings = Vec::new();
        for item in items {
            match self.check_mode(item, mode) {
                Some(finding) => findings.push(finding),
                None => findings.extend(self.deep_validate(item)),
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::{CombineConfig, Settings};
    use crate::file_tree::{MemoryTree, NoBuffers};

    const GOOD_HEADER: &str =
        "// [1] File: main.go\n// Version: 1\n// Description: entry\n// TAG: core\npackage main\n";

    fn exclusions() -> ExclusionSet {
        CombineConfig::from_settings(&Settings::default())
            .unwrap()
            .exclusions
    }

    fn entry(tree: &MemoryTree, path: &str) -> FileEntry {
        tree.entry(Path::new(path)).unwrap()
    }

    #[test]
    fn test_mode_mismatch() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/src/main.go", GOOD_HEADER);
        tree.add_dir("/p/node_modules");
        let inspector = HeaderInspector::new(&tree, &NoBuffers);
        let excl = exclusions();
        let validator = Validator::new(&tree, &inspector, &NoDiagnostics, &excl);

        let file = entry(&tree, "/p/src/main.go");
        let dir = entry(&tree, "/p/src");
        assert_eq!(
            validator.check_mode(&file, SelectionMode::SingleDir).unwrap().message,
            "Ignored 'main.go': Mode is 'Single Directory'."
        );
        assert_eq!(
            validator.check_mode(&dir, SelectionMode::SpecificFiles).unwrap().message,
            "Ignored folder 'src': Mode is 'Specific Files'."
        );
        assert!(validator.check_mode(&dir, SelectionMode::MultiDir).is_none());
        assert_eq!(
            validator
                .check_mode(&entry(&tree, "/p/node_modules"), SelectionMode::MultiDir)
                .unwrap()
                .message,
            "Folder 'node_modules' is excluded in Settings."
        );
    }

    #[test]
    fn test_problem_file_is_error_and_missing_header_is_warning() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/src/main.go", GOOD_HEADER);
        tree.add_file("/p/src/util.py", "# File: util.py\nimport os\n");
        let problems: HashSet<PathBuf> = [PathBuf::from("/p/src/main.go")].into_iter().collect();
        let inspector = HeaderInspector::new(&tree, &NoBuffers);
        let excl = exclusions();
        let validator = Validator::new(&tree, &inspector, &problems, &excl);

        let findings = validator.deep_validate(&entry(&tree, "/p/src"));
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].message, "ERROR: 'main.go' has syntax errors.");
        assert_eq!(findings[1].severity, Severity::Warning);
        assert_eq!(
            findings[1].message,
            "WARNING: 'util.py' is missing/empty: [Version, Description, TAG]"
        );
    }

    #[test]
    fn test_directory_with_only_dot_files_is_empty() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/conf/.env", "SECRET=1");
        tree.add_file("/p/conf/dist/bundle.js", "");
        let inspector = HeaderInspector::new(&tree, &NoBuffers);
        let excl = exclusions();
        let validator = Validator::new(&tree, &inspector, &NoDiagnostics, &excl);

        let findings = validator.deep_validate(&entry(&tree, "/p/conf"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "WARNING: Directory 'conf' is empty.");
    }

    #[test]
    fn test_clean_selection_has_no_findings() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/src/main.go", GOOD_HEADER);
        tree.add_file("/p/src/data.json", "{}");
        let inspector = HeaderInspector::new(&tree, &NoBuffers);
        let excl = exclusions();
        let validator = Validator::new(&tree, &inspector, &NoDiagnostics, &excl);

        let items = vec![entry(&tree, "/p/src")];
        assert!(validator.validate_selection(&items, SelectionMode::SingleDir).is_empty());
    }

    #[test]
    fn test_mode_failure_skips_deep_scan() {
        let tree = MemoryTree::new("/p");
        tree.add_file("/p/src/util.py", "import os\n");
        let inspector = HeaderInspector::new(&tree, &NoBuffers);
        let excl = exclusions();
        let validator = Validator::new(&tree, &inspector, &NoDiagnostics, &excl);

        let items = vec![entry(&tree, "/p/src")];
        let findings = validator.validate_selection(&items, SelectionMode::SpecificFiles);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("Ignored folder 'src'"));
    }
}

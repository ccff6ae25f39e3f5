//! Tree report scope and Markdown layout

use chrono::NaiveDateTime;

use super::TreeResult;
use crate::combine::TIMESTAMP_FORMAT;
use crate::file_tree::FileEntry;

const ROOT_BASE_NAME: &str = "rootDirectoryTree";
const SELECTED_BASE_NAME: &str = "SelectedDirectoryTree";

/// Which directories a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeScope {
    ProjectRoot,
    Selected(Vec<FileEntry>),
}

impl TreeScope {
    /// Base of the output file name.
    pub fn base_name(&self) -> &'static str {
        match self {
            TreeScope::ProjectRoot => ROOT_BASE_NAME,
            TreeScope::Selected(_) => SELECTED_BASE_NAME,
        }
    }

    /// Human-readable description of what was scanned.
    pub fn scan_name(&self, project_root: &FileEntry) -> String {
        match self {
            TreeScope::ProjectRoot => format!("Project Root ({})", project_root.name()),
            TreeScope::Selected(dirs) => match dirs.as_slice() {
                [only] => only.name().to_string(),
                many => format!("Multiple Directories ({})", many.len()),
            },
        }
    }

    pub fn roots(&self, project_root: &FileEntry) -> Vec<FileEntry> {
        match self {
            TreeScope::ProjectRoot => vec![project_root.clone()],
            TreeScope::Selected(dirs) => dirs.clone(),
        }
    }
}

/// A rendered tree with the names needed to file it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    pub base_name: String,
    pub scan_name: String,
    pub result: TreeResult,
}

impl TreeReport {
    pub fn to_markdown(&self, now: NaiveDateTime) -> String {
        let ignored = if self.result.ignored.is_empty() {
            "None".to_string()
        } else {
            self.result.ignored.join(", ")
        };
        format!(
            "# Directory Tree for: {}\n\n\
             ## Project Information\n\
             - **Date and Time**: {}\n\
             - **Total Folders**: {}\n\
             - **Total Files**: {}\n\
             - **Ignored Folders**: {}\n\n\
             ```text\n{}```",
            self.scan_name,
            now.format(TIMESTAMP_FORMAT),
            self.result.folders,
            self.result.files,
            ignored,
            self.result.content
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_scan_names() {
        let project = FileEntry::new("/work/shop", true);
        let api = FileEntry::new("/work/shop/api", true);
        let web = FileEntry::new("/work/shop/web", true);

        assert_eq!(TreeScope::ProjectRoot.scan_name(&project), "Project Root (shop)");
        assert_eq!(TreeScope::Selected(vec![api.clone()]).scan_name(&project), "api");
        assert_eq!(
            TreeScope::Selected(vec![api, web]).scan_name(&project),
            "Multiple Directories (2)"
        );
        assert_eq!(TreeScope::ProjectRoot.base_name(), "rootDirectoryTree");
    }

    #[test]
    fn test_markdown_layout() {
        let report = TreeReport {
            base_name: ROOT_BASE_NAME.to_string(),
            scan_name: "Project Root (shop)".to_string(),
            result: TreeResult {
                content: "shop\n└── src\n\n".to_string(),
                files: 0,
                folders: 1,
                ignored: vec!["dist".to_string(), "node_modules (Terminal)".to_string()],
            },
        };
        let now = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(0, 15, 0)
            .unwrap();

        assert_eq!(
            report.to_markdown(now),
            "# Directory Tree for: Project Root (shop)\n\n\
             ## Project Information\n\
             - **Date and Time**: 31-12-2025 12:15 AM\n\
             - **Total Folders**: 1\n\
             - **Total Files**: 0\n\
             - **Ignored Folders**: dist, node_modules (Terminal)\n\n\
             ```text\nshop\n└── src\n\n```"
        );
    }

    #[test]
    fn test_no_ignored_folders_reads_none() {
        let report = TreeReport {
            base_name: SELECTED_BASE_NAME.to_string(),
            scan_name: "api".to_string(),
            result: TreeResult::default(),
        };
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(report.to_markdown(now).contains("- **Ignored Folders**: None\n"));
    }
}

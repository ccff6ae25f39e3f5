//! Settings and per-invocation scan configuration

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Staging folder that holds every generated document.
pub const STAGING_DIR: &str = "devOnly";
/// Sub-folder of [`STAGING_DIR`] for combined code documents.
pub const COMBINED_OUTPUT_DIR: &str = "Combined_Codes";
/// Sub-folder of [`STAGING_DIR`] for directory tree reports.
pub const TREE_OUTPUT_DIR: &str = "Directory_Tree_Map";
/// Extensions whose files must carry the full header block.
pub const MANDATORY_HEADER_EXTENSIONS: &[&str] = &["py", "ts", "js", "go"];
/// Settings file looked up in the project root.
pub const SETTINGS_FILE_NAME: &str = ".codebind.json";

/// Depth used by the tree modes that have no user-supplied limit.
const UNLIMITED_DEPTH: usize = 100;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// User-editable settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folders never entered when combining code.
    pub excluded_folders: Vec<String>,
    /// Extensions never combined (compared lowercase).
    pub excluded_extensions: Vec<String>,
    /// Extensions whose headers are not scanned for an order directive.
    pub header_scanning_exceptions: Vec<String>,
    /// Folders left out of a tree report entirely.
    pub tree_excluded_folders: Vec<String>,
    /// Folders shown in a tree report but never expanded.
    pub tree_terminal_folders: Vec<String>,
    /// Names starting with this marker are hidden from tree reports.
    pub hide_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            excluded_folders: strings(&[
                ".git", ".idea", "node_modules", "dist", "build", "out", "coverage", ".gradle",
            ]),
            excluded_extensions: strings(&[
                "exe", "dll", "class", "jar", "png", "jpg", "jpeg", "gif", "ico", "zip", "tar",
                "gz",
            ]),
            header_scanning_exceptions: strings(&[
                "json",
                "md",
                "txt",
                "xml",
                "html",
                "css",
                "yaml",
                "yml",
                "properties",
                "gitignore",
            ]),
            tree_excluded_folders: strings(&[".git", ".idea", ".output", "dist", "archive", STAGING_DIR]),
            tree_terminal_folders: strings(&["node_modules", ".nuxt", ".data"]),
            hide_prefix: ".".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `<project_root>/.codebind.json` if it exists, else defaults.
    pub fn discover(project_root: &Path) -> Result<Self> {
        let candidate = project_root.join(SETTINGS_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Loading settings from {:?}", candidate);
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Folder names that are never entered.
///
/// `hidden` folders are not descended into; `terminal` folders may be shown
/// but are never expanded. Membership is an exact, case-sensitive match on
/// the folder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    hidden: BTreeSet<String>,
    terminal: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new<H, T>(hidden: H, terminal: T) -> Result<Self>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let hidden: BTreeSet<String> = hidden.into_iter().map(Into::into).collect();
        let terminal: BTreeSet<String> = terminal.into_iter().map(Into::into).collect();
        if let Some(name) = hidden.intersection(&terminal).next() {
            return Err(Error::InvalidConfiguration(format!(
                "folder '{}' is both hidden and terminal",
                name
            )));
        }
        Ok(Self { hidden, terminal })
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminal.contains(name)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }

    /// Copy of this set with extra hidden names.
    pub fn with_hidden<'a>(&self, extra: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let hidden = self.hidden.iter().cloned().chain(extra.into_iter().map(str::to_string));
        Self::new(hidden, self.terminal.iter().cloned())
    }
}

/// Configuration for one aggregation pass.
#[derive(Debug, Clone)]
pub struct CombineConfig {
    /// Configured exclusions plus the two staging folder names.
    pub exclusions: ExclusionSet,
    /// Lowercase extensions that are never collected.
    pub excluded_extensions: BTreeSet<String>,
    /// Lowercase extensions exempt from order detection.
    pub order_exempt_extensions: BTreeSet<String>,
}

impl CombineConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let exclusions =
            ExclusionSet::new(settings.excluded_folders.iter().cloned(), Vec::<String>::new())?
                .with_hidden([STAGING_DIR, COMBINED_OUTPUT_DIR])?;
        Ok(Self {
            exclusions,
            excluded_extensions: lowercase_set(&settings.excluded_extensions),
            order_exempt_extensions: lowercase_set(&settings.header_scanning_exceptions),
        })
    }

    /// A file qualifies when it has an extension that is not excluded.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        !ext.is_empty() && !self.excluded_extensions.contains(&ext)
    }
}

fn lowercase_set(items: &[String]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

/// What a tree report shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TreeMode {
    /// Files and folders, unlimited depth.
    #[default]
    Full,
    /// Folders only, unlimited depth.
    FoldersOnly,
    /// Folders only, stopping at a depth limit.
    LimitedFoldersOnly,
}

impl TreeMode {
    pub fn shows_files(self) -> bool {
        self == TreeMode::Full
    }
}

/// Configuration for one tree pass.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub mode: TreeMode,
    pub max_depth: usize,
    pub exclusions: ExclusionSet,
    pub hide_prefix: String,
}

impl TreeConfig {
    /// Build and validate a tree configuration.
    ///
    /// `max_depth` only matters in [`TreeMode::LimitedFoldersOnly`], where it
    /// must be at least 1.
    pub fn new(settings: &Settings, mode: TreeMode, max_depth: Option<usize>) -> Result<Self> {
        let max_depth = match mode {
            TreeMode::LimitedFoldersOnly => match max_depth {
                Some(depth) if depth >= 1 => depth,
                Some(depth) => {
                    return Err(Error::InvalidConfiguration(format!(
                        "depth limit must be at least 1, got {}",
                        depth
                    )));
                }
                None => {
                    return Err(Error::InvalidConfiguration(
                        "limited mode requires a depth limit".to_string(),
                    ));
                }
            },
            _ => UNLIMITED_DEPTH,
        };
        let exclusions = ExclusionSet::new(
            settings.tree_excluded_folders.iter().cloned(),
            settings.tree_terminal_folders.iter().cloned(),
        )?;
        Ok(Self {
            mode,
            max_depth,
            exclusions,
            hide_prefix: settings.hide_prefix.clone(),
        })
    }

    /// Whether a name carries the hide marker.
    pub fn is_hidden_name(&self, name: &str) -> bool {
        !self.hide_prefix.is_empty() && name.starts_with(&self.hide_prefix)
    }
}

//! Error types shared by the aggregation and tree pipelines

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced to callers.
///
/// Per-file read failures are usually absorbed by the engines (an inline
/// marker in a combined document, the unordered sentinel for a header scan),
/// so `Read` only escapes from the low-level file tree helpers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory '{name}' in '{parent}': {source}")]
    DirectoryCreate {
        parent: PathBuf,
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("'{0}' exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0}")]
    EmptySelection(String),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load settings from '{path}': {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// True for failures while preparing the output directory, as opposed to
    /// an empty selection or a failed write.
    pub fn is_directory_failure(&self) -> bool {
        matches!(self, Error::DirectoryCreate { .. } | Error::NotADirectory(_))
    }
}

//! Codebind - bind source files into one indexed document, or map a
//! directory tree to Markdown
//!
//! Both pipelines write revision-numbered files under a `devOnly` staging
//! folder and report what they did through an [`OperationLog`].

pub mod combine;
pub mod config;
pub mod error;
pub mod file_tree;
pub mod header;
pub mod output;
pub mod revision;
pub mod session;
pub mod tree;
pub mod validate;
pub mod walker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use combine::{CombineRequest, Combiner, PreparedDocument};
pub use config::{CombineConfig, ExclusionSet, Settings, TreeConfig, TreeMode};
pub use error::{Error, Result};
pub use file_tree::{DiskTree, EditorBuffers, FileEntry, FileTree, MemoryTree, NoBuffers};
pub use header::{HeaderInspector, PartNumber};
pub use output::{print_log, write_log};
pub use session::{LogEntry, LogLevel, OperationLog, Session, SessionSnapshot};
pub use tree::{TreeGenerator, TreeReport, TreeResult, TreeScope};
pub use validate::{Diagnostics, Finding, NoDiagnostics, SelectionMode, Severity, Validator};

//! Operation log and the caller-owned selection session
//!
//! The log is what a user sees: an append-only list of timestamped outcomes.
//! Diagnostic detail goes through the `log` facade instead.

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::file_tree::{FileEntry, FileTree};
use crate::validate::{Finding, SelectionMode, Severity, Validator};

/// `hh:mm:ss AM`
pub const LOG_TIME_FORMAT: &str = "%I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: NaiveTime,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.time.format(LOG_TIME_FORMAT), self.message)
    }
}

/// Sequential record of everything an operation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    entries: Vec<LogEntry>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push_at(Local::now().time(), level, message);
    }

    pub fn push_at(&mut self, time: NaiveTime, level: LogLevel, message: impl Into<String>) {
        self.entries.push(LogEntry {
            time,
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Messages only, without timestamps.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }
}

impl From<&Finding> for LogLevel {
    fn from(finding: &Finding) -> Self {
        match finding.severity {
            Severity::Warning => LogLevel::Warning,
            Severity::Error => LogLevel::Error,
        }
    }
}

/// Saved state of a session that closed without a successful combine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: SelectionMode,
    pub selected: Vec<PathBuf>,
    pub log: OperationLog,
}

/// A combine selection being built up, plus its log.
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: SelectionMode,
    selected: Vec<FileEntry>,
    log: OperationLog,
    succeeded: bool,
}

impl Session {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Rebuild a session, dropping paths that no longer exist.
    pub fn restore(snapshot: SessionSnapshot, tree: &dyn FileTree) -> Self {
        let selected = snapshot
            .selected
            .iter()
            .filter_map(|path| {
                let entry = tree.entry(path);
                if entry.is_none() {
                    log::debug!("Dropping vanished selection {:?}", path);
                }
                entry
            })
            .collect();
        Self {
            mode: snapshot.mode,
            selected,
            log: snapshot.log,
            succeeded: false,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected(&self) -> &[FileEntry] {
        &self.selected
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut OperationLog {
        &mut self.log
    }

    /// Switch mode, clearing the selection and the log.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        self.selected.clear();
        self.log.clear();
    }

    /// Validate `items` and add them if nothing was found.
    ///
    /// Returns whether the items were accepted. In single-directory mode the
    /// first item replaces the current selection.
    pub fn add(&mut self, validator: &Validator<'_>, items: Vec<FileEntry>) -> bool {
        let findings = validator.validate_selection(&items, self.mode);
        if !findings.is_empty() {
            for finding in &findings {
                self.log.push(finding.into(), finding.message.clone());
            }
            self.log.error("Action Blocked. Please fix errors and retry.");
            return false;
        }
        let Some(first) = items.first() else {
            return false;
        };

        match self.mode {
            SelectionMode::SingleDir => {
                if let Some(old) = self.selected.first() {
                    if old.path() != first.path() {
                        self.log.info(format!(
                            "Switched directory: '{}' -> '{}'",
                            old.name(),
                            first.name()
                        ));
                    }
                }
                self.selected = vec![first.clone()];
                self.log.success(format!("Set directory: '{}'", first.name()));
            }
            SelectionMode::MultiDir | SelectionMode::SpecificFiles => {
                let mut added = 0;
                for item in items {
                    if !self.selected.contains(&item) {
                        self.log.success(format!("Added: '{}'", item.name()));
                        self.selected.push(item);
                        added += 1;
                    }
                }
                if added == 0 {
                    self.log.info("Items already in list.");
                }
            }
        }
        true
    }

    /// Remove the items at `indices`. Out-of-range indices are ignored.
    pub fn remove(&mut self, indices: &[usize]) {
        let mut indices: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.selected.len())
            .collect();
        indices.sort_unstable();
        indices.dedup();

        match indices.as_slice() {
            [] => return,
            [only] => {
                let message = format!("Removed: '{}'", self.selected[*only].name());
                self.log.warning(message);
            }
            many => self.log.warning(format!("Removed {} items.", many.len())),
        }
        for i in indices.into_iter().rev() {
            self.selected.remove(i);
        }
    }

    /// Note that a combine finished; the session will not be kept on close.
    pub fn mark_succeeded(&mut self) {
        self.succeeded = true;
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// End the session. A snapshot is returned unless a combine succeeded.
    pub fn close(self) -> Option<SessionSnapshot> {
        if self.succeeded {
            return None;
        }
        Some(SessionSnapshot {
            mode: self.mode,
            selected: self
                .selected
                .iter()
                .map(|e| e.path().to_path_buf())
                .collect(),
            log: self.log,
        })
    }
}

//! Header-comment directives
//!
//! Source files may open with a small block of `Key: value` directives:
//!
//! ```text
//! // [3] File: handlers.go
//! // Version: 1.2
//! // Description: HTTP handlers
//! // TAG: billing
//! ```
//!
//! `// [<n>] File:` fixes the file's position in a combined document, `TAG:`
//! names the output sub-folder, and the four directives together form the
//! mandatory header for the languages in [`MANDATORY_HEADER_EXTENSIONS`].

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::MANDATORY_HEADER_EXTENSIONS;
use crate::file_tree::{EditorBuffers, FileEntry, FileTree, read_live_head};

/// Lines scanned for the order and tag directives.
pub const ORDER_SCAN_LINES: usize = 15;
/// Lines scanned for the mandatory directives.
pub const VALIDATION_SCAN_LINES: usize = 20;

/// Templates with ambiguous comment syntax never carry an order directive.
const ALWAYS_UNORDERED_EXTENSION: &str = "vue";

static ORDER_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)//\s*\[(\d+)\]\s*File:").expect("ORDER_DIRECTIVE regex is invalid")
});

static TAG_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)TAG:[ \t]*(\S+)").expect("TAG_DIRECTIVE regex is invalid")
});

/// A directive that must appear, with a value, in a mandatory header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    File,
    Version,
    Description,
    Tag,
}

impl Directive {
    pub const MANDATORY: [Directive; 4] = [
        Directive::File,
        Directive::Version,
        Directive::Description,
        Directive::Tag,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Directive::File => "File",
            Directive::Version => "Version",
            Directive::Description => "Description",
            Directive::Tag => "TAG",
        }
    }

    fn pattern(self) -> &'static Regex {
        static FILE: LazyLock<Regex> = LazyLock::new(|| directive_regex("File"));
        static VERSION: LazyLock<Regex> = LazyLock::new(|| directive_regex("Version"));
        static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| directive_regex("Description"));
        static TAG: LazyLock<Regex> = LazyLock::new(|| directive_regex("TAG"));
        match self {
            Directive::File => &FILE,
            Directive::Version => &VERSION,
            Directive::Description => &DESCRIPTION,
            Directive::Tag => &TAG,
        }
    }
}

fn directive_regex(key: &str) -> Regex {
    Regex::new(&format!(r"(?i){}:[ \t]*\S+", key)).expect("directive regex is invalid")
}

/// Position of a file in a combined document.
///
/// Explicit numbers sort before [`PartNumber::Unordered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartNumber {
    Explicit(u32),
    Unordered,
}

impl fmt::Display for PartNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartNumber::Explicit(n) => write!(f, "{}", n),
            PartNumber::Unordered => write!(f, "unordered"),
        }
    }
}

/// Reported in place of directive names when the header cannot be read.
pub const UNREADABLE: &str = "Unreadable";

/// Reads file headers and extracts directives from them.
pub struct HeaderInspector<'a> {
    tree: &'a dyn FileTree,
    buffers: &'a dyn EditorBuffers,
    exempt_extensions: BTreeSet<String>,
}

impl<'a> HeaderInspector<'a> {
    pub fn new(tree: &'a dyn FileTree, buffers: &'a dyn EditorBuffers) -> Self {
        Self {
            tree,
            buffers,
            exempt_extensions: BTreeSet::new(),
        }
    }

    /// Extensions (lowercase) whose files are never order-directed.
    pub fn with_exempt_extensions(mut self, extensions: BTreeSet<String>) -> Self {
        self.exempt_extensions = extensions;
        self
    }

    /// First `max_lines` lines of the file's current text.
    pub fn read_header(&self, entry: &FileEntry, max_lines: usize) -> std::io::Result<Vec<String>> {
        read_live_head(self.tree, self.buffers, entry, max_lines)
    }

    /// Number from the first `// [<n>] File:` line in the header.
    ///
    /// Read errors, exempt extensions and numbers too large to represent all
    /// yield [`PartNumber::Unordered`].
    pub fn extract_order_number(&self, entry: &FileEntry) -> PartNumber {
        if entry.extension() == ALWAYS_UNORDERED_EXTENSION
            || self
                .exempt_extensions
                .contains(&entry.extension().to_lowercase())
        {
            return PartNumber::Unordered;
        }

        let lines = match self.read_header(entry, ORDER_SCAN_LINES) {
            Ok(lines) => lines,
            Err(e) => {
                log::debug!("Order scan skipped for {:?}: {}", entry.path(), e);
                return PartNumber::Unordered;
            }
        };

        lines
            .iter()
            .find_map(|line| ORDER_DIRECTIVE.captures(line.trim()))
            .and_then(|caps| caps[1].parse().ok())
            .map_or(PartNumber::Unordered, PartNumber::Explicit)
    }

    /// The `TAG:` value shared by every entry, lowercased.
    ///
    /// Returns `None` when the list is empty, or when any entry is unreadable,
    /// lacks the directive, or disagrees with the others (ignoring case).
    pub fn extract_common_tag(&self, entries: &[FileEntry]) -> Option<String> {
        let mut common: Option<String> = None;
        for entry in entries {
            let header = match self.read_header(entry, ORDER_SCAN_LINES) {
                Ok(lines) => lines.join("\n"),
                Err(e) => {
                    log::debug!("Tag scan failed for {:?}: {}", entry.path(), e);
                    return None;
                }
            };
            let tag = TAG_DIRECTIVE.captures(&header)?[1].to_lowercase();
            match &common {
                None => common = Some(tag),
                Some(existing) if *existing == tag => {}
                Some(_) => return None,
            }
        }
        common
    }

    /// Names of the mandatory directives missing from the first 20 lines,
    /// or `["Unreadable"]` when the header cannot be read.
    ///
    /// Files outside [`MANDATORY_HEADER_EXTENSIONS`] always pass.
    pub fn find_missing_directives(&self, entry: &FileEntry) -> Vec<&'static str> {
        let ext = entry.extension().to_lowercase();
        if !MANDATORY_HEADER_EXTENSIONS.contains(&ext.as_str()) {
            return Vec::new();
        }

        let header = match self.read_header(entry, VALIDATION_SCAN_LINES) {
            Ok(lines) => lines.join("\n"),
            Err(_) => return vec![UNREADABLE],
        };

        Directive::MANDATORY
            .into_iter()
            .filter(|d| !d.pattern().is_match(&header))
            .map(Directive::label)
            .collect()
    }
}

/// Total order used for combined documents: part number, then path.
pub fn compare_sort_keys(a: (PartNumber, &str), b: (PartNumber, &str)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1))
}

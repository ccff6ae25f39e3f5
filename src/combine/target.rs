//! Output directory resolution
//!
//! Combined documents land in `<anchor>/devOnly/Combined_Codes`, or in a
//! `<tag>` sub-folder of it when every collected file declares the same
//! `TAG:`. The two fixed levels are mandatory; the tag level is best effort.

use crate::config::{COMBINED_OUTPUT_DIR, STAGING_DIR};
use crate::error::Result;
use crate::file_tree::{FileEntry, FileTree};
use crate::header::HeaderInspector;
use crate::revision::{ensure_dir, ensure_path};

/// Resolve (creating as needed) the directory a combined document goes in.
///
/// A failure on either fixed level is returned and any directory this call
/// created is removed again. A failure on the tag level falls back to the
/// fixed output directory.
pub fn resolve_output_directory(
    tree: &dyn FileTree,
    inspector: &HeaderInspector<'_>,
    anchor: &FileEntry,
    files: &[FileEntry],
) -> Result<FileEntry> {
    let common_tag = inspector.extract_common_tag(files);

    let output = ensure_path(tree, anchor, &[STAGING_DIR, COMBINED_OUTPUT_DIR])?;

    let Some(tag) = common_tag else {
        return Ok(output);
    };
    if !is_plain_folder_name(&tag) {
        log::warn!("Tag '{}' is not usable as a folder name", tag);
        return Ok(output);
    }
    match ensure_dir(tree, &output, &tag) {
        Ok(tagged) => Ok(tagged),
        Err(e) => {
            log::warn!("Tag folder '{}' unavailable, using {:?}: {}", tag, output.path(), e);
            Ok(output)
        }
    }
}

fn is_plain_folder_name(name: &str) -> bool {
    !matches!(name, "." | "..") && !name.contains(['/', '\\'])
}

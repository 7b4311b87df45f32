//! Document files on disk.
//!
//! - `json`: reading and writing JSON documents
//! - [`scan_documents`]: finding the source documents below a root

pub mod json;

use std::path::Path;

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::{
    core::mapping::{ALTERNATE_EXTENSIONS, CANONICAL_EXTENSION, PathMapper},
    utils::{extension, normalize_path},
};

/// Result of scanning for documents.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Source documents as sorted `/`-separated paths relative to the root.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

/// Find the source documents below `root`: files with a JSON extension that
/// no ignore pattern matches and that a mapping handles. Hidden files and
/// directories are not visited.
pub fn scan_documents(root: &Path, ignores: &[Pattern], mapper: &PathMapper) -> ScanResult {
    let mut result = ScanResult::default();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                result.skipped_count += 1;
                tracing::debug!(%err, "cannot access path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = normalize_path(&relative.to_string_lossy().replace('\\', "/"));

        if ignores.iter().any(|pattern| pattern.matches(&relative)) {
            continue;
        }
        if !is_document(&relative) {
            continue;
        }
        if !mapper.is_handled(&relative) {
            tracing::trace!(path = %relative, "not a source document");
            continue;
        }
        result.files.push(relative);
    }

    result.files.sort();
    result
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_document(path: &str) -> bool {
    let ext = extension(path);
    ext == CANONICAL_EXTENSION || ALTERNATE_EXTENSIONS.contains(&ext)
}

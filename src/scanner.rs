//! Read-only directory statistics.

use crate::classifier::extension_of;
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// File count, byte total and distinct extensions under a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    pub total_files: u64,
    pub total_size: u64,
    /// Lowercase, dot-prefixed. Files without an extension add nothing.
    pub extensions: BTreeSet<String>,
}

impl DirectoryStats {
    pub fn to_json(&self) -> Value {
        json!({
            "total_files": self.total_files,
            "total_size": self.total_size,
            "extensions": self.extensions.iter().collect::<Vec<_>>(),
        })
    }
}

/// Recursively counts every regular file under `directory`, including
/// files reached through a symlink.
///
/// Entries that cannot be read (permissions, files deleted mid-walk, broken
/// links) are left out silently. An unreadable or empty directory yields
/// zeroed stats.
pub fn scan(directory: &Path) -> DirectoryStats {
    let mut stats = DirectoryStats::default();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_type().is_dir() {
            continue;
        }
        // Follows links, so a link to a file counts with the target's size.
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        stats.total_files += 1;
        stats.total_size += metadata.len();

        let ext = extension_of(entry.path());
        if !ext.is_empty() {
            stats.extensions.insert(ext);
        }
    }

    stats
}

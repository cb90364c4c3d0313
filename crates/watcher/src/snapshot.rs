//! Initial snapshot of matching files
//!
//! Delivered as the first batch of every subscription so the consumer can
//! tell pre-existing files apart from live changes.

use std::path::Path;

use presence_core::ChangeEvent;
use tracing::warn;
use walkdir::WalkDir;

use crate::filter::{is_vcs_path, relative_name, SuffixFilter};

/// List every regular file under `base` that passes `filter`
///
/// Unreadable entries are logged and skipped.
pub fn scan(base: &Path, filter: &SuffixFilter) -> Vec<ChangeEvent> {
    let mut files = Vec::new();

    let walker = WalkDir::new(base)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match e.path().strip_prefix(base) {
            Ok(rel) => !is_vcs_path(rel),
            Err(_) => true,
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry during snapshot: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(base) else {
            continue;
        };
        if filter.matches(rel) {
            files.push(ChangeEvent::file(relative_name(rel)));
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_lists_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();

        fs::create_dir_all(base.join("comics/issue1")).unwrap();
        fs::create_dir_all(base.join(".git")).unwrap();
        fs::write(base.join("b.clip"), b"b").unwrap();
        fs::write(base.join("a.clip"), b"a").unwrap();
        fs::write(base.join("notes.txt"), b"n").unwrap();
        fs::write(base.join("comics/issue1/page03.CLIP"), b"p").unwrap();
        fs::write(base.join(".git/ignored.clip"), b"g").unwrap();
        fs::create_dir_all(base.join("folder.clip")).unwrap();

        let filter = SuffixFilter::new("clip");
        let names: Vec<_> = scan(base, &filter).into_iter().map(|e| e.name).collect();

        assert_eq!(names, vec!["a.clip", "b.clip", "comics/issue1/page03.CLIP"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let filter = SuffixFilter::new("clip");
        assert!(scan(temp_dir.path(), &filter).is_empty());
    }
}

//! Path filtering for subscriptions
//!
//! A path is reported when:
//! 1. It does not live inside a version-control directory (.git, .hg, .svn)
//! 2. Its file name ends with the subscribed suffix (case-insensitive)

use std::path::{Component, Path};

/// Directories never reported, wherever they appear
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Case-insensitive file suffix matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixFilter {
    /// Lowercased suffix including the leading dot
    dotted: String,
}

impl SuffixFilter {
    /// Create a filter for `suffix`; a leading dot is optional
    pub fn new(suffix: &str) -> Self {
        let bare = suffix.trim().trim_start_matches('.');
        Self {
            dotted: format!(".{}", bare.to_lowercase()),
        }
    }

    /// Suffix without the leading dot
    pub fn suffix(&self) -> &str {
        &self.dotted[1..]
    }

    /// Check a path relative to the subscription base
    pub fn matches(&self, relative: &Path) -> bool {
        if is_vcs_path(relative) {
            return false;
        }

        let Some(name) = relative.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();

        // A bare ".clip" is a hidden file, not a clip
        name.len() > self.dotted.len() && name.ends_with(&self.dotted)
    }
}

/// Check if any component of the path is a version-control directory
pub fn is_vcs_path(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => VCS_DIRS.iter().any(|vcs| name == *vcs),
        _ => false,
    })
}

/// Render a relative path with '/' separators on every platform
pub fn relative_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_suffix_with_or_without_dot() {
        assert_eq!(SuffixFilter::new("clip"), SuffixFilter::new(".clip"));
        assert_eq!(SuffixFilter::new(" .CLIP ").suffix(), "clip");
    }

    #[test]
    fn test_matches_case_insensitive() {
        let filter = SuffixFilter::new("clip");

        assert!(filter.matches(Path::new("sketch.clip")));
        assert!(filter.matches(Path::new("Sketch.CLIP")));
        assert!(filter.matches(Path::new("comics/issue1/page03.clip")));

        assert!(!filter.matches(Path::new("sketch.clip.bak")));
        assert!(!filter.matches(Path::new("notes.txt")));
        assert!(!filter.matches(Path::new("paperclip")));
        assert!(!filter.matches(Path::new(".clip")));
    }

    #[test]
    fn test_vcs_paths_never_match() {
        let filter = SuffixFilter::new("clip");

        assert!(!filter.matches(Path::new(".git/objects/x.clip")));
        assert!(!filter.matches(Path::new("project/.hg/store/x.clip")));
        assert!(!filter.matches(Path::new(".svn/x.clip")));
        assert!(filter.matches(Path::new("gitstuff/x.clip")));
    }

    #[test]
    fn test_relative_name_uses_forward_slashes() {
        let rel: PathBuf = ["comics", "issue1", "page03.clip"].iter().collect();
        assert_eq!(relative_name(&rel), "comics/issue1/page03.clip");
        assert_eq!(relative_name(Path::new("single.clip")), "single.clip");
    }
}

//! Change events reported by a watch backend

use std::fmt;

/// Kind of filesystem entry a change refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Regular file ('f')
    Regular,
    /// Directory ('d')
    Directory,
    /// Symbolic link ('l')
    Symlink,
    /// Anything else, or unknown because the entry is gone ('?')
    Unknown,
}

impl FileKind {
    /// Single-character code for this kind
    pub fn as_char(self) -> char {
        match self {
            FileKind::Regular => 'f',
            FileKind::Directory => 'd',
            FileKind::Symlink => 'l',
            FileKind::Unknown => '?',
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single reported change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path relative to the subscription base, '/'-separated
    pub name: String,
    /// Whether the entry exists after the change
    pub exists: bool,
    /// Entry kind
    pub kind: FileKind,
}

impl ChangeEvent {
    pub fn new(name: impl Into<String>, exists: bool, kind: FileKind) -> Self {
        Self {
            name: name.into(),
            exists,
            kind,
        }
    }

    /// An existing regular file
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, true, FileKind::Regular)
    }

    /// True if the entry exists and is a regular file
    pub fn is_qualifying(&self) -> bool {
        self.exists && self.kind == FileKind::Regular
    }
}

/// Group of change events delivered together for one subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Name of the subscription that produced this batch
    pub subscription: String,
    /// Events in delivery order
    pub files: Vec<ChangeEvent>,
}

impl Batch {
    pub fn new(subscription: impl Into<String>, files: Vec<ChangeEvent>) -> Self {
        Self {
            subscription: subscription.into(),
            files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

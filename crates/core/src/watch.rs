//! Watch service interface

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::Batch;

/// Capability required for relative subscription roots
pub const CAP_RELATIVE_ROOT: &str = "relative_root";
/// Capability required for suffix filtering
pub const CAP_SUFFIX_SET: &str = "suffix-set";
/// Capability for an initial snapshot batch on subscribe
pub const CAP_INITIAL_SNAPSHOT: &str = "initial-snapshot";

/// Errors reported by a watch backend
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("capability not supported: {0}")]
    MissingCapability(String),
    #[error("directory not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("root is not being watched: {0}")]
    NotWatched(PathBuf),
    #[error("watch backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A directory being tracked by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRoot {
    /// Root the backend is watching
    pub root: PathBuf,
    /// Requested directory relative to `root`, if the backend watches an ancestor
    pub relative_root: Option<PathBuf>,
}

impl WatchRoot {
    /// Directory that event names are relative to
    pub fn base(&self) -> PathBuf {
        match &self.relative_root {
            Some(rel) => self.root.join(rel),
            None => self.root.clone(),
        }
    }
}

/// Filtered subscription request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// File suffix to report, without the leading dot
    pub suffix: String,
    /// Report names relative to this directory under the watch root
    pub relative_root: Option<PathBuf>,
}

/// Watch service
///
/// Production: `notify` backend in the watcher crate.
/// Testing: fakes that record calls and emit batches on demand.
pub trait ChangeWatcher {
    /// Verify the backend supports every named capability
    fn check_capabilities(&self, required: &[String]) -> Result<(), WatchError>;

    /// Begin tracking a directory
    fn watch(&mut self, directory: &Path) -> Result<WatchRoot, WatchError>;

    /// Register a named, filtered subscription on a watched root
    ///
    /// Batches for the subscription arrive on the returned channel until the
    /// watcher is dropped.
    fn subscribe(
        &mut self,
        root: &WatchRoot,
        name: &str,
        subscription: Subscription,
    ) -> Result<mpsc::Receiver<Batch>, WatchError>;
}

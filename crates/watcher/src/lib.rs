//! File system watching for clip-presence
//!
//! This crate provides a `ChangeWatcher` backed by `notify` with:
//! - Initial snapshot batch on subscribe
//! - Case-insensitive suffix filtering
//! - Debounced batches via `notify-debouncer-mini`
//! - Native or polling backends

pub mod filter;
pub mod snapshot;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use notify::{PollWatcher, RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer_opt, DebounceEventResult, DebouncedEvent, Debouncer};
use presence_core::watch::{CAP_INITIAL_SNAPSHOT, CAP_RELATIVE_ROOT, CAP_SUFFIX_SET};
use presence_core::{Batch, ChangeEvent, ChangeWatcher, FileKind, Subscription, WatchError, WatchRoot};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use filter::{relative_name, SuffixFilter};

/// Capabilities this backend provides
pub const SUPPORTED_CAPABILITIES: &[&str] = &[CAP_RELATIVE_ROOT, CAP_SUFFIX_SET, CAP_INITIAL_SNAPSHOT];

/// Batches buffered between the forwarding thread and the consumer
const CHANNEL_CAPACITY: usize = 256;

/// Watcher tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Debounce timeout that closes a batch
    pub batch_window: Duration,
    /// Use the polling backend with this interval instead of native events
    pub poll_interval: Option<Duration>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            batch_window: Duration::from_millis(50),
            poll_interval: None,
        }
    }
}

/// Keep alive: dropping the debouncer stops the OS watcher
enum DebouncedBackend {
    Native(Debouncer<RecommendedWatcher>),
    Polling(Debouncer<PollWatcher>),
}

impl DebouncedBackend {
    fn watcher(&mut self) -> &mut dyn notify::Watcher {
        match self {
            DebouncedBackend::Native(debouncer) => debouncer.watcher(),
            DebouncedBackend::Polling(debouncer) => debouncer.watcher(),
        }
    }
}

/// A running subscription; dropping it stops the debouncer, which ends the
/// forwarding thread
struct ActiveSubscription {
    name: String,
    _backend: DebouncedBackend,
    _forwarder: thread::JoinHandle<()>,
}

/// `ChangeWatcher` over the `notify` crate
pub struct NotifyWatcher {
    options: WatchOptions,
    roots: Vec<WatchRoot>,
    subscriptions: Vec<ActiveSubscription>,
}

impl NotifyWatcher {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            roots: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Names of the subscriptions currently running
    pub fn subscriptions(&self) -> Vec<&str> {
        self.subscriptions.iter().map(|s| s.name.as_str()).collect()
    }

    fn start_debouncer(
        &self,
        base: &Path,
        raw_tx: crossbeam_channel::Sender<DebounceEventResult>,
    ) -> Result<DebouncedBackend, WatchError> {
        let handler = move |res: DebounceEventResult| {
            let _ = raw_tx.send(res);
        };

        let notify_config = match self.options.poll_interval {
            Some(interval) => notify::Config::default().with_poll_interval(interval),
            None => notify::Config::default(),
        };
        let config = notify_debouncer_mini::Config::default()
            .with_timeout(self.options.batch_window)
            .with_notify_config(notify_config);

        let mut backend = match self.options.poll_interval {
            Some(_) => DebouncedBackend::Polling(
                new_debouncer_opt::<_, PollWatcher>(config, handler).map_err(backend_error)?,
            ),
            None => DebouncedBackend::Native(
                new_debouncer_opt::<_, RecommendedWatcher>(config, handler)
                    .map_err(backend_error)?,
            ),
        };

        backend
            .watcher()
            .watch(base, RecursiveMode::Recursive)
            .map_err(backend_error)?;
        Ok(backend)
    }
}

impl Default for NotifyWatcher {
    fn default() -> Self {
        Self::new(WatchOptions::default())
    }
}

impl ChangeWatcher for NotifyWatcher {
    fn check_capabilities(&self, required: &[String]) -> Result<(), WatchError> {
        for capability in required {
            if !SUPPORTED_CAPABILITIES.contains(&capability.as_str()) {
                return Err(WatchError::MissingCapability(capability.clone()));
            }
        }
        Ok(())
    }

    fn watch(&mut self, directory: &Path) -> Result<WatchRoot, WatchError> {
        let metadata = fs::metadata(directory).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WatchError::NotFound(directory.to_path_buf()),
            _ => WatchError::Io(e),
        })?;
        if !metadata.is_dir() {
            return Err(WatchError::NotADirectory(directory.to_path_buf()));
        }

        let root = WatchRoot {
            root: fs::canonicalize(directory)?,
            relative_root: None,
        };
        if !self.roots.contains(&root) {
            self.roots.push(root.clone());
        }
        Ok(root)
    }

    fn subscribe(
        &mut self,
        root: &WatchRoot,
        name: &str,
        subscription: Subscription,
    ) -> Result<mpsc::Receiver<Batch>, WatchError> {
        if !self.roots.contains(root) {
            return Err(WatchError::NotWatched(root.root.clone()));
        }
        if subscription.suffix.trim().trim_start_matches('.').is_empty() {
            return Err(WatchError::Backend("empty suffix filter".to_string()));
        }

        let base = match &subscription.relative_root {
            Some(rel) => root.root.join(rel),
            None => root.root.clone(),
        };
        if !base.is_dir() {
            return Err(WatchError::NotFound(base));
        }

        let filter = SuffixFilter::new(&subscription.suffix);
        let (raw_tx, raw_rx) = crossbeam_channel::unbounded();
        let backend = self.start_debouncer(&base, raw_tx)?;

        // Snapshot goes out before the forwarding thread exists, so it is
        // always the first batch
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let initial = snapshot::scan(&base, &filter);
        info!("Initial snapshot of {}: {} files", base.display(), initial.len());
        tx.try_send(Batch::new(name, initial))
            .map_err(|e| WatchError::Backend(e.to_string()))?;

        let forwarder = Forwarder {
            name: name.to_string(),
            base,
            filter,
        };
        let handle = thread::Builder::new()
            .name(format!("watch-{}", name))
            .spawn(move || forwarder.run(raw_rx, tx))?;

        self.subscriptions.push(ActiveSubscription {
            name: name.to_string(),
            _backend: backend,
            _forwarder: handle,
        });
        Ok(rx)
    }
}

fn backend_error(e: notify::Error) -> WatchError {
    WatchError::Backend(e.to_string())
}

/// Turns debounced events into batches for one subscription
struct Forwarder {
    name: String,
    base: PathBuf,
    filter: SuffixFilter,
}

impl Forwarder {
    fn run(self, raw_rx: Receiver<DebounceEventResult>, tx: mpsc::Sender<Batch>) {
        debug!("Forwarder for '{}' started", self.name);

        while let Ok(result) = raw_rx.recv() {
            let events = match result {
                Ok(events) => events,
                Err(e) => {
                    warn!("Watcher error: {}", e);
                    continue;
                }
            };

            let files = self.describe(events);
            if !files.is_empty() && tx.blocking_send(Batch::new(&self.name, files)).is_err() {
                debug!("Batch receiver for '{}' dropped", self.name);
                return;
            }
        }

        debug!("Forwarder for '{}' stopped", self.name);
    }

    /// One `ChangeEvent` per matching path, in delivery order
    fn describe(&self, events: Vec<DebouncedEvent>) -> Vec<ChangeEvent> {
        events
            .into_iter()
            .filter_map(|event| {
                let rel = event.path.strip_prefix(&self.base).ok()?;
                if !self.filter.matches(rel) {
                    return None;
                }
                // Entries that are gone no longer say what they were
                let (exists, kind) = match fs::symlink_metadata(&event.path) {
                    Ok(meta) => (true, kind_of(meta.file_type())),
                    Err(_) => (false, FileKind::Unknown),
                };
                Some(ChangeEvent::new(relative_name(rel), exists, kind))
            })
            .collect()
    }
}

fn kind_of(file_type: fs::FileType) -> FileKind {
    if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_file() {
        FileKind::Regular
    } else if file_type.is_dir() {
        FileKind::Directory
    } else {
        FileKind::Unknown
    }
}

//! Bridge between a watch backend and a presence backend
//!
//! The bridge owns the only mutable state in the program:
//! - the active file (latest qualifying path, never cleared)
//! - the initialization flag (first batch of our subscription is a snapshot)
//!
//! Status updates are fire-and-forget: each one runs as its own task and only
//! logs its outcome.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::event::Batch;
use crate::presence::{PresenceError, PresenceSink, PresenceUpdate};
use crate::status::StatusFormat;
use crate::watch::{ChangeWatcher, Subscription, WatchError, CAP_RELATIVE_ROOT};

pub const DEFAULT_SUFFIX: &str = "clip";
pub const DEFAULT_SUBSCRIPTION: &str = "clip-presence";
pub const DEFAULT_IMAGE_KEY: &str = "large_logo";

/// Setup and runtime failures of the bridge
///
/// Every variant is fatal; recoverable failures (single status updates) are
/// logged inside their task and never surface here.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("presence session could not be established: {0}")]
    Session(PresenceError),
    #[error("watch capability check failed: {0}")]
    Capability(WatchError),
    #[error("failed to start watching directory: {0}")]
    Watch(WatchError),
    #[error("failed to subscribe to directory changes: {0}")]
    Subscribe(WatchError),
    #[error("watch stream closed unexpectedly")]
    StreamClosed,
}

impl BridgeError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Fixed inputs of a bridge, decided at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Directory whose files are reported
    pub directory: PathBuf,
    /// File suffix to subscribe to
    pub suffix: String,
    /// Subscription name; batches for other names are ignored
    pub subscription: String,
    /// Capabilities the watch backend must support
    pub required_capabilities: Vec<String>,
    /// Image asset key sent with every update
    pub large_image_key: String,
    /// Instance flag sent with every update
    pub instance: bool,
    /// Status wording
    pub status: StatusFormat,
}

impl BridgeSettings {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            suffix: DEFAULT_SUFFIX.to_string(),
            subscription: DEFAULT_SUBSCRIPTION.to_string(),
            required_capabilities: vec![CAP_RELATIVE_ROOT.to_string()],
            large_image_key: DEFAULT_IMAGE_KEY.to_string(),
            instance: true,
            status: StatusFormat::default(),
        }
    }
}

/// Orchestrates startup and translates change batches into status updates
pub struct Bridge<W> {
    watcher: W,
    sink: Arc<dyn PresenceSink>,
    settings: BridgeSettings,
    active_file: Option<PathBuf>,
    initialized: bool,
}

impl<W: ChangeWatcher> Bridge<W> {
    pub fn new(watcher: W, sink: Arc<dyn PresenceSink>, settings: BridgeSettings) -> Self {
        Self {
            watcher,
            sink,
            settings,
            active_file: None,
            initialized: false,
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Latest qualifying file, if any has been seen since initialization
    pub fn active_file(&self) -> Option<&Path> {
        self.active_file.as_deref()
    }

    /// Whether the initial snapshot batch has been consumed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Connect to the presence service, show the idle status, then start watching
    pub async fn startup(&mut self) -> Result<mpsc::Receiver<Batch>, BridgeError> {
        info!("Connecting to presence service");
        self.sink.connect().await.map_err(BridgeError::Session)?;
        info!("Presence session is ready");

        self.update_status(None);
        self.begin_watch()
    }

    /// Check capabilities, watch the directory and subscribe to suffix changes
    ///
    /// Stops at the first failing step.
    pub fn begin_watch(&mut self) -> Result<mpsc::Receiver<Batch>, BridgeError> {
        self.watcher
            .check_capabilities(&self.settings.required_capabilities)
            .map_err(BridgeError::Capability)?;
        debug!(
            "Watch backend supports {:?}",
            self.settings.required_capabilities
        );

        let root = self
            .watcher
            .watch(&self.settings.directory)
            .map_err(BridgeError::Watch)?;
        info!("Watching {}", root.root.display());

        let subscription = Subscription {
            suffix: self.settings.suffix.clone(),
            relative_root: root.relative_root.clone(),
        };
        let batches = self
            .watcher
            .subscribe(&root, &self.settings.subscription, subscription)
            .map_err(BridgeError::Subscribe)?;
        info!(
            "Subscription '{}' established for *.{}",
            self.settings.subscription, self.settings.suffix
        );

        Ok(batches)
    }

    /// Handle one delivered batch
    ///
    /// Returns the handles of the update tasks it issued, in issue order.
    pub fn on_batch(&mut self, batch: Batch) -> Vec<JoinHandle<()>> {
        if batch.subscription != self.settings.subscription {
            debug!("Ignoring batch for subscription '{}'", batch.subscription);
            return Vec::new();
        }

        if !self.initialized {
            debug!("Skipping {} files from initial snapshot", batch.files.len());
            self.initialized = true;
            return Vec::new();
        }

        let mut issued = Vec::new();
        for event in batch.files {
            if !event.is_qualifying() {
                debug!(
                    "Ignoring {} (exists={}, type={})",
                    event.name, event.exists, event.kind
                );
                continue;
            }

            self.active_file = Some(self.settings.directory.join(&event.name));
            issued.push(self.update_status(self.active_file.as_deref()));
        }
        issued
    }

    /// Send a status update for `active`, or the idle status for `None`
    ///
    /// The update runs as a detached task; its outcome is only logged.
    pub fn update_status(&self, active: Option<&Path>) -> JoinHandle<()> {
        let update = PresenceUpdate {
            details: self.settings.status.text(active),
            start_timestamp: Utc::now().timestamp_millis(),
            large_image_key: self.settings.large_image_key.clone(),
            instance: self.settings.instance,
        };
        let sink = Arc::clone(&self.sink);

        tokio::spawn(async move {
            let details = update.details.clone();
            match sink.publish(update).await {
                Ok(()) => info!("Updated activity: {}", details),
                Err(e) => error!("Failed to update activity: {}", e),
            }
        })
    }

    /// Feed batches into the bridge until `shutdown` resolves
    ///
    /// On shutdown the status is cleared on a best-effort basis. A closed
    /// batch stream means the watch backend is gone and is reported as fatal.
    pub async fn run<F>(
        &mut self,
        mut batches: mpsc::Receiver<Batch>,
        shutdown: F,
    ) -> Result<(), BridgeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, clearing activity");
                    if let Err(e) = self.sink.clear().await {
                        warn!("Failed to clear activity: {}", e);
                    }
                    return Ok(());
                }
                batch = batches.recv() => match batch {
                    Some(batch) => {
                        self.on_batch(batch);
                    }
                    None => return Err(BridgeError::StreamClosed),
                },
            }
        }
    }
}

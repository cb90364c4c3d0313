//! Log-only presence backend

use async_trait::async_trait;
use parking_lot::Mutex;
use presence_core::{PresenceError, PresenceSink, PresenceUpdate};
use tracing::info;

/// Sink that logs every update instead of sending it
#[derive(Default)]
pub struct DryRunPresence {
    record: Mutex<Record>,
}

/// Update count and the latest update
#[derive(Default)]
struct Record {
    count: usize,
    last: Option<PresenceUpdate>,
}

impl DryRunPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates received so far
    pub fn published(&self) -> usize {
        self.record.lock().count
    }

    /// Most recent update, if any
    pub fn last(&self) -> Option<PresenceUpdate> {
        self.record.lock().last.clone()
    }
}

#[async_trait]
impl PresenceSink for DryRunPresence {
    async fn connect(&self) -> Result<(), PresenceError> {
        info!("[dry-run] presence session opened");
        Ok(())
    }

    async fn publish(&self, update: PresenceUpdate) -> Result<(), PresenceError> {
        info!(
            "[dry-run] details={:?} start={} image={} instance={}",
            update.details, update.start_timestamp, update.large_image_key, update.instance
        );
        let mut record = self.record.lock();
        record.count += 1;
        record.last = Some(update);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PresenceError> {
        info!("[dry-run] presence cleared");
        Ok(())
    }
}

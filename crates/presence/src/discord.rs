//! Discord Rich Presence backend
//!
//! The IPC client is blocking, so every call runs on the blocking pool. A
//! single client is shared behind a mutex; concurrent updates queue on it.

use std::sync::Arc;

use async_trait::async_trait;
use discord_rich_presence::activity::{Activity, Assets, Timestamps};
use discord_rich_presence::{DiscordIpc, DiscordIpcClient};
use parking_lot::Mutex;
use presence_core::{PresenceError, PresenceSink, PresenceUpdate};
use tracing::{debug, info};

/// Presence sink backed by the local Discord client
pub struct DiscordPresence {
    client_id: String,
    client: Arc<Mutex<Option<DiscordIpcClient>>>,
}

impl DiscordPresence {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.lock().is_some()
    }

    /// Run `f` against the connected client on the blocking pool
    async fn with_client<F>(&self, f: F) -> Result<(), PresenceError>
    where
        F: FnOnce(&mut DiscordIpcClient) -> Result<(), PresenceError> + Send + 'static,
    {
        let slot = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock();
            let client = guard.as_mut().ok_or(PresenceError::NotConnected)?;
            f(client)
        })
        .await
        .map_err(|e| PresenceError::Task(e.to_string()))?
    }
}

#[async_trait]
impl PresenceSink for DiscordPresence {
    async fn connect(&self) -> Result<(), PresenceError> {
        let client_id = self.client_id.clone();
        let slot = Arc::clone(&self.client);

        tokio::task::spawn_blocking(move || {
            let mut client = DiscordIpcClient::new(&client_id)
                .map_err(|e| PresenceError::Connect(e.to_string()))?;
            client
                .connect()
                .map_err(|e| PresenceError::Connect(e.to_string()))?;
            *slot.lock() = Some(client);
            Ok(())
        })
        .await
        .map_err(|e| PresenceError::Task(e.to_string()))??;

        info!("Connected to Discord as application {}", self.client_id);
        Ok(())
    }

    async fn publish(&self, update: PresenceUpdate) -> Result<(), PresenceError> {
        if update.instance {
            // Not carried by the IPC activity payload
            debug!("Instance flag set for '{}'", update.details);
        }

        self.with_client(move |client| {
            let activity = Activity::new()
                .details(&update.details)
                .timestamps(Timestamps::new().start(update.start_timestamp))
                .assets(Assets::new().large_image(&update.large_image_key));
            client
                .set_activity(activity)
                .map_err(|e| PresenceError::Rejected(e.to_string()))
        })
        .await
    }

    async fn clear(&self) -> Result<(), PresenceError> {
        self.with_client(|client| {
            client
                .clear_activity()
                .map_err(|e| PresenceError::Rejected(e.to_string()))
        })
        .await
    }
}

impl Drop for DiscordPresence {
    fn drop(&mut self) {
        if let Some(mut client) = self.client.lock().take() {
            let _ = client.close();
        }
    }
}

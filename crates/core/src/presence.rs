//! Presence service interface

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a presence backend
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("failed to connect to presence service: {0}")]
    Connect(String),
    #[error("presence session is not connected")]
    NotConnected,
    #[error("presence update rejected: {0}")]
    Rejected(String),
    #[error("presence task failed: {0}")]
    Task(String),
}

/// One status update as sent to the presence service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    /// Human-readable status line
    pub details: String,
    /// Session start (Unix milliseconds)
    pub start_timestamp: i64,
    /// Image asset key shown next to the status
    pub large_image_key: String,
    /// Whether this activity is an instanced session
    pub instance: bool,
}

/// Presence service
///
/// Production: Discord IPC in the presence crate.
/// Testing: sinks that record or reject updates.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    /// Establish the session
    async fn connect(&self) -> Result<(), PresenceError>;

    /// Apply a status update
    async fn publish(&self, update: PresenceUpdate) -> Result<(), PresenceError>;

    /// Remove the current status
    async fn clear(&self) -> Result<(), PresenceError> {
        Ok(())
    }
}

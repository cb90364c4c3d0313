//! Core types for clip-presence
//!
//! This crate provides:
//! - Change events and batches as reported by a watch backend
//! - The watch and presence service traits
//! - Status text formatting
//! - The bridge that turns file activity into presence updates

pub mod bridge;
pub mod event;
pub mod presence;
pub mod status;
pub mod watch;

// Re-exports
pub use bridge::{Bridge, BridgeError, BridgeSettings};
pub use event::{Batch, ChangeEvent, FileKind};
pub use presence::{PresenceError, PresenceSink, PresenceUpdate};
pub use status::StatusFormat;
pub use watch::{ChangeWatcher, Subscription, WatchError, WatchRoot};

//! Presence backends for clip-presence
//!
//! - `DiscordPresence`: Discord Rich Presence over local IPC
//! - `DryRunPresence`: logs updates without talking to anything

pub mod discord;
pub mod dry_run;

pub use discord::DiscordPresence;
pub use dry_run::DryRunPresence;

/// Default Discord application id
pub const DEFAULT_CLIENT_ID: &str = "934221567242690561";

//! System configuration
//!
//! Compiled-in defaults, optionally overridden by a TOML file at
//! `$CLIP_PRESENCE_CONFIG` or `<config dir>/clip-presence/config.toml`.

use anyhow::{Context, Result};
use presence::DEFAULT_CLIENT_ID;
use presence_core::bridge::{DEFAULT_IMAGE_KEY, DEFAULT_SUBSCRIPTION, DEFAULT_SUFFIX};
use presence_core::status::{DEFAULT_ICON, DEFAULT_IDLE_TEXT};
use presence_core::watch::CAP_RELATIVE_ROOT;
use presence_core::{BridgeSettings, StatusFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use watcher::WatchOptions;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "CLIP_PRESENCE_CONFIG";

/// Full configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SystemConfig {
    pub watch: WatchConfig,
    pub presence: PresenceConfig,
}

/// `[watch]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory to watch
    pub directory: PathBuf,
    /// File suffix to report
    pub suffix: String,
    /// Subscription name
    pub subscription: String,
    /// Capabilities the watch backend must support
    pub required_capabilities: Vec<String>,
    /// Quiet period closing a batch (milliseconds)
    pub batch_window_ms: u64,
    /// Polling interval in milliseconds; 0 uses native events
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            suffix: DEFAULT_SUFFIX.to_string(),
            subscription: DEFAULT_SUBSCRIPTION.to_string(),
            required_capabilities: vec![CAP_RELATIVE_ROOT.to_string()],
            batch_window_ms: 50,
            poll_interval_ms: 0,
        }
    }
}

/// `[presence]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Discord application id
    pub client_id: String,
    /// Image asset key
    pub large_image_key: String,
    /// Instance flag sent with updates
    pub instance: bool,
    /// Decoration before "Editing"
    pub icon: String,
    /// Status shown when no file is active
    pub idle_text: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            large_image_key: DEFAULT_IMAGE_KEY.to_string(),
            instance: true,
            icon: DEFAULT_ICON.to_string(),
            idle_text: DEFAULT_IDLE_TEXT.to_string(),
        }
    }
}

impl SystemConfig {
    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if self.watch.suffix.trim().trim_start_matches('.').is_empty() {
            anyhow::bail!("watch.suffix must not be empty");
        }
        if self.watch.subscription.trim().is_empty() {
            anyhow::bail!("watch.subscription must not be empty");
        }
        if !(1..=5000).contains(&self.watch.batch_window_ms) {
            anyhow::bail!(
                "watch.batch_window_ms must be between 1 and 5000 (got {})",
                self.watch.batch_window_ms
            );
        }
        if self.presence.client_id.is_empty()
            || !self.presence.client_id.chars().all(|c| c.is_ascii_digit())
        {
            anyhow::bail!(
                "presence.client_id must be a numeric application id (got '{}')",
                self.presence.client_id
            );
        }
        Ok(())
    }

    /// Settings for the bridge
    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            directory: self.watch.directory.clone(),
            suffix: self.watch.suffix.trim().trim_start_matches('.').to_string(),
            subscription: self.watch.subscription.clone(),
            required_capabilities: self.watch.required_capabilities.clone(),
            large_image_key: self.presence.large_image_key.clone(),
            instance: self.presence.instance,
            status: StatusFormat {
                icon: self.presence.icon.clone(),
                idle_text: self.presence.idle_text.clone(),
            },
        }
    }

    /// Options for the watch backend
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            batch_window: Duration::from_millis(self.watch.batch_window_ms),
            poll_interval: match self.watch.poll_interval_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

/// Default watched directory (`~/Drawings`)
pub fn default_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Drawings"))
        .unwrap_or_else(|| PathBuf::from("Drawings"))
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(explicit));
    }
    dirs::config_dir().map(|dir| dir.join("clip-presence").join("config.toml"))
}

/// Load configuration, falling back to defaults when no file exists
pub fn load() -> Result<SystemConfig> {
    match config_file_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(SystemConfig::default()),
    }
}

/// Load and validate a specific config file
pub fn load_from(path: &Path) -> Result<SystemConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

fn save_to(config: &SystemConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Create the config file with defaults if it does not exist yet
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save_to(&SystemConfig::default(), &path)?;
    }
    Ok(path)
}

/// Annotated example configuration
pub fn example_config() -> String {
    format!(
        r#"# clip-presence configuration

[watch]
# Directory whose files are reported
directory = "{directory}"
# File suffix to report (leading dot optional)
suffix = "{suffix}"
# Subscription name
subscription = "{subscription}"
# Capabilities the watch backend must support
required_capabilities = ["{capability}"]
# Quiet period that closes a batch of changes (1-5000 ms)
batch_window_ms = 50
# Poll every N ms instead of using native events (0 = native)
poll_interval_ms = 0

[presence]
# Discord application id
client_id = "{client_id}"
# Image asset key shown next to the status
large_image_key = "{image}"
instance = true
# Decoration before "Editing"; empty for none
icon = "{icon}"
# Status shown before any file is touched
idle_text = "{idle}"
"#,
        directory = default_directory().display().to_string().replace('\\', "\\\\"),
        suffix = DEFAULT_SUFFIX,
        subscription = DEFAULT_SUBSCRIPTION,
        capability = CAP_RELATIVE_ROOT,
        client_id = DEFAULT_CLIENT_ID,
        image = DEFAULT_IMAGE_KEY,
        icon = DEFAULT_ICON,
        idle = DEFAULT_IDLE_TEXT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = SystemConfig::default();
        config.validate().unwrap();

        let settings = config.bridge_settings();
        assert_eq!(settings.suffix, "clip");
        assert_eq!(settings.large_image_key, "large_logo");
        assert!(settings.instance);
        assert_eq!(config.watch_options().poll_interval, None);
    }

    #[test]
    fn test_example_parses_to_defaults() {
        let parsed: SystemConfig = toml::from_str(&example_config()).unwrap();
        assert_eq!(parsed, SystemConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[watch]\ndirectory = \"/art\"\nsuffix = \".psd\"\npoll_interval_ms = 250\n",
        )?;

        let config = load_from(&path)?;
        assert_eq!(config.watch.directory, PathBuf::from("/art"));
        assert_eq!(config.bridge_settings().suffix, "psd");
        assert_eq!(
            config.watch_options().poll_interval,
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.presence, PresenceConfig::default());
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SystemConfig::default();
        config.watch.suffix = ".".to_string();
        assert!(config.validate().is_err());

        let mut config = SystemConfig::default();
        config.watch.batch_window_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SystemConfig::default();
        config.presence.client_id = "not-a-number".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[watch]\nbatch_window_ms = 0\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("batch_window_ms"));
    }

    #[test]
    fn test_save_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = SystemConfig::default();
        config.presence.icon = String::new();
        save_to(&config, &path)?;

        assert_eq!(load_from(&path)?, config);
        Ok(())
    }
}

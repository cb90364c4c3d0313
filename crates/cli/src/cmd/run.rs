//! Run the bridge in the foreground

use anyhow::Result;
use clap::Args;
use presence::{DiscordPresence, DryRunPresence};
use presence_core::{Bridge, BridgeError, PresenceSink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use watcher::NotifyWatcher;

use crate::system_config::{self, SystemConfig};

/// Overrides for a single run
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Directory to watch
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// File suffix to report (e.g. clip)
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Discord application id
    #[arg(long)]
    pub client_id: Option<String>,

    /// Capability the watch backend must support (repeatable, replaces the configured list)
    #[arg(long = "require", value_name = "CAPABILITY")]
    pub require: Vec<String>,

    /// Poll every N milliseconds instead of using native events (0 = native)
    #[arg(long, value_name = "MS")]
    pub poll_ms: Option<u64>,

    /// Log updates instead of sending them to Discord
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut SystemConfig) {
        if let Some(directory) = &self.directory {
            config.watch.directory = directory.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.watch.suffix = suffix.clone();
        }
        if let Some(client_id) = &self.client_id {
            config.presence.client_id = client_id.clone();
        }
        if !self.require.is_empty() {
            config.watch.required_capabilities = self.require.clone();
        }
        if let Some(poll_ms) = self.poll_ms {
            config.watch.poll_interval_ms = poll_ms;
        }
    }
}

pub async fn run(args: RunArgs) -> Result<ExitCode> {
    let mut config = system_config::load()?;
    args.apply(&mut config);
    config.validate()?;

    let sink: Arc<dyn PresenceSink> = if args.dry_run {
        info!("Dry run: presence updates are only logged");
        Arc::new(DryRunPresence::new())
    } else {
        Arc::new(DiscordPresence::new(config.presence.client_id.clone()))
    };

    let watcher = NotifyWatcher::new(config.watch_options());
    let mut bridge = Bridge::new(watcher, sink, config.bridge_settings());
    info!(
        "Reporting *.{} files under {}",
        bridge.settings().suffix,
        bridge.settings().directory.display()
    );

    let batches = match bridge.startup().await {
        Ok(batches) => batches,
        Err(e) => return Ok(fatal(e)),
    };

    match bridge.run(batches, shutdown_signal()).await {
        Ok(()) => {
            info!("Stopped");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(fatal(e)),
    }
}

fn fatal(e: BridgeError) -> ExitCode {
    error!("{}", e);
    ExitCode::from(e.exit_code() as u8)
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config() {
        let mut config = SystemConfig::default();
        let args = RunArgs {
            directory: Some(PathBuf::from("/art")),
            suffix: Some("psd".to_string()),
            client_id: Some("123".to_string()),
            require: vec!["suffix-set".to_string()],
            poll_ms: Some(500),
            dry_run: true,
        };

        args.apply(&mut config);

        assert_eq!(config.watch.directory, PathBuf::from("/art"));
        assert_eq!(config.watch.suffix, "psd");
        assert_eq!(config.presence.client_id, "123");
        assert_eq!(config.watch.required_capabilities, vec!["suffix-set".to_string()]);
        assert_eq!(config.watch.poll_interval_ms, 500);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = SystemConfig::default();
        RunArgs::default().apply(&mut config);
        assert_eq!(config, SystemConfig::default());
    }
}

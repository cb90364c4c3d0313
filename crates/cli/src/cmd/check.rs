//! Verify the watch setup without touching the presence service
//!
//! Runs the same capability check, watch and subscribe steps as `run`, then
//! prints the initial snapshot.

use anyhow::Result;
use owo_colors::OwoColorize;
use presence::DryRunPresence;
use presence_core::Bridge;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use watcher::NotifyWatcher;

use crate::system_config;

/// Snapshot entries listed before truncating
const MAX_LISTED: usize = 10;

pub async fn run(directory: Option<PathBuf>) -> Result<ExitCode> {
    let mut config = system_config::load()?;
    if let Some(directory) = directory {
        config.watch.directory = directory;
    }
    config.validate()?;

    let settings = config.bridge_settings();
    println!("{}", "Watch Check".bold());
    println!("{}: {}", "Directory".dimmed(), settings.directory.display());
    println!("{}: *.{}", "Suffix".dimmed(), settings.suffix);
    println!(
        "{}: {}\n",
        "Backend".dimmed(),
        match config.watch.poll_interval_ms {
            0 => "native".to_string(),
            ms => format!("polling every {}ms", ms),
        }
    );

    let watcher = NotifyWatcher::new(config.watch_options());
    let mut bridge = Bridge::new(watcher, Arc::new(DryRunPresence::new()), settings);

    let mut batches = match bridge.begin_watch() {
        Ok(batches) => batches,
        Err(e) => {
            error!("{}", e);
            println!("{} {}", "✗".red(), e);
            return Ok(ExitCode::from(e.exit_code() as u8));
        }
    };
    println!("{} Capabilities, watch and subscription OK", "✓".green());

    match tokio::time::timeout(Duration::from_secs(5), batches.recv()).await {
        Ok(Some(snapshot)) => {
            println!(
                "{} Initial snapshot: {} matching files",
                "✓".green(),
                snapshot.files.len()
            );
            for event in snapshot.files.iter().take(MAX_LISTED) {
                println!("  {}", event.name.cyan());
            }
            if snapshot.files.len() > MAX_LISTED {
                println!(
                    "  {}",
                    format!("... and {} more", snapshot.files.len() - MAX_LISTED).dimmed()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            println!("{} Watch stream closed before the snapshot arrived", "✗".red());
            Ok(ExitCode::FAILURE)
        }
        Err(_) => {
            println!("{} Timed out waiting for the initial snapshot", "✗".red());
            Ok(ExitCode::FAILURE)
        }
    }
}

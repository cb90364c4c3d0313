//! Configuration management command
//!
//! Provides CLI interface to view the effective configuration and its file.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "System Configuration".bold());
    println!(
        "{}: {} {}\n",
        "Location".dimmed(),
        config_path.display().dimmed(),
        if config_path.exists() {
            String::new()
        } else {
            "(not created, showing defaults)".yellow().to_string()
        }
    );

    print_config(&config);

    println!("\n{}", "Valid Ranges:".bold());
    println!("  batch_window_ms: 1-5000");
    println!("  poll_interval_ms: 0 = native events, otherwise polling interval");
    println!("  client_id: numeric Discord application id");

    Ok(())
}

fn print_config(config: &SystemConfig) {
    println!("{}", "[watch]".yellow());
    println!(
        "  {} = {}",
        "directory".cyan(),
        config.watch.directory.display()
    );
    println!("  {} = {}", "suffix".cyan(), config.watch.suffix);
    println!("  {} = {}", "subscription".cyan(), config.watch.subscription);
    println!(
        "  {} = {:?}",
        "required_capabilities".cyan(),
        config.watch.required_capabilities
    );
    println!(
        "  {} = {} {}",
        "batch_window_ms".cyan(),
        config.watch.batch_window_ms,
        format!("({}ms)", config.watch.batch_window_ms).dimmed()
    );
    println!(
        "  {} = {} {}",
        "poll_interval_ms".cyan(),
        config.watch.poll_interval_ms,
        if config.watch.poll_interval_ms == 0 {
            "(native events)".dimmed().to_string()
        } else {
            format!("(poll every {}ms)", config.watch.poll_interval_ms)
                .dimmed()
                .to_string()
        }
    );

    println!("\n{}", "[presence]".yellow());
    println!("  {} = {}", "client_id".cyan(), config.presence.client_id);
    println!(
        "  {} = {}",
        "large_image_key".cyan(),
        config.presence.large_image_key
    );
    println!("  {} = {}", "instance".cyan(), config.presence.instance);
    println!("  {} = {:?}", "icon".cyan(), config.presence.icon);
    println!("  {} = {:?}", "idle_text".cyan(), config.presence.idle_text);
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        system_config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    let example = system_config::example_config();
    println!("{}", example);
    Ok(())
}

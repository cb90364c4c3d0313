//! clip-presence - show the file you are drawing in as your Discord status

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use cli_lib::cmd;
use cli_lib::cmd::run::RunArgs;
use cli_lib::logging;

/// clip-presence - mirror the most recently saved file into Discord Rich Presence
#[derive(Parser)]
#[command(name = "clip-presence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the directory and update presence until stopped
    Run(RunArgs),
    /// Check that the directory can be watched and list existing files
    Check {
        /// Directory to watch
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },
    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show all configuration values
    List,
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example configuration
    Example,
}

async fn dispatch(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => cmd::run::run(args).await,
        Commands::Check { directory } => cmd::check::run(directory).await,
        Commands::Config(config_cmd) => {
            match config_cmd {
                ConfigCommands::List => cmd::config::run_list().await?,
                ConfigCommands::Path { create } => cmd::config::run_path(create).await?,
                ConfigCommands::Example => cmd::config::run_example().await?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Held until exit so file output is flushed
    let _log_guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::install_panic_hook();

    match dispatch(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

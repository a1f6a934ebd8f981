//! Digs CLI - boarding-house backend client

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, ConsoleObserver};
use digs_core::{JsonFileStore, SessionStore, StateDir};
use digs_http::SessionClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error, info};

#[derive(Parser)]
#[command(name = "digs")]
#[command(about = "Command line client for the Digs boarding-house backend")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory for config, session and logs (overrides platform defaults)
    #[arg(short = 'd', long, global = true, env = "DIGS_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/digs.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = cli
        .data_dir
        .clone()
        .map_or_else(StateDir::new, StateDir::with_override);
    logging::init_logging(cli.log_level.into(), &state_dir, "cli", cli.no_file_log)?;

    let (config_path, required) = cli
        .config
        .clone()
        .map_or_else(|| (state_dir.config_path(), false), |path| (path, true));
    let client_config = config::load_client_config(&config_path, required)?;
    debug!(config = ?client_config, path = %config_path.display(), "Loaded configuration");

    let store = JsonFileStore::new(state_dir.session_path());
    store.init().await?;

    let client = SessionClient::builder()
        .config(&client_config)
        .store(store)
        .observer(ConsoleObserver)
        .build()?;

    info!(base_url = client.base_url(), "Starting Digs CLI");

    let run = cli.command.execute(&client, &client_config);
    let result = if cli.timeout == 0 {
        run.await
    } else {
        match tokio::time::timeout(Duration::from_secs(cli.timeout), run).await {
            Ok(result) => result,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        error!("Command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

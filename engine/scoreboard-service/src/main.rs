//! Scoreboard
//!
//! Entry point for the terminal scoreboard. Commands are read from stdin one
//! per line; type `help` once running.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use round_clock::RoundMode;
use scoreboard_service::alerts::TerminalBell;
use scoreboard_service::{
    graceful_shutdown, initialize_logging, load_configuration, run, setup_signal_handlers,
    spawn_stdin_reader, Overrides, ScoreboardState,
};

#[derive(Parser)]
#[command(name = "scoreboard")]
#[command(about = "Combat-sport scoreboard with round timer, scores and match records")]
#[command(version)]
struct Cli {
    /// TOML configuration file (also SCOREBOARD_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Round length: 1, 2 or 3 minutes
    #[arg(short, long)]
    mode: Option<RoundMode>,

    /// Directory for the records file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let overrides = Overrides { mode: cli.mode, data_dir: cli.data_dir, log_level: cli.log_level };
    let config = load_configuration(cli.config.as_deref(), &overrides)?;

    // Initialize logging first; the guard flushes the log file on exit
    let _log_guard = initialize_logging(&config.logging)?;
    info!("Starting Scoreboard v{}", env!("CARGO_PKG_VERSION"));

    let shutdown_timeout = Duration::from_secs(config.service.shutdown_timeout_secs);
    let state = ScoreboardState::open(config).context("Failed to initialize scoreboard")?;

    println!("{}", "Scoreboard ready. Type 'help' for commands.".green().bold());

    let (input_tx, input_rx) = mpsc::channel(64);
    let _reader = spawn_stdin_reader(input_tx)?;

    let shutdown_signal = setup_signal_handlers()?;
    let (stop_tx, stop_rx) = oneshot::channel();

    let mut event_loop = tokio::spawn(async move {
        if let Err(e) = run(state, input_rx, stop_rx, TerminalBell, std::io::stdout()).await {
            error!("Scoreboard loop failed: {:#}", e);
        }
    });

    let signalled = tokio::select! {
        Ok(()) = shutdown_signal => true,
        result = &mut event_loop => {
            if let Err(e) = result {
                error!("Scoreboard task failed: {}", e);
            }
            false
        }
    };

    if signalled {
        info!("Shutdown signal received. Initiating graceful shutdown...");
        let _ = stop_tx.send(());
        graceful_shutdown("Scoreboard loop", event_loop, shutdown_timeout).await?;
    }

    info!("Scoreboard shutdown complete");
    Ok(())
}

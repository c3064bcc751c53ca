//! Scoreboard Service Library
//!
//! Terminal host for the match scoreboard: loads configuration, sets up
//! logging, owns the scoreboard state and drives the round clock from a tokio
//! interval while reading operator commands from stdin.

use anyhow::{Context, Result};
use std::path::Path;

pub mod alerts;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod service;
pub mod signals;

pub use config::{Overrides, ScoreboardConfig};
pub use logging::initialize_logging;
pub use service::{run, spawn_stdin_reader, ScoreboardState};
pub use signals::{graceful_shutdown, setup_signal_handlers};

/// Load configuration from file, environment variables and command line
pub fn load_configuration(path: Option<&Path>, overrides: &Overrides) -> Result<ScoreboardConfig> {
    config::load_config(path, overrides).context("Failed to load scoreboard configuration")
}

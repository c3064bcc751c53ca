//! Service configuration management

use anyhow::{Context, Result};
use round_clock::{ClockConfig, RoundMode};
use match_records::RecordsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SCOREBOARD_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreboardConfig {
    /// Round timer configuration
    pub clock: ClockConfig,

    /// Storage and export locations
    pub records: RecordsConfig,

    /// Service-level configuration
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Scoreboard sides, in display order
    pub competitors: Vec<String>,

    /// Ask y/n before reset, mode change, undo and other destructive commands
    pub confirm_destructive: bool,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,

    /// Log file path (if None, logs to stderr only)
    pub file: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            competitors: score_ledger::DEFAULT_COMPETITORS.iter().map(|c| c.to_string()).collect(),
            confirm_destructive: true,
            shutdown_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "pretty".to_string(), file: None }
    }
}

/// Command-line values that win over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<RoundMode>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Load configuration from file, environment and command line, in that order
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<ScoreboardConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    let mut config = match path {
        Some(path) => load_from_file(&path)?,
        None => ScoreboardConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    apply_overrides(&mut config, overrides);
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ScoreboardConfig> {
    tracing::debug!("Loading configuration from file: {:?}", path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Save configuration to a TOML file
pub fn save_config(config: &ScoreboardConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))
}

/// Override with environment variables. `lookup` is `std::env::var` in production.
pub fn apply_env(
    config: &mut ScoreboardConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(level) = lookup("SCOREBOARD_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("SCOREBOARD_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(data_dir) = lookup("SCOREBOARD_DATA_DIR") {
        config.records.data_dir = PathBuf::from(data_dir);
    }

    if let Some(mode) = lookup("SCOREBOARD_MODE") {
        config.clock.default_mode =
            mode.parse().with_context(|| format!("Invalid SCOREBOARD_MODE: {}", mode))?;
    }

    Ok(())
}

pub fn apply_overrides(config: &mut ScoreboardConfig, overrides: &Overrides) {
    if let Some(mode) = overrides.mode {
        config.clock.default_mode = mode;
    }
    if let Some(data_dir) = &overrides.data_dir {
        config.records.data_dir = data_dir.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }
}

/// Validate configuration
pub fn validate_config(config: &ScoreboardConfig) -> Result<()> {
    config.clock.validate().context("Invalid clock configuration")?;
    config.records.validate().map_err(|e| anyhow::anyhow!("Invalid records configuration: {}", e))?;

    if config.service.competitors.is_empty() {
        return Err(anyhow::anyhow!("At least one competitor is required"));
    }

    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    Ok(())
}

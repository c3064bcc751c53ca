//! Configuration for RoundClock

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClockError;
use crate::schedule::{AlertCue, AlertSchedule};
use crate::{DEFAULT_SUPPORTED_DURATIONS, DEFAULT_TICK_INTERVAL_MS};

/// Round length presets offered by the scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    OneMinute,
    TwoMinute,
    ThreeMinute,
}

impl RoundMode {
    pub const ALL: [RoundMode; 3] =
        [RoundMode::OneMinute, RoundMode::TwoMinute, RoundMode::ThreeMinute];

    /// Round length in seconds
    pub fn duration_seconds(self) -> u32 {
        match self {
            RoundMode::OneMinute => 60,
            RoundMode::TwoMinute => 120,
            RoundMode::ThreeMinute => 180,
        }
    }

    /// Preset matching a round length, if any
    pub fn from_duration(seconds: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.duration_seconds() == seconds)
    }
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}min", self.duration_seconds() / 60)
    }
}

impl FromStr for RoundMode {
    type Err = ClockError;

    /// Accepts minutes (`2`, `2m`, `2min`), seconds (`120`, `120s`) or the snake_case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let mode = match value.as_str() {
            "1" | "1m" | "1min" | "60" | "60s" | "one_minute" => RoundMode::OneMinute,
            "2" | "2m" | "2min" | "120" | "120s" | "two_minute" => RoundMode::TwoMinute,
            "3" | "3m" | "3min" | "180" | "180s" | "three_minute" => RoundMode::ThreeMinute,
            _ => return Err(ClockError::UnknownMode(s.to_string())),
        };
        Ok(mode)
    }
}

/// Configuration for the RoundClock and for the host that drives it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Mode selected at startup
    pub default_mode: RoundMode,

    /// Host polling cadence in milliseconds (default: 10ms)
    pub tick_interval_ms: u64,

    /// Round lengths `configure` accepts
    pub supported_durations: Vec<u32>,

    /// How long the panel flash stays visible in milliseconds
    pub flash_ms: u64,

    /// Which seconds produce a short alert
    pub schedule: AlertSchedule,

    /// Pattern played for a short alert
    pub short_alert: AlertCue,

    /// Pattern played at round end
    pub long_alert: AlertCue,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            default_mode: RoundMode::TwoMinute,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            supported_durations: DEFAULT_SUPPORTED_DURATIONS.to_vec(),
            flash_ms: 900,
            schedule: AlertSchedule::default(),
            short_alert: AlertCue::SHORT,
            long_alert: AlertCue::LONG_SEQUENCE,
        }
    }
}

impl ClockConfig {
    /// Get tick interval as Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Get flash length as Duration
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    /// Whether `configure` would accept this round length
    pub fn supports(&self, seconds: u32) -> bool {
        seconds > 0 && self.supported_durations.contains(&seconds)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ClockError> {
        if self.tick_interval_ms == 0 {
            return Err(ClockError::Config("tick_interval_ms must be greater than 0".to_string()));
        }

        if self.supported_durations.is_empty() {
            return Err(ClockError::Config("supported_durations must not be empty".to_string()));
        }

        if self.supported_durations.contains(&0) {
            return Err(ClockError::Config("round durations must be positive".to_string()));
        }

        if !self.supports(self.default_mode.duration_seconds()) {
            return Err(ClockError::Config(format!(
                "default mode {} is not in supported_durations",
                self.default_mode
            )));
        }

        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ClockConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

//! Error types for RoundClock

use thiserror::Error;

/// Errors that can occur in the RoundClock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Invalid round duration: {seconds}s (supported: {supported:?})")]
    InvalidDuration { seconds: u32, supported: Vec<u32> },

    #[error("Unknown round mode: {0}")]
    UnknownMode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

//! Error types for the records layer

use thiserror::Error;

/// Result type alias for records operations
pub type Result<T> = std::result::Result<T, RecordsError>;

/// Errors that can occur while keeping scoreboard records
#[derive(Error, Debug)]
pub enum RecordsError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Raffle range must be at least 1 (got {0})")]
    InvalidRange(i64),

    #[error("Set the raffle range first")]
    RangeNotSet,

    #[error("Enter a name to draw for")]
    EmptyName,

    #[error("All numbers from 1 to {max} have been drawn")]
    Exhausted { max: u32 },

    #[error("Changing the range from {current} to {requested} discards {drawn} drawn result(s)")]
    RangeChangeNeedsConfirmation { current: u32, requested: u32, drawn: usize },

    #[error("Unknown export format '{0}' (use csv or txt)")]
    UnknownFormat(String),

    #[error("Nothing to export")]
    NothingToExport,

    #[error("Match record {0} not found")]
    RecordNotFound(u64),

    #[error("Bracket row {0} not found")]
    RowNotFound(usize),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
}

impl RecordsError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid edit error
    pub fn invalid_edit(msg: impl Into<String>) -> Self {
        Self::InvalidEdit(msg.into())
    }
}

//! Configuration for the records layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where records live and under which keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Base directory for the store file
    pub data_dir: PathBuf,

    /// File name of the JSON key-value store inside `data_dir`
    pub store_file: String,

    /// Key the bracket table is stored under
    pub bracket_key: String,

    /// Key the match ledger is stored under
    pub matches_key: String,

    /// Directory export files are written to
    pub export_dir: PathBuf,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            store_file: "scoreboard.json".to_string(),
            bracket_key: "bracket".to_string(),
            matches_key: "matches".to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl RecordsConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// Full path of the store file
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.store_file.trim().is_empty() {
            return Err("store_file must not be empty".to_string());
        }

        if self.store_file.contains(['/', '\\']) {
            return Err(format!("store_file must be a bare file name, got {}", self.store_file));
        }

        if self.bracket_key.trim().is_empty() || self.matches_key.trim().is_empty() {
            return Err("record keys must not be empty".to_string());
        }

        if self.bracket_key == self.matches_key {
            return Err("bracket_key and matches_key must differ".to_string());
        }

        Ok(())
    }
}

//! Tournament bracket rows persisted as a single JSON blob

use serde::{Deserialize, Serialize};

use crate::backend::BlobStore;
use crate::error::{RecordsError, Result};

/// One pairing in the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRow {
    pub round: String,
    pub p1: String,
    pub p2: String,
    #[serde(default)]
    pub winner: String,
}

impl BracketRow {
    pub fn new(round: impl Into<String>, p1: impl Into<String>, p2: impl Into<String>) -> Self {
        Self { round: round.into(), p1: p1.into(), p2: p2.into(), winner: String::new() }
    }

    pub fn with_winner(mut self, winner: impl Into<String>) -> Self {
        self.winner = winner.into();
        self
    }

    pub fn is_decided(&self) -> bool {
        !self.winner.trim().is_empty()
    }
}

/// Bracket rows in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketTable {
    rows: Vec<BracketRow>,
}

impl BracketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table stored under `key`. A missing or unreadable blob
    /// yields an empty table.
    pub fn load(store: &dyn BlobStore, key: &str) -> Self {
        let Some(blob) = store.load(key) else {
            return Self::new();
        };

        match serde_json::from_str::<Vec<BracketRow>>(&blob) {
            Ok(rows) => {
                tracing::debug!("Loaded {} bracket rows from {}", rows.len(), key);
                Self { rows }
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable bracket data under {}: {}", key, e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &dyn BlobStore, key: &str) -> Result<()> {
        let blob = serde_json::to_string(&self.rows)?;
        store.save(key, &blob)
    }

    /// Append a row and return its index
    pub fn add_row(&mut self, row: BracketRow) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn update_row(&mut self, index: usize, row: BracketRow) -> Result<()> {
        let slot = self.rows.get_mut(index).ok_or(RecordsError::RowNotFound(index))?;
        *slot = row;
        Ok(())
    }

    /// Set only the winner of an existing row
    pub fn set_winner(&mut self, index: usize, winner: impl Into<String>) -> Result<()> {
        let slot = self.rows.get_mut(index).ok_or(RecordsError::RowNotFound(index))?;
        slot.winner = winner.into();
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<BracketRow> {
        if index >= self.rows.len() {
            return Err(RecordsError::RowNotFound(index));
        }
        Ok(self.rows.remove(index))
    }

    pub fn rows(&self) -> &[BracketRow] {
        &self.rows
    }

    /// Rows ordered by round label, then first player, each with its
    /// storage index
    pub fn sorted_rows(&self) -> Vec<(usize, &BracketRow)> {
        let mut rows: Vec<(usize, &BracketRow)> = self.rows.iter().enumerate().collect();
        rows.sort_by(|(_, a), (_, b)| a.round.cmp(&b.round).then_with(|| a.p1.cmp(&b.p1)));
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

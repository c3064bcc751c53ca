//! Core ScoreLedger implementation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;
use crate::points::Points;
use crate::{Result, DEFAULT_COMPETITORS};

/// Identifies one side of the scoreboard
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(String);

impl CompetitorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompetitorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One recorded score change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub competitor: CompetitorId,
    pub delta: Points,
}

/// Point totals for a fixed set of competitors plus an undo stack
#[derive(Debug, Clone)]
pub struct ScoreLedger {
    totals: Vec<(CompetitorId, Points)>,
    history: Vec<LedgerEntry>,
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new(DEFAULT_COMPETITORS.iter().copied().map(CompetitorId::from))
    }
}

impl ScoreLedger {
    /// Create a ledger with every competitor at zero. Duplicate ids are kept once.
    pub fn new(competitors: impl IntoIterator<Item = CompetitorId>) -> Self {
        let mut totals: Vec<(CompetitorId, Points)> = Vec::new();
        for competitor in competitors {
            if !totals.iter().any(|(id, _)| *id == competitor) {
                totals.push((competitor, Points::ZERO));
            }
        }
        Self { totals, history: Vec::new() }
    }

    fn slot(&mut self, competitor: &CompetitorId) -> Result<&mut Points> {
        self.totals
            .iter_mut()
            .find(|(id, _)| id == competitor)
            .map(|(_, total)| total)
            .ok_or_else(|| LedgerError::UnknownCompetitor { competitor: competitor.to_string() })
    }

    /// Apply a delta, clamping the total at zero and saturating at the decimal
    /// maximum. The requested delta is always recorded.
    pub fn add(&mut self, competitor: &CompetitorId, amount: Points) -> Result<Points> {
        let total = self.slot(competitor)?;
        *total = total.saturating_add(amount).clamp_non_negative();
        let new_total = *total;

        self.history.push(LedgerEntry { competitor: competitor.clone(), delta: amount });
        tracing::debug!("{} {} -> {}", competitor, amount, new_total);
        Ok(new_total)
    }

    /// Zero one competitor. The zeroing is recorded so it can be undone; an
    /// already-zero total leaves the history untouched.
    pub fn reset_one(&mut self, competitor: &CompetitorId) -> Result<()> {
        let total = self.slot(competitor)?;
        let previous = *total;
        *total = Points::ZERO;

        if !previous.is_zero() {
            self.history.push(LedgerEntry { competitor: competitor.clone(), delta: -previous });
            tracing::debug!("{} reset from {}", competitor, previous);
        }
        Ok(())
    }

    /// Reverse the most recent entry and hand it back
    pub fn undo(&mut self) -> Result<LedgerEntry> {
        let entry = self.history.pop().ok_or(LedgerError::EmptyHistory)?;

        let total = self.slot(&entry.competitor)?;
        *total = total.saturating_sub(entry.delta).clamp_non_negative();
        let new_total = *total;

        tracing::info!("Undid {} {} -> {}", entry.competitor, entry.delta, new_total);
        Ok(entry)
    }

    /// The entry `undo` would reverse next
    pub fn last_entry(&self) -> Option<&LedgerEntry> {
        self.history.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn total(&self, competitor: &CompetitorId) -> Result<Points> {
        self.totals
            .iter()
            .find(|(id, _)| id == competitor)
            .map(|(_, total)| *total)
            .ok_or_else(|| LedgerError::UnknownCompetitor { competitor: competitor.to_string() })
    }

    /// Totals in competitor order
    pub fn totals(&self) -> &[(CompetitorId, Points)] {
        &self.totals
    }

    pub fn competitors(&self) -> impl Iterator<Item = &CompetitorId> {
        self.totals.iter().map(|(id, _)| id)
    }

    pub fn history(&self) -> &[LedgerEntry] {
        &self.history
    }

    /// Zero every total and drop the history (new match)
    pub fn clear(&mut self) {
        for (_, total) in self.totals.iter_mut() {
            *total = Points::ZERO;
        }
        self.history.clear();
    }
}

//! Finished-match ledger with inline editing

use chrono::{DateTime, Utc};
use score_ledger::Points;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::backend::BlobStore;
use crate::error::{RecordsError, Result};
use crate::export;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Red,
    Blue,
    Draw,
}

impl Winner {
    /// Greater total wins, equal totals draw
    pub fn from_totals(red: Points, blue: Points) -> Self {
        match red.cmp(&blue) {
            std::cmp::Ordering::Greater => Winner::Red,
            std::cmp::Ordering::Less => Winner::Blue,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Winner::Red => "red",
            Winner::Blue => "blue",
            Winner::Draw => "draw",
        })
    }
}

impl FromStr for Winner {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Winner::Red),
            "blue" | "b" => Ok(Winner::Blue),
            "draw" | "d" | "tie" => Ok(Winner::Draw),
            other => Err(RecordsError::invalid_edit(format!("unknown winner '{}'", other))),
        }
    }
}

/// One finished match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    pub round_label: String,
    pub elapsed_seconds: u32,
    pub red: Points,
    pub blue: Points,
    pub winner: Winner,
    #[serde(default)]
    pub note: String,
    pub recorded_at: DateTime<Utc>,
}

/// A partial update to a [`MatchRecord`]; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchEdit {
    pub round_label: Option<String>,
    pub elapsed_seconds: Option<u32>,
    pub red: Option<Points>,
    pub blue: Option<Points>,
    pub winner: Option<Winner>,
    pub note: Option<String>,
}

impl MatchEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply one `field=value` assignment, e.g. `red=3.5` or `elapsed=1:45`
    pub fn parse_assignment(&mut self, assignment: &str) -> Result<()> {
        let (field, value) = assignment.split_once('=').ok_or_else(|| {
            RecordsError::invalid_edit(format!("expected field=value, got '{}'", assignment))
        })?;
        let value = value.trim();

        match field.trim().to_ascii_lowercase().as_str() {
            "round" | "label" => self.round_label = Some(value.to_string()),
            "elapsed" | "time" => self.elapsed_seconds = Some(parse_elapsed(value)?),
            "red" => self.red = Some(parse_points(value)?),
            "blue" => self.blue = Some(parse_points(value)?),
            "winner" => self.winner = Some(value.parse()?),
            "note" => self.note = Some(value.to_string()),
            other => return Err(RecordsError::invalid_edit(format!("unknown field '{}'", other))),
        }
        Ok(())
    }

    /// Build an edit from a list of assignments
    pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut edit = Self::default();
        for assignment in assignments {
            edit.parse_assignment(assignment)?;
        }
        Ok(edit)
    }
}

fn parse_points(value: &str) -> Result<Points> {
    let points: Points = value
        .parse()
        .map_err(|_| RecordsError::invalid_edit(format!("invalid score '{}'", value)))?;
    if points.is_negative() {
        return Err(RecordsError::invalid_edit(format!("score cannot be negative: {}", value)));
    }
    Ok(points)
}

/// Accepts plain seconds (`105`) or `M:SS` (`1:45`)
fn parse_elapsed(value: &str) -> Result<u32> {
    let invalid = || RecordsError::invalid_edit(format!("invalid elapsed time '{}'", value));

    match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
            let seconds: u32 = seconds.trim().parse().map_err(|_| invalid())?;
            if seconds >= 60 {
                return Err(invalid());
            }
            minutes.checked_mul(60).and_then(|s| s.checked_add(seconds)).ok_or_else(invalid)
        }
        None => value.parse().map_err(|_| invalid()),
    }
}

/// Ordered list of finished matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLedger {
    records: Vec<MatchRecord>,
    next_id: u64,
}

impl Default for MatchLedger {
    fn default() -> Self {
        Self { records: Vec::new(), next_id: 1 }
    }
}

impl MatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ledger stored under `key`; missing or unreadable data gives
    /// an empty ledger
    pub fn load(store: &dyn BlobStore, key: &str) -> Self {
        let Some(blob) = store.load(key) else {
            return Self::new();
        };

        match serde_json::from_str::<MatchLedger>(&blob) {
            Ok(mut ledger) => {
                // keep ids unique even if next_id was hand-edited
                let max_id = ledger.records.iter().map(|r| r.id).max().unwrap_or(0);
                ledger.next_id = ledger.next_id.max(max_id + 1);
                ledger
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable match data under {}: {}", key, e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &dyn BlobStore, key: &str) -> Result<()> {
        let blob = serde_json::to_string(self)?;
        store.save(key, &blob)
    }

    /// Append a finished match; the winner follows the totals
    pub fn record(
        &mut self,
        round_label: impl Into<String>,
        elapsed_seconds: u32,
        red: Points,
        blue: Points,
    ) -> &MatchRecord {
        let id = self.next_id;
        self.next_id += 1;

        let record = MatchRecord {
            id,
            round_label: round_label.into(),
            elapsed_seconds,
            red,
            blue,
            winner: Winner::from_totals(red, blue),
            note: String::new(),
            recorded_at: Utc::now(),
        };
        tracing::info!("Recorded match #{}: red {} / blue {} ({})", id, red, blue, record.winner);

        let idx = self.records.len();
        self.records.push(record);
        &self.records[idx]
    }

    /// Apply an edit. Changed scores re-derive the winner unless the same
    /// edit sets one.
    pub fn edit(&mut self, id: u64, edit: MatchEdit) -> Result<&MatchRecord> {
        if edit.is_empty() {
            return Err(RecordsError::invalid_edit("nothing to change"));
        }

        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RecordsError::RecordNotFound(id))?;

        let scores_changed = edit.red.is_some() || edit.blue.is_some();
        if let Some(label) = edit.round_label {
            record.round_label = label;
        }
        if let Some(elapsed) = edit.elapsed_seconds {
            record.elapsed_seconds = elapsed;
        }
        if let Some(red) = edit.red {
            record.red = red;
        }
        if let Some(blue) = edit.blue {
            record.blue = blue;
        }
        if let Some(note) = edit.note {
            record.note = note;
        }
        match edit.winner {
            Some(winner) => record.winner = winner,
            None if scores_changed => record.winner = Winner::from_totals(record.red, record.blue),
            None => {}
        }

        tracing::debug!("Edited match #{}", id);
        Ok(record)
    }

    pub fn remove(&mut self, id: u64) -> Result<MatchRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(RecordsError::RecordNotFound(id))?;
        Ok(self.records.remove(idx))
    }

    pub fn get(&self, id: u64) -> Option<&MatchRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_csv(&self) -> String {
        export::match_csv(&self.records)
    }

    pub fn to_txt(&self) -> String {
        export::match_txt(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBlobStore;

    #[test]
    fn test_record_derives_winner() {
        let mut ledger = MatchLedger::new();
        assert_eq!(ledger.record("QF", 120, Points::new(3), Points::new(1)).winner, Winner::Red);
        let record = ledger.record("QF", 120, Points::new(0), Points::from_tenths(5));
        assert_eq!(record.winner, Winner::Blue);
        assert_eq!(ledger.record("SF", 95, Points::new(2), Points::new(2)).winner, Winner::Draw);

        let ids: Vec<_> = ledger.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_edit_scores_rederives_winner() {
        let mut ledger = MatchLedger::new();
        ledger.record("F", 180, Points::new(3), Points::new(1));

        let edit = MatchEdit::from_assignments(["blue=4"]).unwrap();
        let record = ledger.edit(1, edit).unwrap();
        assert_eq!(record.blue, Points::new(4));
        assert_eq!(record.winner, Winner::Blue);
    }

    #[test]
    fn test_explicit_winner_wins_over_scores() {
        let mut ledger = MatchLedger::new();
        ledger.record("F", 180, Points::new(3), Points::new(1));

        let edit =
            MatchEdit::from_assignments(["blue=4", "winner=red", "note=referee decision"]).unwrap();
        let record = ledger.edit(1, edit).unwrap();
        assert_eq!(record.winner, Winner::Red);
        assert_eq!(record.note, "referee decision");
    }

    #[test]
    fn test_edit_label_keeps_winner() {
        let mut ledger = MatchLedger::new();
        ledger.record("F", 180, Points::new(1), Points::new(1));
        ledger.edit(1, MatchEdit::from_assignments(["winner=blue"]).unwrap()).unwrap();

        let edit = MatchEdit::from_assignments(["round=Final", "elapsed=2:05"]).unwrap();
        let record = ledger.edit(1, edit).unwrap();
        assert_eq!(record.winner, Winner::Blue);
        assert_eq!(record.round_label, "Final");
        assert_eq!(record.elapsed_seconds, 125);
    }

    #[test]
    fn test_edit_errors() {
        let mut ledger = MatchLedger::new();
        ledger.record("F", 180, Points::new(1), Points::new(0));

        let edit = MatchEdit::from_assignments(["red=1"]).unwrap();
        assert!(matches!(ledger.edit(9, edit), Err(RecordsError::RecordNotFound(9))));
        assert!(matches!(ledger.edit(1, MatchEdit::default()), Err(RecordsError::InvalidEdit(_))));

        let bad_edits = [
            "red",
            "red=abc",
            "red=-1",
            "winner=green",
            "elapsed=1:75",
            "elapsed=99999999:00",
            "colour=red",
        ];
        for bad in bad_edits {
            assert!(
                matches!(MatchEdit::from_assignments([bad]), Err(RecordsError::InvalidEdit(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_remove() {
        let mut ledger = MatchLedger::new();
        ledger.record("A", 60, Points::new(1), Points::new(0));
        ledger.record("B", 60, Points::new(0), Points::new(1));

        assert_eq!(ledger.remove(1).unwrap().round_label, "A");
        assert!(matches!(ledger.remove(1), Err(RecordsError::RecordNotFound(1))));

        // ids are never reused
        assert_eq!(ledger.record("C", 60, Points::ZERO, Points::ZERO).id, 3);
    }

    #[test]
    fn test_persistence() {
        let store = InMemoryBlobStore::new();
        let mut ledger = MatchLedger::new();
        ledger.record("QF", 120, Points::from_tenths(25), Points::new(1));
        ledger.save(&store, "matches").unwrap();

        let mut loaded = MatchLedger::load(&store, "matches");
        assert_eq!(loaded, ledger);
        assert_eq!(loaded.record("SF", 60, Points::ZERO, Points::ZERO).id, 2);

        store.save("matches", "garbage").unwrap();
        assert!(MatchLedger::load(&store, "matches").is_empty());
    }
}

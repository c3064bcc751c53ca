//! Error types for ScoreLedger

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Nothing to undo")]
    EmptyHistory,

    #[error("Unknown competitor: {competitor}")]
    UnknownCompetitor { competitor: String },

    #[error("Invalid point amount: {input}")]
    InvalidAmount { input: String },
}

//! ScoreLedger - competitor point totals with undo
//!
//! Totals never go below zero: every change is clamped. The history records the
//! delta that was *requested*, not the one that was applied, so an undo after a
//! clamp does not necessarily restore the earlier total.

pub mod error;
pub mod ledger;
pub mod points;

pub use error::LedgerError;
pub use ledger::{CompetitorId, LedgerEntry, ScoreLedger};
pub use points::{format_points, Points};

// Result type alias
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Competitors on a standard sparring scoreboard
pub const DEFAULT_COMPETITORS: [&str; 2] = ["red", "blue"];

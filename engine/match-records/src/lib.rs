//! # Match Records
//!
//! Everything the scoreboard keeps besides the live clock and score:
//!
//! - **BlobStore**: flat key-value storage, one string blob per key
//! - **LocalBlobStore**: a single JSON file under the data directory
//! - **BracketTable**: tournament rows `{round, p1, p2, winner}` stored as one JSON blob
//! - **MatchLedger**: finished matches with inline editing
//! - **RaffleDraw**: unique-number drawing for the vote/lottery panel
//! - **export**: CSV/TXT formatting of raffle and match results
//!
//! ## Usage
//!
//! ```rust
//! use match_records::{BracketRow, BracketTable, InMemoryBlobStore};
//!
//! let store = InMemoryBlobStore::new();
//! let mut table = BracketTable::load(&store, "bracket");
//! table.add_row(BracketRow::new("QF", "Kim", "Lee"));
//! table.save(&store, "bracket").unwrap();
//!
//! assert_eq!(BracketTable::load(&store, "bracket").len(), 1);
//! ```

pub mod backend;
pub mod bracket;
pub mod config;
pub mod error;
pub mod export;
pub mod matches;
pub mod raffle;

pub use backend::{BlobStore, InMemoryBlobStore, LocalBlobStore};
pub use bracket::{BracketRow, BracketTable};
pub use config::RecordsConfig;
pub use error::{RecordsError, Result};
pub use export::{write_export, ExportFormat};
pub use matches::{MatchEdit, MatchLedger, MatchRecord, Winner};
pub use raffle::{RaffleDraw, RaffleEntry};

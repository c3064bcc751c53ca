//! # RoundClock
//!
//! The match timer. A host feeds wall-clock milliseconds into [`RoundClock::tick`];
//! the clock derives whole seconds, asks its [`AnnouncementPolicy`] what should
//! happen at that second, and hands back the resulting [`AnnouncementEvent`]s
//! together with the `MM:SS.CC` display string.
//!
//! The clock never reads a timer itself, so every behavior can be exercised with
//! synthetic timestamps.

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod schedule;

#[cfg(test)]
mod tests;

pub use clock::{format_time, ClockState, RoundClock, TickOutcome};
pub use config::{ClockConfig, RoundMode};
pub use error::ClockError;
pub use metrics::ClockMetrics;
pub use schedule::{
    evaluate, AlertCue, AlertSchedule, AnnouncementEvent, AnnouncementPolicy, Marker,
};

/// Current version of the round clock
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milliseconds as supplied by the host's time source
pub type Millis = u64;

/// Default host polling cadence (100Hz = 10ms per poll)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Round lengths the stock modes offer
pub const DEFAULT_SUPPORTED_DURATIONS: [u32; 3] = [60, 120, 180];

//! Metrics collection for RoundClock

use serde::{Deserialize, Serialize};

use crate::schedule::AnnouncementEvent;

/// Counters collected by the RoundClock over its lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockMetrics {
    /// Ticks received while running
    pub ticks_processed: u64,

    /// Whole seconds for which the policy was consulted
    pub seconds_evaluated: u64,

    /// Ticks that landed in an already-evaluated second
    pub duplicate_ticks: u64,

    /// Short alerts handed to the host
    pub short_alerts: u64,

    /// Long alert sequences handed to the host
    pub long_alerts: u64,

    /// Rounds that ran to their configured length
    pub rounds_completed: u64,

    /// Start/resume transitions
    pub starts: u64,

    /// Pause transitions
    pub pauses: u64,

    /// Explicit resets, including those caused by a mode change
    pub resets: u64,
}

impl ClockMetrics {
    /// Record a tick and whether it landed in a new second
    pub fn record_tick(&mut self, new_second: bool) {
        self.ticks_processed += 1;
        if new_second {
            self.seconds_evaluated += 1;
        } else {
            self.duplicate_ticks += 1;
        }
    }

    /// Record the events emitted for one second
    pub fn record_events(&mut self, events: &[AnnouncementEvent]) {
        for event in events {
            match event {
                AnnouncementEvent::ShortAlert => self.short_alerts += 1,
                AnnouncementEvent::LongAlertSequence => self.long_alerts += 1,
                AnnouncementEvent::RoundEnd => {
                    self.long_alerts += 1;
                    self.rounds_completed += 1;
                }
            }
        }
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

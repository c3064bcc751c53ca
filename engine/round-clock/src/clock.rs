//! Core RoundClock implementation

use serde::{Deserialize, Serialize};

use crate::config::{ClockConfig, RoundMode};
use crate::error::ClockError;
use crate::metrics::ClockMetrics;
use crate::schedule::{AlertSchedule, AnnouncementEvent, AnnouncementPolicy};
use crate::{Millis, DEFAULT_SUPPORTED_DURATIONS};

/// Lifecycle of one round attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockState {
    /// Never started since creation or the last reset
    Idle,
    /// Anchored to the host's clock and accepting ticks
    Running,
    /// Stopped with accumulated time preserved
    Paused,
    /// Stopped at exactly the round length; only reset or configure leave this state
    Finished,
}

/// Result of feeding one timestamp into the clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Elapsed time formatted as `MM:SS.CC`
    pub display: String,

    /// Elapsed time credited to the round
    pub elapsed_ms: u64,

    /// Announcements due for the second this tick landed in
    pub events: Vec<AnnouncementEvent>,

    /// True once the round has reached its configured length
    pub finished: bool,
}

/// Round timer driven by host-supplied timestamps
#[derive(Debug, Clone)]
pub struct RoundClock<P = AlertSchedule> {
    duration_seconds: u32,
    elapsed_ms: u64,
    // Host timestamp at which the current run would have started from zero.
    // Signed so that resuming near the host's epoch cannot underflow.
    anchor_ms: Option<i64>,
    last_announced_second: Option<u32>,
    state: ClockState,
    supported_durations: Vec<u32>,
    policy: P,
    metrics: ClockMetrics,
}

impl RoundClock<AlertSchedule> {
    /// Create a clock for one of the stock modes with the stock schedule
    pub fn new(mode: RoundMode) -> Self {
        Self {
            duration_seconds: mode.duration_seconds(),
            elapsed_ms: 0,
            anchor_ms: None,
            last_announced_second: None,
            state: ClockState::Idle,
            supported_durations: DEFAULT_SUPPORTED_DURATIONS.to_vec(),
            policy: AlertSchedule::default(),
            metrics: ClockMetrics::default(),
        }
    }

    /// Create a clock from configuration
    pub fn from_config(config: &ClockConfig) -> Result<Self, ClockError> {
        config.validate()?;
        RoundClock::with_policy(
            config.default_mode.duration_seconds(),
            config.supported_durations.clone(),
            config.schedule.clone(),
        )
    }
}

impl<P: AnnouncementPolicy> RoundClock<P> {
    /// Create a clock with a caller-supplied announcement policy
    pub fn with_policy(
        duration_seconds: u32,
        supported_durations: Vec<u32>,
        policy: P,
    ) -> Result<Self, ClockError> {
        if duration_seconds == 0 || !supported_durations.contains(&duration_seconds) {
            return Err(ClockError::InvalidDuration {
                seconds: duration_seconds,
                supported: supported_durations,
            });
        }

        tracing::debug!("Creating RoundClock with {}s rounds", duration_seconds);

        Ok(Self {
            duration_seconds,
            elapsed_ms: 0,
            anchor_ms: None,
            last_announced_second: None,
            state: ClockState::Idle,
            supported_durations,
            policy,
            metrics: ClockMetrics::default(),
        })
    }

    /// Change the round length.
    ///
    /// Returns `Ok(false)` without touching anything when the length is unchanged.
    /// Any other accepted length resets the clock. Asking the user whether they
    /// really want to lose the running round is the host's job.
    pub fn configure(&mut self, duration_seconds: u32) -> Result<bool, ClockError> {
        if duration_seconds == 0 || !self.supported_durations.contains(&duration_seconds) {
            return Err(ClockError::InvalidDuration {
                seconds: duration_seconds,
                supported: self.supported_durations.clone(),
            });
        }

        if duration_seconds == self.duration_seconds {
            return Ok(false);
        }

        tracing::info!(
            "Round length changed from {}s to {}s",
            self.duration_seconds,
            duration_seconds
        );
        self.duration_seconds = duration_seconds;
        self.reset();
        Ok(true)
    }

    /// Change the round length to a stock mode
    pub fn configure_mode(&mut self, mode: RoundMode) -> Result<bool, ClockError> {
        self.configure(mode.duration_seconds())
    }

    /// Start or resume at host time `now`.
    ///
    /// Re-anchors so that accumulated time is preserved exactly; no-op when
    /// already running or finished.
    pub fn start(&mut self, now: Millis) {
        match self.state {
            ClockState::Running => return,
            ClockState::Finished => {
                tracing::debug!("Ignoring start on a finished round");
                return;
            }
            ClockState::Idle | ClockState::Paused => {}
        }

        self.anchor_ms = Some(now as i64 - self.elapsed_ms as i64);
        self.state = ClockState::Running;
        self.metrics.starts += 1;
        tracing::debug!("RoundClock started at {}ms with {}ms elapsed", now, self.elapsed_ms);
    }

    /// Freeze the clock at the last computed elapsed time; no-op unless running
    pub fn pause(&mut self) {
        if self.state != ClockState::Running {
            return;
        }

        self.anchor_ms = None;
        self.state = ClockState::Paused;
        self.metrics.pauses += 1;
        tracing::debug!("RoundClock paused at {}ms", self.elapsed_ms);
    }

    /// Stop, zero the elapsed time and forget which seconds were announced
    pub fn reset(&mut self) {
        self.anchor_ms = None;
        self.elapsed_ms = 0;
        self.last_announced_second = None;
        self.state = ClockState::Idle;
        self.metrics.resets += 1;
        tracing::debug!("RoundClock reset");
    }

    /// Advance to host time `now` and collect any announcements that became due
    pub fn tick(&mut self, now: Millis) -> TickOutcome {
        let Some(anchor) = self.anchor_ms else {
            return self.outcome(Vec::new());
        };

        let measured = (now as i64 - anchor).max(0) as u64;
        self.elapsed_ms = self.elapsed_ms.max(measured);

        let whole_seconds = u32::try_from(self.elapsed_ms / 1000).unwrap_or(u32::MAX);

        if whole_seconds >= self.duration_seconds {
            self.elapsed_ms = u64::from(self.duration_seconds) * 1000;
            let events = self.announce(self.duration_seconds);
            self.anchor_ms = None;
            self.state = ClockState::Finished;
            tracing::info!("Round finished at {}s", self.duration_seconds);
            return self.outcome(events);
        }

        let events = self.announce(whole_seconds);
        self.outcome(events)
    }

    /// Consult the policy at most once per whole second of a round attempt
    fn announce(&mut self, second: u32) -> Vec<AnnouncementEvent> {
        if self.last_announced_second == Some(second) {
            self.metrics.record_tick(false);
            return Vec::new();
        }

        self.last_announced_second = Some(second);
        self.metrics.record_tick(true);

        let events = self.policy.evaluate(second, self.duration_seconds);
        if !events.is_empty() {
            tracing::debug!(second = second, events = ?events, "Announcements due");
        }
        self.metrics.record_events(&events);
        events
    }

    fn outcome(&self, events: Vec<AnnouncementEvent>) -> TickOutcome {
        TickOutcome {
            display: self.display(),
            elapsed_ms: self.elapsed_ms,
            events,
            finished: self.state == ClockState::Finished,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Check if clock is running
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Elapsed time credited to the current round attempt
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whole seconds elapsed
    pub fn elapsed_seconds(&self) -> u32 {
        u32::try_from(self.elapsed_ms / 1000).unwrap_or(u32::MAX)
    }

    /// Configured round length
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Time left until the round ends
    pub fn remaining_ms(&self) -> u64 {
        (u64::from(self.duration_seconds) * 1000).saturating_sub(self.elapsed_ms)
    }

    /// Last whole second the policy was consulted for
    pub fn last_announced_second(&self) -> Option<u32> {
        self.last_announced_second
    }

    /// Elapsed time formatted for display
    pub fn display(&self) -> String {
        format_time(self.elapsed_ms)
    }

    /// Lifetime counters
    pub fn metrics(&self) -> &ClockMetrics {
        &self.metrics
    }

    /// The policy in use
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

/// Format milliseconds as `MM:SS.CC`, truncating to centiseconds.
///
/// Minutes keep counting past 99 rather than wrapping.
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

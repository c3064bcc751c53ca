//! Announcement schedule
//!
//! Which seconds of a round deserve a cue is described as data: a list of
//! [`Marker`]s interpreted against the round length `T`. The stock schedule is
//! "every full minute before the end, 30s before the end, 10s before the end,
//! then every second of the last nine", with the round-end cue at `T` itself.

use serde::{Deserialize, Serialize};

/// What the host should present for a given second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnouncementEvent {
    /// One short beep plus a panel flash
    ShortAlert,
    /// The multi-pulse end-of-round pattern
    LongAlertSequence,
    /// The round reached its configured length; the clock has stopped
    RoundEnd,
}

impl AnnouncementEvent {
    /// Audible pattern for this event
    pub fn cue(self) -> AlertCue {
        match self {
            AnnouncementEvent::ShortAlert => AlertCue::SHORT,
            AnnouncementEvent::LongAlertSequence | AnnouncementEvent::RoundEnd => {
                AlertCue::LONG_SEQUENCE
            }
        }
    }

    /// Whether the host must stop the timer when presenting this event
    pub fn stops_clock(self) -> bool {
        matches!(self, AnnouncementEvent::RoundEnd)
    }
}

/// Presentation descriptor for a beep pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCue {
    /// Number of pulses in the pattern
    pub pulses: u32,

    /// Gap between pulse starts in milliseconds
    pub spacing_ms: u64,

    /// Length of one pulse in milliseconds
    pub pulse_ms: u64,

    /// Tone pitch in Hz
    pub frequency_hz: u32,
}

impl AlertCue {
    pub const SHORT: AlertCue =
        AlertCue { pulses: 1, spacing_ms: 0, pulse_ms: 120, frequency_hz: 1400 };

    /// 8 pulses, 150ms apart
    pub const LONG_SEQUENCE: AlertCue =
        AlertCue { pulses: 8, spacing_ms: 150, pulse_ms: 120, frequency_hz: 1500 };

    /// Offsets (from the start of the pattern) at which each pulse begins
    pub fn pulse_offsets_ms(&self) -> impl Iterator<Item = u64> + '_ {
        (0..u64::from(self.pulses)).map(move |i| i * self.spacing_ms)
    }

    /// Time from the first pulse start until the last pulse ends
    pub fn total_ms(&self) -> u64 {
        if self.pulses == 0 {
            return 0;
        }
        u64::from(self.pulses - 1) * self.spacing_ms + self.pulse_ms
    }
}

/// A rule that selects seconds of a round, relative to its length `T`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "snake_case")]
pub enum Marker {
    /// Every multiple of the interval strictly inside the round
    Every(u32),
    /// Exactly `T - offset`
    BeforeEnd(u32),
    /// Each of the last `n` seconds before `T`
    Countdown(u32),
}

impl Marker {
    /// Whether this marker selects `second` in a round of `duration` seconds.
    /// Callers only pass `0 < second < duration`.
    fn selects(&self, second: u32, duration: u32) -> bool {
        match *self {
            Marker::Every(interval) => interval > 0 && second % interval == 0,
            Marker::BeforeEnd(offset) => offset < duration && second == duration - offset,
            Marker::Countdown(n) => second.saturating_add(n) >= duration,
        }
    }
}

/// Decides which events fire at a whole second of a round
pub trait AnnouncementPolicy {
    fn evaluate(&self, second: u32, duration: u32) -> Vec<AnnouncementEvent>;
}

/// Declarative announcement schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSchedule {
    pub markers: Vec<Marker>,
}

impl Default for AlertSchedule {
    fn default() -> Self {
        Self {
            markers: vec![
                Marker::Every(60),
                Marker::BeforeEnd(30),
                Marker::BeforeEnd(10),
                Marker::Countdown(9),
            ],
        }
    }
}

impl AlertSchedule {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    /// All seconds in `1..duration` that get a short alert, ascending
    pub fn alert_seconds(&self, duration: u32) -> Vec<u32> {
        (1..duration).filter(|&s| self.markers.iter().any(|m| m.selects(s, duration))).collect()
    }
}

impl AnnouncementPolicy for AlertSchedule {
    fn evaluate(&self, second: u32, duration: u32) -> Vec<AnnouncementEvent> {
        if second == 0 || second > duration {
            return Vec::new();
        }
        if second == duration {
            return vec![AnnouncementEvent::RoundEnd];
        }
        if self.markers.iter().any(|m| m.selects(second, duration)) {
            vec![AnnouncementEvent::ShortAlert]
        } else {
            Vec::new()
        }
    }
}

/// Evaluate the stock schedule
pub fn evaluate(second: u32, duration: u32) -> Vec<AnnouncementEvent> {
    AlertSchedule::default().evaluate(second, duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown(from: u32, to: u32) -> Vec<u32> {
        (from..=to).collect()
    }

    #[test]
    fn test_one_minute_table() {
        let mut expected = vec![30, 50];
        expected.extend(countdown(51, 59));
        assert_eq!(AlertSchedule::default().alert_seconds(60), expected);
    }

    #[test]
    fn test_two_minute_table() {
        let mut expected = vec![60, 90, 110];
        expected.extend(countdown(111, 119));
        assert_eq!(AlertSchedule::default().alert_seconds(120), expected);
    }

    #[test]
    fn test_three_minute_table() {
        let mut expected = vec![60, 120, 150, 170];
        expected.extend(countdown(171, 179));
        assert_eq!(AlertSchedule::default().alert_seconds(180), expected);
    }

    #[test]
    fn test_second_zero_is_silent() {
        for duration in [1, 10, 60, 120, 180, 600] {
            assert!(evaluate(0, duration).is_empty());
        }
    }

    #[test]
    fn test_round_end_is_alone() {
        for duration in [60, 120, 180] {
            assert_eq!(evaluate(duration, duration), vec![AnnouncementEvent::RoundEnd]);
        }
    }

    #[test]
    fn test_past_end_is_silent() {
        assert!(evaluate(121, 120).is_empty());
    }

    #[test]
    fn test_quiet_seconds() {
        assert!(evaluate(1, 120).is_empty());
        assert!(evaluate(59, 120).is_empty());
        assert!(evaluate(100, 120).is_empty());
        assert!(evaluate(90, 180).is_empty());
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = AlertSchedule::new(vec![Marker::BeforeEnd(5)]);
        assert_eq!(schedule.alert_seconds(20), vec![15]);
        assert_eq!(schedule.evaluate(20, 20), vec![AnnouncementEvent::RoundEnd]);
    }

    #[test]
    fn test_short_round_offsets_do_not_underflow() {
        let schedule = AlertSchedule::default();
        assert_eq!(schedule.alert_seconds(5), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cues() {
        assert_eq!(AnnouncementEvent::ShortAlert.cue().pulses, 1);
        let long = AnnouncementEvent::RoundEnd.cue();
        assert_eq!(long, AlertCue::LONG_SEQUENCE);
        assert_eq!(
            long.pulse_offsets_ms().collect::<Vec<_>>(),
            vec![0, 150, 300, 450, 600, 750, 900, 1050]
        );
        assert_eq!(long.total_ms(), 1050 + 120);
        assert!(AnnouncementEvent::RoundEnd.stops_clock());
        assert!(!AnnouncementEvent::ShortAlert.stops_clock());
    }

    #[test]
    fn test_schedule_toml_shape() {
        let schedule = AlertSchedule::default();
        let text = toml::to_string(&schedule).unwrap();
        let back: AlertSchedule = toml::from_str(&text).unwrap();
        assert_eq!(back, schedule);
    }
}

//! Scenario and property tests for RoundClock

use proptest::prelude::*;

use crate::{
    AnnouncementEvent, ClockError, ClockState, RoundClock, RoundMode, DEFAULT_SUPPORTED_DURATIONS,
};

const SHORT: AnnouncementEvent = AnnouncementEvent::ShortAlert;

/// Poll the clock every `step` ms from `from` to `to` inclusive, collecting
/// every non-empty batch of events with the second it was reported at
fn poll(
    clock: &mut RoundClock,
    from: u64,
    to: u64,
    step: u64,
) -> Vec<(u64, Vec<AnnouncementEvent>)> {
    let mut fired = Vec::new();
    let mut now = from;
    while now <= to {
        let outcome = clock.tick(now);
        if !outcome.events.is_empty() {
            fired.push((outcome.elapsed_ms / 1000, outcome.events));
        }
        now += step;
    }
    fired
}

fn mode_for(duration: u32) -> RoundMode {
    RoundMode::from_duration(duration).unwrap()
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_two_minute_round() {
        let mut clock = RoundClock::new(RoundMode::TwoMinute);
        assert_eq!(clock.configure(120), Ok(false));
        clock.start(0);

        let outcome = clock.tick(60_000);
        assert_eq!(outcome.display, "01:00.00");
        assert_eq!(outcome.events, vec![SHORT]);

        assert_eq!(clock.tick(90_000).events, vec![SHORT]);

        for second in 111..=119u64 {
            assert_eq!(clock.tick(second * 1000).events, vec![SHORT], "second {second}");
        }

        let outcome = clock.tick(120_000);
        assert_eq!(outcome.display, "02:00.00");
        assert_eq!(outcome.events, vec![AnnouncementEvent::RoundEnd]);
        assert!(outcome.finished);
        assert!(!clock.is_running());
        assert_eq!(clock.state(), ClockState::Finished);
    }

    #[test]
    fn test_full_rounds_at_ten_ms_polling() {
        for duration in DEFAULT_SUPPORTED_DURATIONS {
            let mut clock = RoundClock::new(mode_for(duration));
            clock.start(0);
            let fired = poll(&mut clock, 0, u64::from(duration) * 1000 + 500, 10);

            let mut expected: Vec<(u64, Vec<AnnouncementEvent>)> = clock
                .policy()
                .alert_seconds(duration)
                .into_iter()
                .map(|s| (u64::from(s), vec![SHORT]))
                .collect();
            expected.push((u64::from(duration), vec![AnnouncementEvent::RoundEnd]));

            assert_eq!(fired, expected, "duration {duration}");
            assert_eq!(clock.elapsed_ms(), u64::from(duration) * 1000);
        }
    }

    #[test]
    fn test_same_second_fires_once() {
        let mut clock = RoundClock::new(RoundMode::OneMinute);
        clock.start(0);
        assert_eq!(clock.tick(30_000).events, vec![SHORT]);
        assert!(clock.tick(30_010).events.is_empty());
        assert!(clock.tick(30_990).events.is_empty());
        assert_eq!(clock.metrics().duplicate_ticks, 2);
    }

    #[test]
    fn test_reset_refires_announcements() {
        let mut clock = RoundClock::new(RoundMode::OneMinute);
        clock.start(0);
        let first = poll(&mut clock, 0, 61_000, 10);

        clock.reset();
        assert_eq!(clock.last_announced_second(), None);
        clock.start(100_000);
        let second = poll(&mut clock, 100_000, 161_000, 10);

        assert_eq!(first, second);
    }

    #[test]
    fn test_late_tick_clamps_to_round_end() {
        let mut clock = RoundClock::new(RoundMode::OneMinute);
        clock.start(0);
        let outcome = clock.tick(75_432);
        assert_eq!(outcome.elapsed_ms, 60_000);
        assert_eq!(outcome.display, "01:00.00");
        assert_eq!(outcome.events, vec![AnnouncementEvent::RoundEnd]);

        // finished: further ticks and starts change nothing
        let outcome = clock.tick(90_000);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.elapsed_ms, 60_000);
        clock.start(91_000);
        assert_eq!(clock.state(), ClockState::Finished);
    }

    #[test]
    fn test_pause_resume_preserves_elapsed() {
        let mut clock = RoundClock::new(RoundMode::TwoMinute);
        clock.start(1_000);
        clock.tick(4_250);
        clock.pause();
        assert_eq!(clock.state(), ClockState::Paused);
        assert_eq!(clock.elapsed_ms(), 3_250);

        // wall time passes while paused
        clock.tick(50_000);
        assert_eq!(clock.elapsed_ms(), 3_250);

        clock.start(60_000);
        assert_eq!(clock.tick(60_750).elapsed_ms, 4_000);
    }

    #[test]
    fn test_many_pause_cycles_do_not_drift() {
        let mut clock = RoundClock::new(RoundMode::ThreeMinute);
        let mut now = 0;
        for _ in 0..100 {
            clock.start(now);
            now += 333;
            clock.tick(now);
            clock.pause();
            now += 10_000;
        }
        assert_eq!(clock.elapsed_ms(), 33_300);
    }

    #[test]
    fn test_pause_and_start_are_idempotent() {
        let mut clock = RoundClock::new(RoundMode::TwoMinute);
        clock.start(0);
        clock.tick(2_000);
        clock.start(5_000);
        assert_eq!(clock.tick(3_000).elapsed_ms, 3_000);

        clock.pause();
        let elapsed = clock.elapsed_ms();
        clock.pause();
        assert_eq!(clock.elapsed_ms(), elapsed);
        assert!(!clock.is_running());
        assert_eq!(clock.metrics().pauses, 1);
        assert_eq!(clock.metrics().starts, 1);
    }

    #[test]
    fn test_configure_resets_and_changes_schedule() {
        let mut clock = RoundClock::new(RoundMode::TwoMinute);
        clock.start(0);
        clock.tick(45_000);

        assert_eq!(clock.configure_mode(RoundMode::OneMinute), Ok(true));
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(clock.elapsed_ms(), 0);
        assert_eq!(clock.last_announced_second(), None);

        clock.start(0);
        assert_eq!(clock.tick(30_000).events, vec![SHORT]);
    }

    #[test]
    fn test_configure_rejects_invalid_duration() {
        let mut clock = RoundClock::new(RoundMode::TwoMinute);
        clock.start(0);
        clock.tick(10_000);

        for bad in [0, 90, 300] {
            let err = clock.configure(bad).unwrap_err();
            assert!(matches!(err, ClockError::InvalidDuration { seconds, .. } if seconds == bad));
        }
        assert_eq!(clock.duration_seconds(), 120);
        assert_eq!(clock.elapsed_ms(), 10_000);
        assert!(clock.is_running());
    }

    #[test]
    fn test_reset_from_finished() {
        let mut clock = RoundClock::new(RoundMode::OneMinute);
        clock.start(0);
        clock.tick(60_000);
        clock.reset();
        assert_eq!(clock.state(), ClockState::Idle);
        clock.start(0);
        assert!(clock.is_running());
    }
}

proptest! {
    #[test]
    fn prop_elapsed_is_monotonic(
        mode in prop::sample::select(RoundMode::ALL.to_vec()),
        steps in prop::collection::vec((0u64..5_000, any::<bool>()), 1..200),
    ) {
        let mut clock = RoundClock::new(mode);
        let mut now = 0u64;
        let mut last = 0u64;
        clock.start(now);
        for (advance, toggle) in steps {
            now += advance;
            if toggle {
                if clock.is_running() { clock.pause() } else { clock.start(now) }
            }
            let outcome = clock.tick(now);
            prop_assert!(outcome.elapsed_ms >= last);
            prop_assert!(outcome.elapsed_ms <= u64::from(mode.duration_seconds()) * 1000);
            last = outcome.elapsed_ms;
        }
    }

    #[test]
    fn prop_each_second_announced_at_most_once(
        mode in prop::sample::select(RoundMode::ALL.to_vec()),
        gaps in prop::collection::vec(1u64..1_500, 1..600),
    ) {
        let mut clock = RoundClock::new(mode);
        let mut now = 0u64;
        let mut seen = std::collections::HashSet::new();
        clock.start(now);
        for gap in gaps {
            now += gap;
            let outcome = clock.tick(now);
            if !outcome.events.is_empty() {
                let second = outcome.elapsed_ms / 1000;
                prop_assert!(seen.insert(second), "second {} fired twice", second);
            }
        }
    }
}

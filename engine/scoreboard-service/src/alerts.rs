//! Alert playback
//!
//! Cues are played on their own task so a long pattern never holds up the
//! tick loop.

use round_clock::AlertCue;
use std::io::Write;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Something that can emit one pulse of a cue
pub trait AlertSink: Send + 'static {
    fn pulse(&mut self, cue: &AlertCue, index: u32);
}

/// Rings the terminal bell
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn pulse(&mut self, _cue: &AlertCue, _index: u32) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

/// Play every pulse of `cue` at its offset from now
pub async fn play<S: AlertSink>(cue: AlertCue, mut sink: S) {
    let start = Instant::now();
    for (index, offset) in cue.pulse_offsets_ms().enumerate() {
        sleep_until(start + Duration::from_millis(offset)).await;
        sink.pulse(&cue, index as u32);
    }
}

pub fn spawn_playback<S: AlertSink>(cue: AlertCue, sink: S) -> JoinHandle<()> {
    tracing::trace!("Playing {} pulse cue", cue.pulses);
    tokio::spawn(play(cue, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct Recorder {
        start: Instant,
        tx: mpsc::UnboundedSender<(u32, u64)>,
    }

    impl AlertSink for Recorder {
        fn pulse(&mut self, _cue: &AlertCue, index: u32) {
            let at = self.start.elapsed().as_millis() as u64;
            let _ = self.tx.send((index, at));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_sequence_timing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let recorder = Recorder { start: Instant::now(), tx };
        let handle = spawn_playback(AlertCue::LONG_SEQUENCE, recorder);
        tokio_test::assert_ok!(handle.await);

        let mut pulses = Vec::new();
        while let Ok(pulse) = rx.try_recv() {
            pulses.push(pulse);
        }
        assert_eq!(pulses.len(), 8);
        for (i, (index, at)) in pulses.into_iter().enumerate() {
            assert_eq!(index, i as u32);
            assert_eq!(at, i as u64 * 150);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_cue_is_immediate() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        play(AlertCue::SHORT, Recorder { start: Instant::now(), tx }).await;
        assert_eq!(rx.try_recv().unwrap(), (0, 0));
        assert!(rx.try_recv().is_err());
    }
}

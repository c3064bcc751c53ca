//! Terminal rendering

use colored::*;
use match_records::{BracketTable, MatchRecord, RaffleDraw};
use round_clock::{AnnouncementEvent, ClockState, RoundClock};
use score_ledger::{CompetitorId, Points, ScoreLedger};

fn state_label(state: ClockState) -> &'static str {
    match state {
        ClockState::Idle => "ready",
        ClockState::Running => "running",
        ClockState::Paused => "paused",
        ClockState::Finished => "finished",
    }
}

fn side(competitor: &CompetitorId, total: Points) -> String {
    let text = format!("{} {}", competitor.as_str().to_uppercase(), total);
    match competitor.as_str() {
        "red" => text.red().bold().to_string(),
        "blue" => text.blue().bold().to_string(),
        _ => text.bold().to_string(),
    }
}

/// `[01:23.45 / 02:00 running]  RED 3  |  BLUE 1.5`
pub fn scoreboard_line(clock: &RoundClock, ledger: &ScoreLedger) -> String {
    let length = clock.duration_seconds();
    let time = format!("{} / {:02}:{:02}", clock.display(), length / 60, length % 60);
    let scores = ledger
        .totals()
        .iter()
        .map(|(competitor, total)| side(competitor, *total))
        .collect::<Vec<_>>()
        .join("  |  ");
    let undo = if ledger.can_undo() { "" } else { "  (nothing to undo)" };

    format!("[{} {}]  {}{}", time.cyan(), state_label(clock.state()), scores, undo.dimmed())
}

/// Line shown alongside a cue
pub fn alert_line(event: AnnouncementEvent, display: &str) -> String {
    match event {
        AnnouncementEvent::ShortAlert => {
            format!(">>> {} <<<", display).yellow().reversed().to_string()
        }
        AnnouncementEvent::LongAlertSequence => {
            format!("!!! {} !!!", display).yellow().bold().to_string()
        }
        AnnouncementEvent::RoundEnd => {
            format!("=== ROUND OVER {} ===", display).red().bold().reversed().to_string()
        }
    }
}

pub fn match_lines(records: &[MatchRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No matches recorded.".dimmed().to_string()];
    }
    match_records::export::match_txt(records).lines().map(str::to_string).collect()
}

pub fn bracket_lines(table: &BracketTable) -> Vec<String> {
    if table.is_empty() {
        return vec!["Bracket is empty.".dimmed().to_string()];
    }
    // numbers follow storage order so `bracket set <row>` still matches
    table
        .sorted_rows()
        .into_iter()
        .map(|(i, row)| {
            let winner = if row.is_decided() {
                row.winner.green().to_string()
            } else {
                "-".dimmed().to_string()
            };
            format!("{:>3}. [{}] {} vs {}  winner: {}", i + 1, row.round, row.p1, row.p2, winner)
        })
        .collect()
}

pub fn raffle_lines(raffle: &RaffleDraw) -> Vec<String> {
    let mut lines = vec![raffle.summary()];
    if raffle.results().is_empty() {
        lines.push("No draws yet.".dimmed().to_string());
    } else {
        lines.extend(
            raffle
                .results_sorted()
                .iter()
                .map(|entry| format!("  {} : {}", entry.name, entry.number)),
        );
    }
    lines
}

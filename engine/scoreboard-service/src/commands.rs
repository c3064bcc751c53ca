//! Line-oriented command language read from stdin

use match_records::{BracketRow, ExportFormat, MatchEdit};
use round_clock::RoundMode;
use score_ledger::Points;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Mode(RoundMode),
    Score { competitor: String, delta: Points },
    ResetScore(String),
    Undo,
    Status,
    Finish { label: Option<String> },
    Matches,
    RemoveMatch(u64),
    Edit { id: u64, edit: MatchEdit },
    ExportMatches(ExportFormat),
    RaffleRange { max: i64, force: bool },
    RaffleDraw(String),
    RaffleList,
    RaffleExport(ExportFormat),
    BracketAdd(BracketRow),
    /// Row number as shown by `bracket list` (1-based)
    BracketSet { row: usize, winner: String },
    /// Replace a whole row, keeping its position
    BracketEdit { row: usize, data: BracketRow },
    BracketRemove(usize),
    BracketList,
    /// Answer to a pending y/n question
    Confirm(bool),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for available commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid {what}: '{value}'")]
    InvalidValue { what: &'static str, value: String },
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::InvalidValue { what, value: value.to_string() }
}

fn parse_format(value: Option<&str>, usage: &'static str) -> Result<ExportFormat, CommandError> {
    let value = value.ok_or(CommandError::Usage(usage))?;
    value.parse().map_err(|_| invalid("export format", value))
}

fn parse_row(value: Option<&str>, usage: &'static str) -> Result<usize, CommandError> {
    let value = value.ok_or(CommandError::Usage(usage))?;
    match value.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(invalid("row number", value)),
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "pause" => Command::Pause,
        "reset" => Command::Reset,
        "mode" => {
            let value = rest.first().ok_or(CommandError::Usage("mode <1|2|3>"))?;
            Command::Mode(value.parse().map_err(|_| invalid("mode", value))?)
        }
        "undo" => Command::Undo,
        "status" | "s" => Command::Status,
        "finish" => Command::Finish { label: (!rest.is_empty()).then(|| rest.join(" ")) },
        "matches" => match rest {
            [] => Command::Matches,
            ["remove" | "rm", id] => {
                Command::RemoveMatch(id.parse().map_err(|_| invalid("match id", id))?)
            }
            _ => return Err(CommandError::Usage("matches [remove <id>]")),
        },
        "edit" => parse_edit(rest)?,
        "export-matches" => {
            Command::ExportMatches(parse_format(rest.first().copied(), "export-matches <csv|txt>")?)
        }
        "raffle" => parse_raffle(rest)?,
        "bracket" => parse_bracket(rest)?,
        "y" | "yes" => Command::Confirm(true),
        "n" | "no" => Command::Confirm(false),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => {
            if let Some(competitor) = other.strip_prefix("reset-") {
                Command::ResetScore(competitor.to_string())
            } else if let [delta] = rest {
                let delta: Points = delta.parse().map_err(|_| invalid("score change", delta))?;
                Command::Score { competitor: other.to_string(), delta }
            } else {
                return Err(CommandError::Unknown(head.to_string()));
            }
        }
    };

    Ok(Some(command))
}

/// `edit <id> field=value ...`; words without `=` continue the previous value
fn parse_edit(rest: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str =
        "edit <id> <field>=<value>... (fields: round, elapsed, red, blue, winner, note)";

    let (id, words) = rest.split_first().ok_or(CommandError::Usage(USAGE))?;
    let id: u64 = id.parse().map_err(|_| invalid("match id", id))?;

    let mut assignments: Vec<String> = Vec::new();
    for word in words {
        match assignments.last_mut() {
            Some(last) if !word.contains('=') => {
                last.push(' ');
                last.push_str(word);
            }
            _ => assignments.push(word.to_string()),
        }
    }
    if assignments.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }

    let edit = MatchEdit::from_assignments(assignments.iter().map(String::as_str))
        .map_err(|e| CommandError::InvalidValue { what: "edit", value: e.to_string() })?;
    Ok(Command::Edit { id, edit })
}

fn parse_raffle(rest: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "raffle <range <n> [force] | draw <name> | list | export <csv|txt>>";

    let (sub, args) = rest.split_first().ok_or(CommandError::Usage(USAGE))?;
    let command = match sub.to_ascii_lowercase().as_str() {
        "range" => {
            let value = args.first().ok_or(CommandError::Usage("raffle range <n> [force]"))?;
            let max: i64 = value.parse().map_err(|_| invalid("range", value))?;
            let force = matches!(args.get(1), Some(flag) if flag.eq_ignore_ascii_case("force"));
            Command::RaffleRange { max, force }
        }
        "draw" => Command::RaffleDraw(args.join(" ")),
        "list" => Command::RaffleList,
        "export" => {
            Command::RaffleExport(parse_format(args.first().copied(), "raffle export <csv|txt>")?)
        }
        _ => return Err(CommandError::Usage(USAGE)),
    };
    Ok(command)
}

/// `<round> <p1> <p2> [winner]`
fn parse_bracket_row(args: &[&str]) -> Option<BracketRow> {
    match args {
        [round, p1, p2] => Some(BracketRow::new(*round, *p1, *p2)),
        [round, p1, p2, winner] => Some(BracketRow::new(*round, *p1, *p2).with_winner(*winner)),
        _ => None,
    }
}

fn parse_bracket(rest: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "bracket <add <round> <p1> <p2> [winner] | set <row> winner=<name> \
                         | edit <row> <round> <p1> <p2> [winner] | remove <row> | list>";

    let (sub, args) = rest.split_first().ok_or(CommandError::Usage(USAGE))?;
    let command = match sub.to_ascii_lowercase().as_str() {
        "add" => parse_bracket_row(args)
            .map(Command::BracketAdd)
            .ok_or(CommandError::Usage("bracket add <round> <p1> <p2> [winner]"))?,
        "edit" => {
            const EDIT_USAGE: &str = "bracket edit <row> <round> <p1> <p2> [winner]";
            let row = parse_row(args.first().copied(), EDIT_USAGE)?;
            let data = args
                .get(1..)
                .and_then(parse_bracket_row)
                .ok_or(CommandError::Usage(EDIT_USAGE))?;
            Command::BracketEdit { row, data }
        }
        "set" => {
            const SET_USAGE: &str = "bracket set <row> winner=<name>";
            let row = parse_row(args.first().copied(), SET_USAGE)?;
            let winner = args
                .get(1..)
                .map(|words| words.join(" "))
                .and_then(|joined| joined.strip_prefix("winner=").map(str::to_string))
                .ok_or(CommandError::Usage(SET_USAGE))?;
            Command::BracketSet { row, winner }
        }
        "remove" | "rm" => {
            Command::BracketRemove(parse_row(args.first().copied(), "bracket remove <row>")?)
        }
        "list" => Command::BracketList,
        _ => return Err(CommandError::Usage(USAGE)),
    };
    Ok(command)
}

pub const HELP: &str = "\
Timer:    start | pause | reset | mode <1|2|3>
Score:    <side> <delta>  (e.g. red 1, blue -0.5) | reset-<side> | undo | status
Matches:  finish [round label] | matches | matches remove <id>
          edit <id> field=value... | export-matches <csv|txt>
Raffle:   raffle range <n> [force] | raffle draw <name> | raffle list | raffle export <csv|txt>
Bracket:  bracket add <round> <p1> <p2> [winner] | bracket set <row> winner=<name>
          bracket edit <row> <round> <p1> <p2> [winner] | bracket remove <row> | bracket list
Other:    help | quit";

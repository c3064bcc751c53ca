//! Scoreboard state and the event loop that drives it

use anyhow::{anyhow, Context, Result};
use std::io::Write;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use match_records::export::{MATCH_EXPORT_STEM, RAFFLE_EXPORT_STEM};
use match_records::{
    write_export, BlobStore, BracketTable, ExportFormat, LocalBlobStore, MatchLedger, RaffleDraw,
    RecordsError,
};
use round_clock::{AlertCue, AnnouncementEvent, ClockState, Millis, RoundClock, TickOutcome};
use score_ledger::{CompetitorId, ScoreLedger};

use crate::alerts::{spawn_playback, AlertSink};
use crate::commands::{self, Command, HELP};
use crate::config::ScoreboardConfig;
use crate::render;

/// Text to show the operator after a command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Response {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Response {
    fn line(text: impl Into<String>) -> Self {
        Self { lines: vec![text.into()], quit: false }
    }

    fn from_lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn with_notice(mut self, notice: Option<String>) -> Self {
        self.lines.extend(notice);
        self
    }
}

/// Everything the scoreboard owns. Lives on the event loop; no locking.
pub struct ScoreboardState {
    config: ScoreboardConfig,
    clock: RoundClock,
    ledger: ScoreLedger,
    raffle: RaffleDraw,
    matches: MatchLedger,
    bracket: BracketTable,
    store: Box<dyn BlobStore>,
    rng: fastrand::Rng,
    pending: Option<Command>,
}

impl ScoreboardState {
    pub fn new(
        config: ScoreboardConfig,
        store: Box<dyn BlobStore>,
        rng: fastrand::Rng,
    ) -> Result<Self> {
        let clock =
            RoundClock::from_config(&config.clock).context("Failed to create round clock")?;
        let competitors = config.service.competitors.iter().map(|c| CompetitorId::new(c.as_str()));
        let ledger = ScoreLedger::new(competitors);
        let matches = MatchLedger::load(store.as_ref(), &config.records.matches_key);
        let bracket = BracketTable::load(store.as_ref(), &config.records.bracket_key);

        info!(
            "Scoreboard ready: {}s rounds, {} recorded matches, {} bracket rows",
            clock.duration_seconds(),
            matches.len(),
            bracket.len()
        );

        Ok(Self {
            config,
            clock,
            ledger,
            raffle: RaffleDraw::new(),
            matches,
            bracket,
            store,
            rng,
            pending: None,
        })
    }

    /// Open the on-disk store named by the configuration
    pub fn open(config: ScoreboardConfig) -> Result<Self> {
        let store = LocalBlobStore::open(&config.records)
            .with_context(|| format!("Failed to open store in {:?}", config.records.data_dir))?;
        Self::new(config, Box::new(store), fastrand::Rng::new())
    }

    pub fn config(&self) -> &ScoreboardConfig {
        &self.config
    }

    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn matches(&self) -> &MatchLedger {
        &self.matches
    }

    pub fn bracket(&self) -> &BracketTable {
        &self.bracket
    }

    pub fn raffle(&self) -> &RaffleDraw {
        &self.raffle
    }

    pub fn pending(&self) -> Option<&Command> {
        self.pending.as_ref()
    }

    /// Advance the clock if it is running
    pub fn on_tick(&mut self, now: Millis) -> Option<TickOutcome> {
        self.clock.is_running().then(|| self.clock.tick(now))
    }

    /// Configured pattern for an event
    pub fn cue_for(&self, event: AnnouncementEvent) -> AlertCue {
        match event {
            AnnouncementEvent::ShortAlert => self.config.clock.short_alert,
            AnnouncementEvent::LongAlertSequence | AnnouncementEvent::RoundEnd => {
                self.config.clock.long_alert
            }
        }
    }

    /// Process one command at host time `now`
    pub fn handle(&mut self, command: Command, now: Millis) -> Response {
        if let Command::Confirm(yes) = command {
            return match self.pending.take() {
                None => Response::line("Nothing to confirm."),
                Some(_) if !yes => Response::line("Cancelled."),
                Some(pending) => self.run_command(pending, now),
            };
        }

        let mut lines = Vec::new();
        if self.pending.take().is_some() {
            lines.push("Previous question cancelled.".to_string());
        }

        if self.config.service.confirm_destructive {
            if let Some(question) = self.confirmation_for(&command) {
                self.pending = Some(command);
                lines.push(format!("{} (y/n)", question));
                return Response::from_lines(lines);
            }
        }

        let mut response = self.run_command(command, now);
        lines.append(&mut response.lines);
        response.lines = lines;
        response
    }

    /// Question to ask before running a destructive command, if any
    fn confirmation_for(&self, command: &Command) -> Option<String> {
        match command {
            Command::Reset
                if self.clock.state() != ClockState::Idle || self.clock.elapsed_ms() > 0 =>
            {
                Some("Reset the timer to 00:00.00 and clear alert state?".to_string())
            }
            Command::Mode(mode) if mode.duration_seconds() != self.clock.duration_seconds() => {
                Some(format!(
                    "Changing the round length to {} resets the timer to 0. Continue?",
                    mode
                ))
            }
            Command::ResetScore(competitor) => {
                let total = self.ledger.total(&CompetitorId::new(competitor.as_str())).ok()?;
                (!total.is_zero())
                    .then(|| format!("Reset {} score ({}) to 0?", competitor.to_uppercase(), total))
            }
            Command::RemoveMatch(id) => self.matches.get(*id).map(|record| {
                format!("Delete match #{} [{}]?", record.id, record.round_label)
            }),
            Command::Undo => self.ledger.last_entry().map(|entry| {
                let sign = if entry.delta.is_negative() { "" } else { "+" };
                format!("Undo {} {}{}?", entry.competitor, sign, entry.delta)
            }),
            _ => None,
        }
    }

    fn run_command(&mut self, command: Command, now: Millis) -> Response {
        match self.execute(command, now) {
            Ok(response) => response,
            Err(e) => {
                debug!("Command rejected: {:#}", e);
                Response::line(format!("{:#}", e))
            }
        }
    }

    fn status(&self) -> String {
        render::scoreboard_line(&self.clock, &self.ledger)
    }

    fn execute(&mut self, command: Command, now: Millis) -> Result<Response> {
        let response = match command {
            Command::Start => match self.clock.state() {
                ClockState::Finished => Response::line("Round is over. Reset to start again."),
                ClockState::Running => Response::line("Already running."),
                ClockState::Idle | ClockState::Paused => {
                    self.clock.start(now);
                    Response::line(self.status())
                }
            },
            Command::Pause => {
                self.clock.pause();
                Response::line(self.status())
            }
            Command::Reset => {
                self.clock.reset();
                Response::line(self.status())
            }
            Command::Mode(mode) => {
                if self.clock.configure_mode(mode)? {
                    let changed = format!("Round length set to {}.", mode);
                    Response::from_lines(vec![changed, self.status()])
                } else {
                    Response::line(format!("Already in {} mode.", mode))
                }
            }
            Command::Score { competitor, delta } => {
                self.ledger.add(&CompetitorId::new(competitor), delta)?;
                Response::line(self.status())
            }
            Command::ResetScore(competitor) => {
                self.ledger.reset_one(&CompetitorId::new(competitor))?;
                Response::line(self.status())
            }
            Command::Undo => {
                let entry = self.ledger.undo()?;
                Response::from_lines(vec![
                    format!("Undid {} {}.", entry.competitor, entry.delta),
                    self.status(),
                ])
            }
            Command::Status => Response::line(self.status()),
            Command::Finish { label } => self.finish_match(label)?,
            Command::Matches => Response::from_lines(render::match_lines(self.matches.records())),
            Command::RemoveMatch(id) => {
                let removed = self.matches.remove(id)?;
                Response::line(format!("Removed match #{} [{}].", removed.id, removed.round_label))
                    .with_notice(self.save_matches())
            }
            Command::Edit { id, edit } => {
                let record = self.matches.edit(id, edit)?;
                let line = render::match_lines(std::slice::from_ref(record)).join("\n");
                Response::line(line).with_notice(self.save_matches())
            }
            Command::ExportMatches(format) => {
                if self.matches.is_empty() {
                    return Err(RecordsError::NothingToExport.into());
                }
                let content = match format {
                    ExportFormat::Csv => self.matches.to_csv(),
                    ExportFormat::Txt => self.matches.to_txt(),
                };
                self.export(&format.file_name(MATCH_EXPORT_STEM), &content)?
            }
            Command::RaffleRange { max, force } => match self.raffle.set_range(max, force) {
                Ok(cleared) => {
                    let mut lines = Vec::new();
                    if cleared {
                        lines.push("Previous results cleared.".to_string());
                    }
                    lines.push(self.raffle.summary());
                    Response::from_lines(lines)
                }
                Err(e @ RecordsError::RangeChangeNeedsConfirmation { .. }) => {
                    if self.config.service.confirm_destructive {
                        self.pending = Some(Command::RaffleRange { max, force: true });
                        Response::line(format!("{}. Continue? (y/n)", e))
                    } else {
                        Response::line(format!("{}. Add 'force' to proceed.", e))
                    }
                }
                Err(e) => return Err(e.into()),
            },
            Command::RaffleDraw(name) => {
                let entry = self.raffle.draw(&name, &mut self.rng)?;
                let drawn = format!("Drawn: {} : {}", entry.name, entry.number);
                Response::from_lines(vec![drawn, self.raffle.summary()])
            }
            Command::RaffleList => Response::from_lines(render::raffle_lines(&self.raffle)),
            Command::RaffleExport(format) => {
                let content = self.raffle.export_lines()?;
                self.export(&format.file_name(RAFFLE_EXPORT_STEM), &content)?
            }
            Command::BracketAdd(row) => {
                let index = self.bracket.add_row(row);
                Response::line(format!("Added bracket row {}.", index + 1))
                    .with_notice(self.save_bracket())
            }
            Command::BracketSet { row, winner } => {
                self.bracket
                    .set_winner(row - 1, winner)
                    .map_err(|_| anyhow!("No bracket row {}", row))?;
                Response::from_lines(render::bracket_lines(&self.bracket))
                    .with_notice(self.save_bracket())
            }
            Command::BracketEdit { row, data } => {
                self.bracket
                    .update_row(row - 1, data)
                    .map_err(|_| anyhow!("No bracket row {}", row))?;
                Response::from_lines(render::bracket_lines(&self.bracket))
                    .with_notice(self.save_bracket())
            }
            Command::BracketRemove(row) => {
                let removed = self
                    .bracket
                    .remove_row(row - 1)
                    .map_err(|_| anyhow!("No bracket row {}", row))?;
                let text =
                    format!("Removed [{}] {} vs {}.", removed.round, removed.p1, removed.p2);
                Response::line(text).with_notice(self.save_bracket())
            }
            Command::BracketList => Response::from_lines(render::bracket_lines(&self.bracket)),
            Command::Confirm(_) => Response::line("Nothing to confirm."),
            Command::Help => Response::from_lines(HELP.lines().map(str::to_string).collect()),
            Command::Quit => {
                self.persist()?;
                Response { lines: vec!["Bye.".to_string()], quit: true }
            }
        };
        Ok(response)
    }

    /// Record the current round and start a fresh one
    fn finish_match(&mut self, label: Option<String>) -> Result<Response> {
        let (red, blue) = match self.ledger.totals() {
            [(_, red), (_, blue), ..] => (*red, *blue),
            _ => return Err(anyhow!("Recording a match needs two competitors")),
        };
        let label = label.unwrap_or_else(|| format!("Match {}", self.matches.len() + 1));
        let id = self.matches.record(label, self.clock.elapsed_seconds(), red, blue).id;

        self.ledger.clear();
        self.clock.reset();

        let summary = self
            .matches
            .get(id)
            .map(|record| render::match_lines(std::slice::from_ref(record)).join("\n"))
            .unwrap_or_default();
        Ok(Response::from_lines(vec![format!("Recorded: {}", summary), self.status()])
            .with_notice(self.save_matches()))
    }

    fn export(&self, filename: &str, content: &str) -> Result<Response> {
        let path = write_export(&self.config.records.export_dir, filename, content)?;
        Ok(Response::line(format!("Exported to {}", path.display())))
    }

    fn save_matches(&self) -> Option<String> {
        let key = &self.config.records.matches_key;
        self.matches.save(self.store.as_ref(), key).err().map(|e| {
            warn!("Failed to save matches: {}", e);
            format!("(matches not saved: {})", e)
        })
    }

    fn save_bracket(&self) -> Option<String> {
        let key = &self.config.records.bracket_key;
        self.bracket.save(self.store.as_ref(), key).err().map(|e| {
            warn!("Failed to save bracket: {}", e);
            format!("(bracket not saved: {})", e)
        })
    }

    /// Write every record to the store
    pub fn persist(&self) -> Result<()> {
        self.matches
            .save(self.store.as_ref(), &self.config.records.matches_key)
            .context("Failed to save matches")?;
        self.bracket
            .save(self.store.as_ref(), &self.config.records.bracket_key)
            .context("Failed to save bracket")?;
        Ok(())
    }
}

fn elapsed_ms(origin: Instant) -> Millis {
    origin.elapsed().as_millis() as Millis
}

/// Read stdin lines on a plain thread; tokio's stdin would keep the runtime
/// alive at exit while a read is pending.
pub fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> Result<std::thread::JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn stdin reader")?;
    Ok(handle)
}

/// Drive the scoreboard until `quit`, end of input or `shutdown`
pub async fn run<S, W>(
    mut state: ScoreboardState,
    mut input: mpsc::Receiver<String>,
    mut shutdown: oneshot::Receiver<()>,
    sink: S,
    mut out: W,
) -> Result<()>
where
    S: AlertSink + Clone,
    W: Write,
{
    let origin = Instant::now();
    let mut ticker = tokio::time::interval(state.config().clock.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut signals_gone = false;
    // while set, the last alert line is the highlighted panel
    let mut flash_until: Option<Instant> = None;

    writeln!(out, "{}", state.status())?;
    out.flush()?;

    loop {
        tokio::select! {
            result = &mut shutdown, if !signals_gone => match result {
                Ok(()) => {
                    info!("Shutdown requested");
                    break;
                }
                Err(_) => signals_gone = true,
            },
            line = input.recv() => {
                let Some(line) = line else {
                    debug!("Input closed");
                    break;
                };
                let response = match commands::parse(&line) {
                    Ok(Some(command)) => state.handle(command, elapsed_ms(origin)),
                    Ok(None) => continue,
                    Err(e) => Response::line(e.to_string()),
                };
                for text in &response.lines {
                    writeln!(out, "{}", text)?;
                }
                out.flush()?;
                if response.quit {
                    return Ok(());
                }
            }
            _ = ticker.tick() => {
                let Some(outcome) = state.on_tick(elapsed_ms(origin)) else {
                    continue;
                };
                for event in &outcome.events {
                    spawn_playback(state.cue_for(*event), sink.clone());
                    writeln!(out, "{}", render::alert_line(*event, &outcome.display))?;
                }
                if !outcome.events.is_empty() {
                    flash_until = Some(Instant::now() + state.config().clock.flash_duration());
                    out.flush()?;
                }
            }
            _ = tokio::time::sleep_until(flash_until.unwrap_or(origin)),
                if flash_until.is_some() =>
            {
                flash_until = None;
                writeln!(out, "{}", state.status())?;
                out.flush()?;
            }
        }
    }

    debug!("Clock metrics: {:?}", state.clock().metrics());
    state.persist()
}

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::command::{Command, InputContext, map_key};
use crate::engine::{Action, Engine, Screen};
use crate::remote::{LeaderboardFilter, RemoteWorker, Response};
use crate::renderer::{Outcome, Renderer, View};
use crate::scores::{HighScoreRecord, ScoreBook};
use crate::store::{SaveData, Store};

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 12;
/// Upper bound on one input wait, so the live timer keeps ticking.
const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// The main game loop. `renderer` is injected so the loop runs headless in
/// tests; storage and the online leaderboard are injected the same way.
pub struct Game<R: Renderer> {
    engine: Engine,
    renderer: R,
    store: Box<dyn Store>,
    save: SaveData,
    book: ScoreBook,
    remote: RemoteWorker,
    /// Generation of the last game whose result was processed.
    settled: Option<u64>,
    outcome: Option<Outcome>,
    name_prompt: Option<String>,
    notice: Option<String>,
    online: Option<(LeaderboardFilter, Vec<HighScoreRecord>)>,
}

impl<R: Renderer> Game<R> {
    pub fn new(engine: Engine, renderer: R, store: Box<dyn Store>, remote: RemoteWorker) -> Self {
        let save = store.load();
        let book = save.score_book();
        debug!(empty = book.is_empty(), "loaded saved data");
        Game {
            engine,
            renderer,
            store,
            save,
            book,
            remote,
            settled: None,
            outcome: None,
            name_prompt: None,
            notice: None,
            online: None,
        }
    }

    /// Run until the player quits.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let now = Instant::now();
            self.drain_remote();
            self.engine.tick(now);
            self.settle();
            self.render(now)?;

            let timeout = self
                .engine
                .next_deadline()
                .map(|due| due.saturating_duration_since(now))
                .map_or(FRAME_INTERVAL, |wait| wait.min(FRAME_INTERVAL));

            if !event::poll(timeout)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                let Some(cmd) = map_key(key, self.input_context()) else {
                    continue;
                };
                if self.handle(cmd, Instant::now()) {
                    info!("quit");
                    return Ok(());
                }
            }
        }
    }

    fn input_context(&self) -> InputContext {
        if self.name_prompt.is_some() {
            InputContext::TextEntry
        } else {
            InputContext::Normal
        }
    }

    fn render(&mut self, now: Instant) -> Result<()> {
        let filter = self.leaderboard_filter();
        let online = self
            .online
            .as_ref()
            .filter(|(f, _)| Some(*f) == filter)
            .map(|(_, records)| records.as_slice());
        let view = View {
            engine: &self.engine,
            now,
            scores: &self.book,
            outcome: self.outcome.as_ref(),
            name_prompt: self.name_prompt.as_deref(),
            notice: self.notice.as_deref(),
            online,
        };
        self.renderer.render(&view)?;
        Ok(())
    }

    /// Dispatch a command. Returns `true` if the game should exit.
    fn handle(&mut self, cmd: Command, now: Instant) -> bool {
        if let Some(name) = self.name_prompt.as_mut() {
            match cmd {
                Command::Quit => return true,
                Command::Type(c) if name.chars().count() < MAX_NAME_LEN => name.push(c),
                Command::Erase => {
                    name.pop();
                }
                Command::Submit => {
                    let entered = name.trim().to_string();
                    let name = if entered.is_empty() {
                        "Anonymous".to_string()
                    } else {
                        entered
                    };
                    self.name_prompt = None;
                    self.record_score(Some(name));
                }
                Command::Cancel => {
                    self.name_prompt = None;
                    let stored = self.save.player_name.clone();
                    self.record_score(stored);
                }
                _ => {}
            }
            return false;
        }

        let screen = self.engine.screen();
        let action = match cmd {
            Command::Quit => return true,
            Command::Navigate(direction) => Action::Navigate(direction),
            Command::Confirm if screen == Screen::Welcome => Action::StartNewGame,
            Command::Confirm => Action::FlipCard(self.engine.selected_index()),
            Command::CycleMode => Action::CycleGameMode,
            Command::ToggleGridSelection => Action::ToggleGridSelection,
            Command::Leaderboard => Action::SetScreen(Screen::Leaderboard),
            Command::Back | Command::NewGame => Action::SetScreen(Screen::Welcome),
            Command::Type(_) | Command::Erase | Command::Submit | Command::Cancel => return false,
        };

        if matches!(action, Action::StartNewGame | Action::SetScreen(_)) {
            self.notice = None;
        }
        self.engine.dispatch(action, now);
        self.settle();

        if self.engine.screen() == Screen::Leaderboard
            && matches!(action, Action::SetScreen(_) | Action::Navigate(_))
        {
            self.request_online_board();
        }
        false
    }

    /// Process a finished game exactly once.
    fn settle(&mut self) {
        if self.engine.screen() != Screen::GameOver {
            return;
        }
        let generation = self.engine.generation();
        if self.settled == Some(generation) {
            return;
        }
        self.settled = Some(generation);

        let Some(time) = self.engine.final_time() else {
            return;
        };
        let grid = self.engine.grid_dimension();
        let mode = self.engine.mode();
        let eligible = self.engine.is_score_eligible();
        let new_record = eligible && self.book.is_new_high_score(time, grid, mode);

        self.outcome = Some(Outcome {
            time_ms: time.as_millis() as u64,
            eligible,
            new_record,
            best_ms: self.book.best(mode, grid).map(|r| r.time_ms),
        });
        self.notice = None;
        if new_record {
            let name = self.save.player_name.clone().unwrap_or_default();
            self.name_prompt = Some(name);
        }
        info!(eligible, new_record, time_ms = time.as_millis() as u64, "game settled");
    }

    /// Store the finished game in the local table and send it online.
    fn record_score(&mut self, player_name: Option<String>) {
        let Some(time) = self.engine.final_time() else {
            return;
        };
        let date = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        let mut record =
            HighScoreRecord::new(time, self.engine.grid_dimension(), self.engine.mode(), date);
        record.player_name = player_name.clone();
        record.device_id = Some(self.save.device_id(&mut rand::rng()).to_string());

        self.book.save(record.clone());
        if player_name.is_some() {
            self.save.player_name = player_name;
        }
        self.save.scores = self.book.clone().into_entries();
        if let Err(err) = self.store.save(&self.save) {
            warn!(%err, "could not save high scores");
            self.notice = Some(format!("Could not save scores: {err}"));
        }
        info!(key = record.key(), time_ms = record.time_ms, "new high score");
        self.remote.submit(record);
    }

    fn leaderboard_filter(&self) -> Option<LeaderboardFilter> {
        (self.engine.screen() == Screen::Leaderboard).then(|| {
            let view = self.engine.leaderboard_view();
            LeaderboardFilter {
                mode: view.mode,
                grid: view.grid(),
            }
        })
    }

    fn request_online_board(&mut self) {
        if let Some(filter) = self.leaderboard_filter() {
            debug!(mode = filter.mode.key(), grid = %filter.grid, "fetching online board");
            self.remote.fetch(filter);
        }
    }

    /// Apply finished remote work. Only notices and the online table change.
    fn drain_remote(&mut self) {
        while let Some(response) = self.remote.poll() {
            match response {
                Response::Submitted(Ok(())) => {
                    self.notice = Some("Score submitted to the online leaderboard.".to_string());
                }
                Response::Submitted(Err(err)) => {
                    warn!(%err, "score submission failed");
                    self.notice = Some(format!("Saved locally only: {err}"));
                }
                Response::Fetched {
                    filter,
                    result: Ok(records),
                } => {
                    self.online = Some((filter, records));
                }
                Response::Fetched {
                    result: Err(err), ..
                } => {
                    debug!(%err, "online board unavailable");
                    self.online = None;
                }
            }
        }
    }
}

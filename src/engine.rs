use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::ai::{self, TableView};
use crate::card::{Card, paired_deck};
use crate::grid::{self, Direction, GridDimension, PRESETS};
use crate::player::{GameMode, Player, Scores, Winner, determine_winner, is_score_eligible};
use crate::schedule::Scheduler;

/// How long a mismatched pair stays visible before flipping back.
pub const FLIP_BACK_DELAY: Duration = Duration::from_millis(1000);
/// Pause before the AI starts its turn.
pub const AI_MOVE_DELAY: Duration = Duration::from_millis(1000);
/// Pause between the AI's first and second flip.
pub const AI_SECOND_FLIP_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Playing,
    GameOver,
    Leaderboard,
}

/// How the menu's arrow keys change the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSelection {
    Preset,
    Custom,
}

impl GridSelection {
    pub fn label(self) -> &'static str {
        match self {
            GridSelection::Preset => "preset",
            GridSelection::Custom => "custom",
        }
    }
}

/// Everything the outside world can ask of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartNewGame,
    FlipCard(usize),
    /// Arrow keys; meaning depends on the screen.
    Navigate(Direction),
    CycleGameMode,
    ToggleGridSelection,
    SetScreen(Screen),
}

/// Continuations the engine schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    FlipBack,
    AiMove,
    AiFlip(usize),
}

/// The table browsed on the leaderboard screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardView {
    pub mode: GameMode,
    pub preset_index: usize,
}

impl LeaderboardView {
    pub fn grid(&self) -> GridDimension {
        PRESETS[self.preset_index]
    }
}

/// The memory game state machine.
///
/// All state changes go through [`Engine::dispatch`] (outside input) or
/// [`Engine::tick`] (delayed continuations); nothing else mutates it.
#[derive(Debug)]
pub struct Engine {
    screen: Screen,
    mode: GameMode,
    grid_dimension: GridDimension,
    grid_selection: GridSelection,
    preset_index: usize,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    matched: BTreeSet<usize>,
    seen: BTreeSet<usize>,
    current_player: Player,
    scores: Scores,
    selected_index: usize,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    winner: Winner,
    message: String,
    leaderboard: LeaderboardView,
    scheduler: Scheduler<Task>,
    rng: SmallRng,
}

impl Engine {
    /// A fresh engine on the welcome screen. `seed` makes deals and AI
    /// choices reproducible.
    pub fn new(mode: GameMode, grid_dimension: GridDimension, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let (grid_selection, preset_index) = match grid::preset_index(grid_dimension) {
            Some(idx) => (GridSelection::Preset, idx),
            None => (GridSelection::Custom, 0),
        };

        Engine {
            screen: Screen::Welcome,
            mode,
            grid_dimension,
            grid_selection,
            preset_index,
            cards: Vec::new(),
            flipped: Vec::new(),
            matched: BTreeSet::new(),
            seen: BTreeSet::new(),
            current_player: Player::P1,
            scores: Scores::default(),
            selected_index: 0,
            start_time: None,
            end_time: None,
            winner: Winner::Nobody,
            message: String::new(),
            leaderboard: LeaderboardView {
                mode,
                preset_index,
            },
            scheduler: Scheduler::default(),
            rng,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn grid_dimension(&self) -> GridDimension {
        self.grid_dimension
    }

    pub fn grid_selection(&self) -> GridSelection {
        self.grid_selection
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn matched(&self) -> &BTreeSet<usize> {
        &self.matched
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.contains(&index)
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn winner(&self) -> Winner {
        self.winner
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn leaderboard_view(&self) -> LeaderboardView {
        self.leaderboard
    }

    /// Bumped on every new game and on every return to the menu.
    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    /// When the next scheduled continuation wants to run.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Time on the clock: running while playing, frozen once finished.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Final time of a finished game.
    pub fn final_time(&self) -> Option<Duration> {
        Some(self.end_time?.saturating_duration_since(self.start_time?))
    }

    /// Whether the finished game may be recorded as a high score.
    pub fn is_score_eligible(&self) -> bool {
        self.screen == Screen::GameOver && is_score_eligible(self.mode, self.winner)
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        let human_turn = self.current_player.is_human();
        match (self.screen, action) {
            (Screen::Welcome, Action::StartNewGame) => self.start_new_game(now),
            (Screen::Welcome, Action::CycleGameMode) => {
                self.mode = self.mode.next();
                debug!(mode = self.mode.key(), "game mode changed");
            }
            (Screen::Welcome, Action::ToggleGridSelection) => self.toggle_grid_selection(),
            (Screen::Welcome, Action::Navigate(direction)) => self.adjust_grid(direction),
            (Screen::Playing, Action::FlipCard(index)) if human_turn => self.flip(index, now),
            (Screen::Playing, Action::Navigate(direction)) if human_turn => {
                self.move_cursor(direction)
            }
            (Screen::Leaderboard, Action::Navigate(direction)) => self.browse_leaderboard(direction),
            (_, Action::SetScreen(target)) => self.set_screen(target),
            (screen, action) => debug!(?screen, ?action, "ignored action"),
        }
    }

    /// Run every continuation that is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        while let Some(task) = self.scheduler.pop_due(now) {
            if self.screen != Screen::Playing {
                continue;
            }
            match task {
                Task::FlipBack => self.flip_back(now),
                Task::AiMove => self.play_ai_turn(now),
                Task::AiFlip(index) => self.flip(index, now),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn start_new_game(&mut self, now: Instant) {
        let pairs = self.grid_dimension.pairs();
        match paired_deck(pairs, &mut self.rng) {
            Ok(cards) => self.begin(cards, now),
            // Unreachable for validated grids; stay on the menu.
            Err(err) => warn!(%err, grid = %self.grid_dimension, "could not deal"),
        }
    }

    fn begin(&mut self, cards: Vec<Card>, now: Instant) {
        self.scheduler.invalidate();
        self.cards = cards;
        self.flipped.clear();
        self.matched.clear();
        self.seen.clear();
        self.scores = Scores::default();
        self.current_player = Player::P1;
        self.selected_index = 0;
        if let Some(first) = self.cards.first_mut() {
            first.selected = true;
        }
        self.start_time = Some(now);
        self.end_time = None;
        self.winner = Winner::Nobody;
        self.message = "Use arrow keys to move, space to flip a card.".to_string();
        self.screen = Screen::Playing;
        info!(
            mode = self.mode.key(),
            grid = %self.grid_dimension,
            generation = self.generation(),
            "new game"
        );
    }

    fn flip(&mut self, index: usize, now: Instant) {
        if self.flipped.len() == 2
            || self.flipped.contains(&index)
            || self.matched.contains(&index)
            || index >= self.cards.len()
        {
            return;
        }

        self.flipped.push(index);
        self.seen.insert(index);
        self.cards[index].face_up = true;

        let &[first, second] = self.flipped.as_slice() else {
            self.message = "Select another card...".to_string();
            return;
        };

        if self.cards[first].matches(self.cards[second]) {
            self.resolve_match(first, second, now);
        } else {
            debug!(player = self.current_player.label(), first, second, "mismatch");
            self.message = "No match. Flipping cards back...".to_string();
            self.scheduler.schedule(now, FLIP_BACK_DELAY, Task::FlipBack);
        }
    }

    fn resolve_match(&mut self, first: usize, second: usize, now: Instant) {
        self.matched.extend([first, second]);
        self.flipped.clear();
        self.scores.award(self.current_player);
        debug!(player = self.current_player.label(), first, second, "match");

        if self.matched.len() == self.cards.len() {
            self.finish(now);
            return;
        }

        self.message = format!("{} found a match!", self.current_player.label());
        // A match earns another turn.
        if self.current_player == Player::Ai {
            self.scheduler.schedule(now, AI_MOVE_DELAY, Task::AiMove);
        }
    }

    fn finish(&mut self, now: Instant) {
        self.end_time = Some(now);
        self.winner = determine_winner(self.mode, &self.scores);
        self.message = self.winner.announcement();
        self.screen = Screen::GameOver;
        info!(
            winner = self.winner.label(),
            p1 = self.scores.p1,
            p2 = self.scores.p2,
            ai = self.scores.ai,
            elapsed_ms = self.elapsed(now).as_millis() as u64,
            "game over"
        );
    }

    fn flip_back(&mut self, now: Instant) {
        for &index in &self.flipped {
            self.cards[index].face_up = false;
        }
        self.flipped.clear();
        self.switch_player(now);
    }

    fn switch_player(&mut self, now: Instant) {
        self.current_player = self.mode.next_player(self.current_player);
        self.message = format!("{}'s turn", self.current_player.label());
        if self.current_player == Player::Ai {
            self.scheduler.schedule(now, AI_MOVE_DELAY, Task::AiMove);
        }
    }

    fn play_ai_turn(&mut self, now: Instant) {
        if self.current_player != Player::Ai || !self.flipped.is_empty() {
            return;
        }
        let table = TableView {
            cards: &self.cards,
            matched: &self.matched,
            flipped: &self.flipped,
            seen: &self.seen,
        };
        let Some((first, second)) = ai::find_move(&table, &mut self.rng) else {
            return;
        };
        debug!(first, second, "ai move");
        self.flip(first, now);
        self.scheduler
            .schedule(now, AI_SECOND_FLIP_DELAY, Task::AiFlip(second));
    }

    fn move_cursor(&mut self, direction: Direction) {
        if self.cards.is_empty() {
            return;
        }
        let next = self.grid_dimension.step(self.selected_index, direction);
        self.cards[self.selected_index].selected = false;
        self.cards[next].selected = true;
        self.selected_index = next;
    }

    fn adjust_grid(&mut self, direction: Direction) {
        match self.grid_selection {
            GridSelection::Custom => {
                self.grid_dimension = self.grid_dimension.adjust(direction);
            }
            GridSelection::Preset => {
                let next = match direction {
                    Direction::Up => (self.preset_index + 1).min(PRESETS.len() - 1),
                    Direction::Down => self.preset_index.saturating_sub(1),
                    Direction::Left | Direction::Right => return,
                };
                self.preset_index = next;
                self.grid_dimension = PRESETS[next];
            }
        }
        debug!(grid = %self.grid_dimension, "grid changed");
    }

    fn toggle_grid_selection(&mut self) {
        match self.grid_selection {
            GridSelection::Preset => self.grid_selection = GridSelection::Custom,
            GridSelection::Custom => {
                match grid::preset_index(self.grid_dimension) {
                    Some(idx) => self.preset_index = idx,
                    None => self.grid_dimension = PRESETS[self.preset_index],
                }
                self.grid_selection = GridSelection::Preset;
            }
        }
    }

    fn browse_leaderboard(&mut self, direction: Direction) {
        let view = &mut self.leaderboard;
        match direction {
            Direction::Left => view.mode = view.mode.previous(),
            Direction::Right => view.mode = view.mode.next(),
            Direction::Up => {
                view.preset_index = view.preset_index.checked_sub(1).unwrap_or(PRESETS.len() - 1)
            }
            Direction::Down => view.preset_index = (view.preset_index + 1) % PRESETS.len(),
        }
    }

    fn set_screen(&mut self, target: Screen) {
        match (self.screen, target) {
            (Screen::GameOver | Screen::Leaderboard, Screen::Welcome) => {
                self.scheduler.invalidate();
                self.screen = Screen::Welcome;
            }
            (Screen::Welcome | Screen::GameOver, Screen::Leaderboard) => {
                self.leaderboard = LeaderboardView {
                    mode: self.mode,
                    preset_index: grid::preset_index(self.grid_dimension).unwrap_or(0),
                };
                self.screen = Screen::Leaderboard;
            }
            (from, to) => debug!(?from, ?to, "ignored screen change"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    const MS: Duration = Duration::from_millis(1);

    fn dim(rows: u32, cols: u32) -> GridDimension {
        GridDimension::new(rows, cols).unwrap()
    }

    fn cards(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(Suit::Spades, r)).collect()
    }

    /// 2x4 table where only 3 and 7 pair up.
    fn lone_pair_table() -> Vec<Card> {
        use Rank::*;
        cards(&[Ace, Two, Three, King, Four, Five, Six, King])
    }

    /// 2x2 table: (0, 2) and (1, 3) pair up.
    fn two_pair_table() -> Vec<Card> {
        cards(&[Rank::Ace, Rank::Two, Rank::Ace, Rank::Two])
    }

    fn engine_with(mode: GameMode, grid: GridDimension, table: Vec<Card>, t0: Instant) -> Engine {
        let mut engine = Engine::new(mode, grid, Some(9));
        engine.begin(table, t0);
        engine
    }

    #[test]
    fn start_new_game_deals_full_table() {
        let t0 = Instant::now();
        let mut engine = Engine::new(GameMode::Single, dim(4, 4), Some(1));
        engine.dispatch(Action::StartNewGame, t0);

        assert_eq!(engine.screen(), Screen::Playing);
        assert_eq!(engine.cards().len(), 16);
        assert!(engine.cards().iter().all(|c| !c.face_up));
        assert_eq!(engine.current_player(), Player::P1);
        assert_eq!(engine.scores(), &Scores::default());
        assert_eq!(engine.elapsed(t0 + 1500 * MS), 1500 * MS);
    }

    #[test]
    fn flipping_a_pair_scores_and_keeps_the_turn() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::VsPlayer, dim(2, 4), lone_pair_table(), t0);

        engine.dispatch(Action::FlipCard(3), t0);
        assert_eq!(engine.flipped(), &[3]);
        engine.dispatch(Action::FlipCard(7), t0);

        assert!(engine.flipped().is_empty());
        assert!(engine.is_matched(3) && engine.is_matched(7));
        assert_eq!(engine.scores().p1, 1);
        assert_eq!(engine.current_player(), Player::P1);
        assert_eq!(engine.message(), "P1 found a match!");
    }

    #[test]
    fn flipping_a_matched_card_changes_nothing() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::Single, dim(2, 4), lone_pair_table(), t0);
        engine.dispatch(Action::FlipCard(3), t0);
        engine.dispatch(Action::FlipCard(7), t0);
        let matched = engine.matched().clone();

        engine.dispatch(Action::FlipCard(3), t0);
        engine.dispatch(Action::FlipCard(7), t0);

        assert!(engine.flipped().is_empty());
        assert_eq!(engine.matched(), &matched);
    }

    #[test]
    fn repeated_and_out_of_range_flips_are_ignored() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::Single, dim(2, 4), lone_pair_table(), t0);

        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(99), t0);
        assert_eq!(engine.flipped(), &[0]);
    }

    #[test]
    fn mismatch_flips_back_and_passes_the_turn() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::VsPlayer, dim(2, 4), lone_pair_table(), t0);

        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(1), t0);
        assert_eq!(engine.flipped(), &[0, 1]);
        assert!(engine.cards()[0].face_up && engine.cards()[1].face_up);

        // Extra input cannot cut the reveal short.
        engine.dispatch(Action::FlipCard(2), t0 + 10 * MS);
        engine.tick(t0 + 999 * MS);
        assert_eq!(engine.flipped(), &[0, 1]);
        assert_eq!(engine.current_player(), Player::P1);

        engine.tick(t0 + 1000 * MS);
        assert!(engine.flipped().is_empty());
        assert!(!engine.cards()[0].face_up && !engine.cards()[1].face_up);
        assert_eq!(engine.current_player(), Player::P2);
        assert_eq!(engine.message(), "P2's turn");
    }

    #[test]
    fn single_player_keeps_the_turn_after_a_miss() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::Single, dim(2, 4), lone_pair_table(), t0);
        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(1), t0);
        engine.tick(t0 + FLIP_BACK_DELAY);
        assert_eq!(engine.current_player(), Player::P1);
    }

    #[test]
    fn game_ends_when_last_pair_is_matched() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::Single, dim(2, 2), two_pair_table(), t0);

        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(2), t0);
        assert_eq!(engine.screen(), Screen::Playing);
        assert_eq!(engine.matched().len(), 2);

        engine.dispatch(Action::FlipCard(1), t0 + 3000 * MS);
        engine.dispatch(Action::FlipCard(3), t0 + 4000 * MS);
        assert_eq!(engine.matched().len(), 4);
        assert_eq!(engine.screen(), Screen::GameOver);
        assert_eq!(engine.winner(), Winner::Player);
        assert_eq!(engine.final_time(), Some(4000 * MS));
        assert_eq!(engine.elapsed(t0 + 9000 * MS), 4000 * MS);
        assert!(engine.is_score_eligible());
    }

    #[test]
    fn second_player_can_win() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::VsPlayer, dim(2, 2), two_pair_table(), t0);

        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(1), t0);
        engine.tick(t0 + FLIP_BACK_DELAY);
        assert_eq!(engine.current_player(), Player::P2);
        engine.dispatch(Action::FlipCard(0), t0 + FLIP_BACK_DELAY);
        engine.dispatch(Action::FlipCard(2), t0 + FLIP_BACK_DELAY);
        engine.dispatch(Action::FlipCard(1), t0 + FLIP_BACK_DELAY);
        engine.dispatch(Action::FlipCard(3), t0 + FLIP_BACK_DELAY);

        assert_eq!(engine.scores().p2, 2);
        assert_eq!(engine.winner(), Winner::P2);
        assert!(engine.is_score_eligible());
    }

    #[test]
    fn ai_takes_its_turn_after_a_delay() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::VsAi, dim(2, 4), lone_pair_table(), t0);

        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(1), t0);
        engine.tick(t0 + FLIP_BACK_DELAY);
        assert_eq!(engine.current_player(), Player::Ai);

        // Humans cannot flip during the AI's turn.
        engine.dispatch(Action::FlipCard(3), t0 + 1100 * MS);
        assert!(engine.flipped().is_empty());

        engine.tick(t0 + 2000 * MS);
        assert_eq!(engine.flipped().len(), 1, "first AI flip is immediate");
        engine.tick(t0 + 2500 * MS);
        assert!(
            engine.flipped().len() == 2 || engine.scores().ai == 1,
            "second AI flip lands after half a second"
        );
    }

    #[test]
    fn ai_completes_a_remembered_pair() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::VsAi, dim(2, 2), two_pair_table(), t0);

        // P1 misses on 0 and 1; pretend the second Ace was seen earlier.
        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(1), t0);
        engine.seen.insert(2);
        engine.tick(t0 + FLIP_BACK_DELAY);
        engine.tick(t0 + 2000 * MS);
        engine.tick(t0 + 2500 * MS);

        assert_eq!(engine.scores().ai, 1);
        assert!(engine.is_matched(0) && engine.is_matched(2));
        assert_eq!(engine.current_player(), Player::Ai);
        assert!(engine.next_deadline().is_some(), "AI plays again after a match");
    }

    #[test]
    fn restart_discards_pending_ai_moves() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::VsAi, dim(2, 4), lone_pair_table(), t0);
        engine.dispatch(Action::FlipCard(0), t0);
        engine.dispatch(Action::FlipCard(1), t0);
        engine.tick(t0 + FLIP_BACK_DELAY);
        assert!(engine.next_deadline().is_some());
        let generation = engine.generation();

        engine.begin(lone_pair_table(), t0 + 1200 * MS);
        assert!(engine.generation() > generation);
        assert_eq!(engine.next_deadline(), None);

        engine.tick(t0 + 5000 * MS);
        assert!(engine.flipped().is_empty());
        assert_eq!(engine.current_player(), Player::P1);
    }

    #[test]
    fn cursor_moves_row_major() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::Single, dim(2, 4), lone_pair_table(), t0);

        engine.dispatch(Action::Navigate(Direction::Down), t0);
        engine.dispatch(Action::Navigate(Direction::Right), t0);
        assert_eq!(engine.selected_index(), 5);
        assert!(engine.cards()[5].selected);
        assert_eq!(engine.cards().iter().filter(|c| c.selected).count(), 1);
        engine.dispatch(Action::Navigate(Direction::Up), t0);
        assert_eq!(engine.selected_index(), 1);
    }

    #[test]
    fn menu_cycles_presets_and_modes() {
        let t0 = Instant::now();
        let mut engine = Engine::new(GameMode::Single, GridDimension::default(), Some(0));
        assert_eq!(engine.grid_selection(), GridSelection::Preset);

        engine.dispatch(Action::Navigate(Direction::Up), t0);
        assert_eq!(engine.grid_dimension(), dim(3, 6));
        engine.dispatch(Action::Navigate(Direction::Down), t0);
        engine.dispatch(Action::Navigate(Direction::Down), t0);
        assert_eq!(engine.grid_dimension(), dim(2, 6));

        engine.dispatch(Action::CycleGameMode, t0);
        assert_eq!(engine.mode(), GameMode::VsPlayer);
    }

    #[test]
    fn custom_grid_rejects_odd_tables() {
        let t0 = Instant::now();
        let mut engine = Engine::new(GameMode::Single, dim(3, 4), Some(0));
        assert_eq!(engine.grid_selection(), GridSelection::Custom);

        engine.dispatch(Action::Navigate(Direction::Left), t0);
        assert_eq!(engine.grid_dimension(), dim(3, 4));
        engine.dispatch(Action::Navigate(Direction::Up), t0);
        assert_eq!(engine.grid_dimension(), dim(4, 4));

        engine.dispatch(Action::ToggleGridSelection, t0);
        assert_eq!(engine.grid_selection(), GridSelection::Preset);
        engine.dispatch(Action::Navigate(Direction::Up), t0);
        assert_eq!(engine.grid_dimension(), dim(3, 6));
    }

    #[test]
    fn leaderboard_round_trip() {
        let t0 = Instant::now();
        let mut engine = Engine::new(GameMode::VsAi, GridDimension::default(), Some(0));

        engine.dispatch(Action::SetScreen(Screen::Leaderboard), t0);
        assert_eq!(engine.screen(), Screen::Leaderboard);
        assert_eq!(engine.leaderboard_view().mode, GameMode::VsAi);
        assert_eq!(engine.leaderboard_view().grid(), dim(4, 4));

        engine.dispatch(Action::Navigate(Direction::Right), t0);
        engine.dispatch(Action::Navigate(Direction::Down), t0);
        assert_eq!(engine.leaderboard_view().mode, GameMode::Single);
        assert_eq!(engine.leaderboard_view().grid(), dim(3, 6));

        engine.dispatch(Action::SetScreen(Screen::Welcome), t0);
        assert_eq!(engine.screen(), Screen::Welcome);
    }

    #[test]
    fn cannot_leave_a_running_game_by_screen_change() {
        let t0 = Instant::now();
        let mut engine = engine_with(GameMode::Single, dim(2, 4), lone_pair_table(), t0);
        engine.dispatch(Action::SetScreen(Screen::Welcome), t0);
        engine.dispatch(Action::SetScreen(Screen::Leaderboard), t0);
        assert_eq!(engine.screen(), Screen::Playing);
    }
}

use serde::{Deserialize, Serialize};

/// Whoever is allowed to flip cards right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    P1,
    P2,
    Ai,
}

impl Player {
    pub fn is_human(self) -> bool {
        !matches!(self, Player::Ai)
    }

    pub fn label(self) -> &'static str {
        match self {
            Player::P1 => "P1",
            Player::P2 => "P2",
            Player::Ai => "AI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    Single,
    VsPlayer,
    VsAi,
}

impl GameMode {
    /// Menu rotation: single → vs-player → vs-ai → single.
    pub fn next(self) -> Self {
        match self {
            GameMode::Single => GameMode::VsPlayer,
            GameMode::VsPlayer => GameMode::VsAi,
            GameMode::VsAi => GameMode::Single,
        }
    }

    pub fn previous(self) -> Self {
        self.next().next()
    }

    /// Stable name used in score keys and on the wire.
    pub fn key(self) -> &'static str {
        match self {
            GameMode::Single => "single",
            GameMode::VsPlayer => "vs-player",
            GameMode::VsAi => "vs-ai",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameMode::Single => "Single Player",
            GameMode::VsPlayer => "P1 vs P2",
            GameMode::VsAi => "vs AI",
        }
    }

    /// Who plays after `current` misses.
    pub fn next_player(self, current: Player) -> Player {
        match self {
            GameMode::Single => Player::P1,
            GameMode::VsPlayer if current == Player::P1 => Player::P2,
            GameMode::VsPlayer => Player::P1,
            GameMode::VsAi if current == Player::P1 => Player::Ai,
            GameMode::VsAi => Player::P1,
        }
    }
}

/// Pairs found by each side in the current game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    pub p1: u32,
    pub p2: u32,
    pub ai: u32,
}

impl Scores {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::P1 => self.p1,
            Player::P2 => self.p2,
            Player::Ai => self.ai,
        }
    }

    pub fn award(&mut self, player: Player) {
        match player {
            Player::P1 => self.p1 += 1,
            Player::P2 => self.p2 += 1,
            Player::Ai => self.ai += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The lone human in single-player or vs-AI games.
    Player,
    P1,
    P2,
    Ai,
    /// A tie.
    Nobody,
}

impl Winner {
    pub fn label(self) -> &'static str {
        match self {
            Winner::Player => "Player",
            Winner::P1 => "P1",
            Winner::P2 => "P2",
            Winner::Ai => "AI",
            Winner::Nobody => "Nobody",
        }
    }

    pub fn announcement(self) -> String {
        match self {
            Winner::Player => "You Win!".to_string(),
            Winner::Nobody => "It's a Tie!".to_string(),
            other => format!("{} Wins!", other.label()),
        }
    }
}

pub fn determine_winner(mode: GameMode, scores: &Scores) -> Winner {
    use std::cmp::Ordering::*;

    match mode {
        GameMode::Single => Winner::Player,
        GameMode::VsAi => match scores.p1.cmp(&scores.ai) {
            Greater => Winner::Player,
            Less => Winner::Ai,
            Equal => Winner::Nobody,
        },
        GameMode::VsPlayer => match scores.p1.cmp(&scores.p2) {
            Greater => Winner::P1,
            Less => Winner::P2,
            Equal => Winner::Nobody,
        },
    }
}

/// Whether a finished game may enter the high-score table. Ties never do.
pub fn is_score_eligible(mode: GameMode, winner: Winner) -> bool {
    match mode {
        GameMode::Single | GameMode::VsAi => winner == Winner::Player,
        GameMode::VsPlayer => matches!(winner, Winner::P1 | Winner::P2),
    }
}

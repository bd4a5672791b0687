use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::grid::GridDimension;
use crate::player::GameMode;

/// Records kept per grid-shape key.
pub const MAX_RECORDS_PER_KEY: usize = 10;

/// One finished, eligible game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub time_ms: u64,
    pub rows: u8,
    pub cols: u8,
    pub mode: GameMode,
    /// RFC 3339 timestamp of when the game ended.
    pub date: String,
    pub player_name: Option<String>,
    pub device_id: Option<String>,
    pub is_online: Option<bool>,
}

impl HighScoreRecord {
    pub fn new(time: Duration, grid: GridDimension, mode: GameMode, date: String) -> Self {
        HighScoreRecord {
            time_ms: time.as_millis().try_into().unwrap_or(u64::MAX),
            rows: grid.rows() as u8,
            cols: grid.cols() as u8,
            mode,
            date,
            player_name: None,
            device_id: None,
            is_online: Some(false),
        }
    }

    pub fn key(&self) -> String {
        format!("{}x{}-{}", self.rows, self.cols, self.mode.key())
    }

    pub fn display_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or("Anonymous")
    }
}

/// `"{rows}x{cols}-{mode}"`, e.g. `4x4-vs-ai`.
pub fn score_key(grid: GridDimension, mode: GameMode) -> String {
    format!("{grid}-{}", mode.key())
}

/// Ranked best times, fastest first, per grid shape and mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBook {
    entries: BTreeMap<String, Vec<HighScoreRecord>>,
}

impl ScoreBook {
    /// Rebuild from loaded data, re-ranking and trimming every key.
    pub fn from_entries(entries: BTreeMap<String, Vec<HighScoreRecord>>) -> Self {
        let mut book = ScoreBook::default();
        for record in entries.into_values().flatten() {
            book.save(record);
        }
        book
    }

    pub fn into_entries(self) -> BTreeMap<String, Vec<HighScoreRecord>> {
        self.entries
    }

    /// Whether `time` would make the table for this grid and mode.
    pub fn is_new_high_score(&self, time: Duration, grid: GridDimension, mode: GameMode) -> bool {
        let ranked = self.leaderboard(mode, grid);
        match ranked.get(MAX_RECORDS_PER_KEY - 1) {
            Some(last) => time.as_millis() < u128::from(last.time_ms),
            None => true,
        }
    }

    /// Insert in rank order; equal times keep their arrival order.
    pub fn save(&mut self, record: HighScoreRecord) {
        let ranked = self.entries.entry(record.key()).or_default();
        ranked.push(record);
        ranked.sort_by_key(|r| r.time_ms);
        ranked.truncate(MAX_RECORDS_PER_KEY);
    }

    pub fn best(&self, mode: GameMode, grid: GridDimension) -> Option<&HighScoreRecord> {
        self.leaderboard(mode, grid).first()
    }

    pub fn leaderboard(&self, mode: GameMode, grid: GridDimension) -> &[HighScoreRecord] {
        self.entries
            .get(&score_key(grid, mode))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

/// `m:ss`, minutes unbounded.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

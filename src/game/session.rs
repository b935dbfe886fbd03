//! Per-session game records.
//!
//! One [`GameState`] is owned by exactly one session identifier. It survives
//! across requests through the storage layer and is destroyed (or superseded
//! by a restart) when the game ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{PlayerStats, Stage};

/// Bumped whenever the stored record layout changes incompatibly.
pub const GAME_SCHEMA_VERSION: u8 = 1;

/// The full persisted state of one player's in-progress game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub schema_version: u8,
    pub player_name: String,
    pub stats: PlayerStats,
    /// Snapshot taken just before the most recent mutation, so the UI can
    /// show per-turn deltas.
    pub previous_stats: PlayerStats,
    pub stage: Stage,
    /// Set the first time the XP threshold is crossed; guards the
    /// once-per-game leaderboard append.
    pub victory_achieved: bool,
    pub game_over: bool,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    /// Fresh game for a (validated) player name: default stats {100, 0, 0},
    /// exploring, nothing achieved yet.
    pub fn new(player_name: impl Into<String>) -> Self {
        let now = Utc::now();
        let stats = PlayerStats::starting();
        GameState {
            schema_version: GAME_SCHEMA_VERSION,
            player_name: player_name.into(),
            stats,
            previous_stats: stats,
            stage: Stage::Exploring,
            victory_achieved: false,
            game_over: false,
            started_at: now,
            updated_at: now,
        }
    }

    /// Capture the pre-mutation stats and refresh the activity timestamp.
    /// Call once per resolved turn, before the engine touches `stats`.
    pub fn begin_turn(&mut self) {
        self.previous_stats = self.stats;
        self.updated_at = Utc::now();
    }

    /// (health, score, xp) movement of the most recent turn.
    pub fn stat_delta(&self) -> (i32, i32, i32) {
        (
            self.stats.health - self.previous_stats.health,
            self.stats.score - self.previous_stats.score,
            self.stats.xp - self.previous_stats.xp,
        )
    }
}

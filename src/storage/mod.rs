//! # Storage Module - Game Persistence Layer
//!
//! Sled-backed persistence for in-progress game sessions and the append-only
//! leaderboard. All records are bincode-encoded serde structs carrying a
//! schema version that is checked on decode.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!   └── sled trees:
//!       quest_states       ← sessions:<session_id> → GameState
//!       quest_leaderboard  ← <be nanos>:<uuid>     → LeaderboardEntry
//! ```
//!
//! Sled gives atomic read-modify-write per key, which is all the game needs:
//! each request loads, mutates, and saves one session's state. Concurrent
//! writers to the same session are last-write-wins.

pub mod backup;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::game::engine::Outcome;
use crate::game::session::{GameState, GAME_SCHEMA_VERSION};

const TREE_STATES: &str = "quest_states";
const TREE_LEADERBOARD: &str = "quest_leaderboard";

/// Default number of rows returned by a leaderboard query.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Errors that can arise while interacting with the game store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when decoding a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

/// One finished-game row. Created once per terminal event, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: i32,
    pub xp: i32,
    pub outcome: Outcome,
    pub health: i32,
    pub recorded_at: DateTime<Utc>,
}

fn next_timestamp_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000)
}

/// Sled-backed store for session game states and the leaderboard.
pub struct GameStore {
    db: sled::Db,
    states: sled::Tree,
    leaderboard: sled::Tree,
}

impl GameStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let states = db.open_tree(TREE_STATES)?;
        let leaderboard = db.open_tree(TREE_LEADERBOARD)?;
        Ok(Self {
            db,
            states,
            leaderboard,
        })
    }

    fn state_key(session_id: &str) -> Vec<u8> {
        format!("sessions:{}", session_id).into_bytes()
    }

    /// Keys sort by insertion time; the uuid suffix disambiguates same-nanos
    /// appends from concurrent games.
    fn leaderboard_key() -> Vec<u8> {
        format!("{:020}:{}", next_timestamp_nanos(), Uuid::new_v4()).into_bytes()
    }

    /// Persist `state` under its session key, replacing any prior record.
    pub fn save_state(&self, session_id: &str, state: &GameState) -> Result<(), StoreError> {
        let bytes = bincode::serialize(state)?;
        self.states.insert(Self::state_key(session_id), bytes)?;
        Ok(())
    }

    /// Fetch the stored game for a session, or `None` when the session has
    /// no game in progress.
    pub fn load_state(&self, session_id: &str) -> Result<Option<GameState>, StoreError> {
        let Some(bytes) = self.states.get(Self::state_key(session_id))? else {
            return Ok(None);
        };
        let state: GameState = bincode::deserialize(&bytes)?;
        if state.schema_version != GAME_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "GameState",
                expected: GAME_SCHEMA_VERSION,
                found: state.schema_version,
            });
        }
        Ok(Some(state))
    }

    /// Drop a session's stored game. Missing keys are not an error; clearing
    /// an already-finished game must be idempotent.
    pub fn clear_state(&self, session_id: &str) -> Result<(), StoreError> {
        self.states.remove(Self::state_key(session_id))?;
        Ok(())
    }

    /// Append one terminal-event row. Insert-only; rows are never rewritten.
    pub fn append_leaderboard(&self, entry: &LeaderboardEntry) -> Result<(), StoreError> {
        let bytes = bincode::serialize(entry)?;
        self.leaderboard.insert(Self::leaderboard_key(), bytes)?;
        Ok(())
    }

    /// Top-`limit` rows ordered by xp descending, then score descending.
    /// XP is the primary sort key, even though score reads as the headline
    /// number in the UI.
    pub fn query_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = Vec::new();
        for item in self.leaderboard.iter() {
            let (_, bytes) = item?;
            let entry: LeaderboardEntry = bincode::deserialize(&bytes)?;
            entries.push(entry);
        }
        entries.sort_by(|a, b| b.xp.cmp(&a.xp).then(b.score.cmp(&a.score)));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Number of sessions with a game in progress.
    pub fn session_count(&self) -> usize {
        self.states.len()
    }

    /// Number of rows ever recorded on the leaderboard.
    pub fn leaderboard_count(&self) -> usize {
        self.leaderboard.len()
    }

    /// Force pending writes to disk. Called before backups so the archive
    /// sees a consistent tree.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

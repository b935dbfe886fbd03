//! Adventure game core.
//! The pure encounter engine lives in [`engine`], per-session persistent
//! state in [`session`], and the orchestration layer tying them to the store
//! in [`server`].

pub mod engine;
pub mod server;
pub mod session;

pub use engine::{
    classify_victory, resolve, Action, EventTag, Outcome, PlayerStats, Stage, VictoryTier,
    MAX_HEALTH, SPEND_COST, VICTORY_XP,
};
pub use server::{format_leaderboard, run_console_game, GameError, GameServer, TurnReport};
pub use session::{GameState, GAME_SCHEMA_VERSION};

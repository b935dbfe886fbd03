//! # Textquest - A Persistent Text Adventure
//!
//! Textquest is a small session-based adventure game with durable state. Each
//! session carries one game: adventure, fight monsters, chase treasure
//! rumors, and rest your way to 200 XP before a trap or a monster finishes
//! you. Victories and deaths land on a persistent leaderboard.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textquest::game::GameServer;
//! use textquest::storage::GameStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = GameStore::open("./data")?;
//!     let server = GameServer::new(store);
//!
//!     println!("{}", server.start_game("session-1", "Danny")?);
//!     let report = server.resolve_action("session-1", "adventure")?;
//!     println!("{}", report.narration);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - Encounter engine, session state, and the game server
//! - [`storage`] - Sled-backed persistence and backup/restore
//! - [`config`] - TOML configuration with defaults
//! - [`validation`] - Player name validation
//! - [`logutil`] - Log sanitization for user-supplied strings
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Game Server   │ ← Request cycle: load, resolve, record, save
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Encounter     │ ← Pure resolution; injected randomness
//! │   Engine        │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Storage       │ ← Sled trees: session states, leaderboard
//! │   Layer         │
//! └─────────────────┘
//! ```

pub mod config;
pub mod game;
pub mod logutil;
pub mod storage;
pub mod validation;

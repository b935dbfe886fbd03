//! # Game Server - Session Orchestrator
//!
//! `GameServer` owns the persistent store and drives the request cycle for
//! every session: load state, snapshot, resolve the action, classify the
//! result, record terminal events, save or clear. Each public method is one
//! self-contained request; callers hold no game state between calls.
//!
//! ## Turn lifecycle
//!
//! ```text
//! load ──→ snapshot previous_stats ──→ resolve(action, rng)
//!      ──→ victory check (records once, play continues)
//!      ──→ death check  (records, ends game, clears session)
//!      ──→ save (or clear)
//! ```
//!
//! Victory is checked before death so a turn that crosses the XP threshold
//! and drops health to zero produces both leaderboard rows.

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use rand::Rng;

use super::engine::{self, classify_victory, EventTag, Outcome, PlayerStats, Stage, VictoryTier};
use super::session::GameState;
use crate::logutil::escape_log;
use crate::storage::{GameStore, LeaderboardEntry, StoreError, DEFAULT_LEADERBOARD_LIMIT};
use crate::validation::validate_player_name;

/// Everything a caller needs to render one resolved turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Player-facing narration for the event, plus any victory or death text.
    pub narration: String,
    /// Typed event for callers that render their own text.
    pub tag: EventTag,
    /// Stats after the turn.
    pub stats: PlayerStats,
    /// Stats as they were before the turn.
    pub previous_stats: PlayerStats,
    /// Stage the game is in after the turn.
    pub stage: Stage,
    /// Set on the turn victory is first achieved, `None` on every other turn.
    pub victory: Option<VictoryTier>,
    /// True when this turn ended the game.
    pub game_over: bool,
}

/// Errors surfaced to players as messages rather than logged failures.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    InvalidName(#[from] crate::validation::NameError),

    #[error("No game in progress for this session. Start one first.")]
    NoGame,

    #[error("Unrecognized action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Session-keyed orchestrator over the encounter engine and the store.
pub struct GameServer {
    store: GameStore,
}

impl GameServer {
    pub fn new(store: GameStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    /// Begin a fresh game for `session_id`, replacing any game in progress.
    /// Returns the welcome text.
    pub fn start_game(&self, session_id: &str, player_name: &str) -> Result<String, GameError> {
        let name = validate_player_name(player_name)?;
        let state = GameState::new(name.clone());
        self.store.save_state(session_id, &state)?;
        info!(
            "Game started: session={} player={}",
            escape_log(session_id),
            escape_log(&name)
        );
        Ok(format!(
            "Welcome {}! Your adventure begins.\nReach 200 XP to win. Don't die.\n{}",
            name, state.stats
        ))
    }

    /// Current state for a session, if a game is in progress.
    pub fn current_state(&self, session_id: &str) -> Result<Option<GameState>, GameError> {
        Ok(self.store.load_state(session_id)?)
    }

    /// Resolve one action token with OS randomness.
    pub fn resolve_action(&self, session_id: &str, token: &str) -> Result<TurnReport, GameError> {
        self.resolve_action_with(session_id, token, &mut rand::thread_rng())
    }

    /// Resolve one action token with a caller-supplied random source. Tests
    /// drive this with seeded rngs to pin every branch.
    pub fn resolve_action_with<R: Rng>(
        &self,
        session_id: &str,
        token: &str,
        rng: &mut R,
    ) -> Result<TurnReport, GameError> {
        let mut state = self
            .store
            .load_state(session_id)?
            .ok_or(GameError::NoGame)?;

        let action = state
            .stage
            .parse_choice(token)
            .ok_or_else(|| GameError::UnknownAction(escape_log(token)))?;

        state.begin_turn();
        let (next_stage, tag) = engine::resolve(&mut state.stats, state.stage, action, rng);
        state.stage = next_stage;

        debug!(
            "Turn resolved: session={} action={} tag={:?} stats=({})",
            escape_log(session_id),
            action,
            tag,
            state.stats
        );

        let mut narration = tag.narration();

        // Victory first. It records once and the game continues.
        let mut victory = None;
        if !state.victory_achieved {
            if let Some(tier) = classify_victory(&state.stats) {
                state.victory_achieved = true;
                victory = Some(tier);
                self.record_outcome(&state, Outcome::Victory(tier))?;
                info!(
                    "Victory: session={} player={} tier={} stats=({})",
                    escape_log(session_id),
                    escape_log(&state.player_name),
                    tier,
                    state.stats
                );
                narration.push_str(&format!(
                    "\n\n*** {} ***\n{}\nYour triumph is recorded. The road goes on if you wish.",
                    tier,
                    tier.congratulation(&state.player_name)
                ));
            }
        }

        // Death always ends the game, even on a victory turn.
        if state.stats.is_dead() {
            state.game_over = true;
            self.record_outcome(&state, Outcome::Died)?;
            info!(
                "Death: session={} player={} stats=({})",
                escape_log(session_id),
                escape_log(&state.player_name),
                state.stats
            );
            narration.push_str(&format!(
                "\n\nYou have died, {}. Your tale ends here.",
                state.player_name
            ));
            self.store.clear_state(session_id)?;
        } else {
            self.store.save_state(session_id, &state)?;
        }

        Ok(TurnReport {
            narration,
            tag,
            stats: state.stats,
            previous_stats: state.previous_stats,
            stage: state.stage,
            victory,
            game_over: state.game_over,
        })
    }

    fn record_outcome(&self, state: &GameState, outcome: Outcome) -> Result<(), StoreError> {
        self.store.append_leaderboard(&LeaderboardEntry {
            player_name: state.player_name.clone(),
            score: state.stats.score,
            xp: state.stats.xp,
            outcome,
            health: state.stats.health,
            recorded_at: Utc::now(),
        })
    }

    /// Abandon the session's game without a leaderboard row.
    pub fn abandon(&self, session_id: &str) -> Result<(), GameError> {
        self.store.clear_state(session_id)?;
        info!("Game abandoned: session={}", escape_log(session_id));
        Ok(())
    }

    /// Top leaderboard rows; `None` limit means the default of ten.
    pub fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>, GameError> {
        Ok(self
            .store
            .query_leaderboard(limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))?)
    }
}

/// Render leaderboard rows as an aligned text table.
pub fn format_leaderboard(rows: &[LeaderboardEntry]) -> String {
    if rows.is_empty() {
        return "The leaderboard is empty. No legends yet.".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!(
        "{:<4} {:<20} {:>6} {:>6} {:>7}  {}\n",
        "#", "Player", "XP", "Score", "Health", "Outcome"
    ));
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<20} {:>6} {:>6} {:>7}  {}\n",
            i + 1,
            row.player_name,
            row.xp,
            row.score,
            row.health,
            row.outcome
        ));
    }
    out
}

/// Interactive console loop used by the `play` subcommand. Reads action
/// tokens from stdin until the game ends or the player quits.
pub async fn run_console_game(server: &GameServer, player_name: &str) -> Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    // One console run is one session.
    let session_id = format!("console-{}", uuid::Uuid::new_v4());
    let welcome = server.start_game(&session_id, player_name)?;
    println!("{}\n", welcome);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let state = match server.current_state(&session_id)? {
            Some(s) => s,
            None => break,
        };

        let choices: Vec<String> = state
            .stage
            .choices(state.stats.score)
            .iter()
            .map(|a| a.token().to_string())
            .collect();
        println!("[{}]", state.stats);
        println!("What do you do? ({} or quit)", choices.join(", "));

        let Some(line) = lines.next_line().await? else {
            // stdin closed; leave the game resumable.
            break;
        };
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case("quit") || token.eq_ignore_ascii_case("q") {
            server.abandon(&session_id)?;
            println!("Farewell, {}.", state.player_name);
            break;
        }

        match server.resolve_action(&session_id, token) {
            Ok(report) => {
                println!("\n{}\n", report.narration);
                if report.game_over {
                    println!("{}", format_leaderboard(&server.leaderboard(None)?));
                    break;
                }
            }
            Err(GameError::UnknownAction(t)) => {
                println!("Unrecognized action: {}", t);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn server() -> (tempfile::TempDir, GameServer) {
        let tmp = tempdir().unwrap();
        let store = GameStore::open(tmp.path()).unwrap();
        (tmp, GameServer::new(store))
    }

    fn seed_where<F: Fn(&mut StdRng) -> bool>(pred: F) -> u64 {
        for s in 0u64..20_000u64 {
            let mut rng = StdRng::seed_from_u64(s);
            if pred(&mut rng) {
                return s;
            }
        }
        panic!("no seed satisfied predicate within 20k attempts");
    }

    #[test]
    fn start_game_rejects_bad_names() {
        let (_tmp, srv) = server();
        assert!(matches!(
            srv.start_game("s", "   "),
            Err(GameError::InvalidName(_))
        ));
        assert!(srv.current_state("s").unwrap().is_none());
    }

    #[test]
    fn resolving_without_a_game_fails() {
        let (_tmp, srv) = server();
        assert!(matches!(
            srv.resolve_action("ghost", "adventure"),
            Err(GameError::NoGame)
        ));
    }

    #[test]
    fn unknown_token_leaves_state_untouched() {
        let (_tmp, srv) = server();
        srv.start_game("s", "Danny").unwrap();
        let before = srv.current_state("s").unwrap().unwrap();
        assert!(matches!(
            srv.resolve_action("s", "teleport"),
            Err(GameError::UnknownAction(_))
        ));
        let after = srv.current_state("s").unwrap().unwrap();
        assert_eq!(after.stats, before.stats);
        assert_eq!(after.stage, before.stage);
    }

    #[test]
    fn trap_turn_updates_and_snapshots_stats() {
        let (_tmp, srv) = server();
        srv.start_game("s", "Danny").unwrap();
        let seed = seed_where(|rng| rng.gen_range(0..3) == 2);
        let mut rng = StdRng::seed_from_u64(seed);
        let report = srv.resolve_action_with("s", "adventure", &mut rng).unwrap();
        assert_eq!(report.tag, EventTag::TrapSprung);
        assert_eq!(report.previous_stats, PlayerStats::starting());
        assert_eq!(
            report.stats,
            PlayerStats {
                health: 90,
                score: 0,
                xp: 2
            }
        );
        assert!(!report.game_over);

        let stored = srv.current_state("s").unwrap().unwrap();
        assert_eq!(stored.stats, report.stats);
        assert_eq!(stored.previous_stats, report.previous_stats);
    }

    /// Drive a session to the XP threshold by winning fights: ten wins yield
    /// +200 score and +200 xp with full health, a Perfect victory.
    fn win_fights_until_victory(srv: &GameServer, session: &str) -> TurnReport {
        let monster_seed = seed_where(|rng| rng.gen_range(0..3) == 1);
        let win_seed = seed_where(|rng| rng.gen_bool(0.5));
        let mut last = None;
        for _ in 0..10 {
            let mut rng = StdRng::seed_from_u64(monster_seed);
            let r = srv.resolve_action_with(session, "adventure", &mut rng).unwrap();
            assert_eq!(r.tag, EventTag::MonsterAppeared);
            let mut rng = StdRng::seed_from_u64(win_seed);
            last = Some(srv.resolve_action_with(session, "fight", &mut rng).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn victory_records_once_and_play_continues() {
        let (_tmp, srv) = server();
        srv.start_game("s", "Danny").unwrap();

        let report = win_fights_until_victory(&srv, "s");
        assert_eq!(report.victory, Some(VictoryTier::Perfect));
        assert!(!report.game_over, "victory does not end the game");
        assert!(report.narration.contains("PERFECT VICTORY"));

        let rows = srv.leaderboard(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].outcome, Outcome::Victory(VictoryTier::Perfect));
        assert_eq!(rows[0].xp, 200);

        // Another winning fight past the threshold records nothing new.
        let monster_seed = seed_where(|rng| rng.gen_range(0..3) == 1);
        let win_seed = seed_where(|rng| rng.gen_bool(0.5));
        let mut rng = StdRng::seed_from_u64(monster_seed);
        srv.resolve_action_with("s", "adventure", &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(win_seed);
        let after = srv.resolve_action_with("s", "fight", &mut rng).unwrap();
        assert_eq!(after.victory, None);
        assert_eq!(srv.leaderboard(None).unwrap().len(), 1);

        let state = srv.current_state("s").unwrap().unwrap();
        assert!(state.victory_achieved);
    }

    #[test]
    fn death_records_and_clears_the_session() {
        let (_tmp, srv) = server();
        srv.start_game("s", "Danny").unwrap();

        // Ten traps take health from 100 to 0.
        let trap_seed = seed_where(|rng| rng.gen_range(0..3) == 2);
        let mut last = None;
        for _ in 0..10 {
            let mut rng = StdRng::seed_from_u64(trap_seed);
            last = Some(srv.resolve_action_with("s", "adventure", &mut rng).unwrap());
        }
        let report = last.unwrap();
        assert!(report.game_over);
        assert_eq!(report.stats.health, 0);
        assert!(report.narration.contains("You have died"));

        assert!(srv.current_state("s").unwrap().is_none());
        let rows = srv.leaderboard(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].outcome, Outcome::Died);
        assert_eq!(rows[0].xp, 20);
    }

    #[test]
    fn victory_and_death_on_the_same_turn_record_both() {
        let (_tmp, srv) = server();
        srv.start_game("s", "Danny").unwrap();

        // Shape the state by hand: one lost fight away from both thresholds.
        let mut state = srv.current_state("s").unwrap().unwrap();
        state.stats = PlayerStats {
            health: 20,
            score: 0,
            xp: 195,
        };
        state.stage = Stage::MonsterEncounter;
        srv.store().save_state("s", &state).unwrap();

        let lose_seed = seed_where(|rng| !rng.gen_bool(0.5));
        let mut rng = StdRng::seed_from_u64(lose_seed);
        let report = srv.resolve_action_with("s", "fight", &mut rng).unwrap();

        // -20 health and +5 xp: dead at exactly 200 xp, a Pyrrhic victory.
        assert_eq!(report.stats.xp, 200);
        assert_eq!(report.victory, Some(VictoryTier::Pyrrhic));
        assert!(report.game_over);

        let rows = srv.leaderboard(None).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .any(|r| r.outcome == Outcome::Victory(VictoryTier::Pyrrhic)));
        assert!(rows.iter().any(|r| r.outcome == Outcome::Died));
        assert!(srv.current_state("s").unwrap().is_none());
    }

    #[test]
    fn restart_replaces_a_game_in_progress() {
        let (_tmp, srv) = server();
        srv.start_game("s", "Danny").unwrap();
        let trap_seed = seed_where(|rng| rng.gen_range(0..3) == 2);
        let mut rng = StdRng::seed_from_u64(trap_seed);
        srv.resolve_action_with("s", "adventure", &mut rng).unwrap();

        srv.start_game("s", "Danny").unwrap();
        let state = srv.current_state("s").unwrap().unwrap();
        assert_eq!(state.stats, PlayerStats::starting());
        assert_eq!(state.stage, Stage::Exploring);
    }

    #[test]
    fn leaderboard_formats_as_table() {
        let rows = vec![LeaderboardEntry {
            player_name: "Danny".into(),
            score: 200,
            xp: 200,
            outcome: Outcome::Victory(VictoryTier::Perfect),
            health: 100,
            recorded_at: Utc::now(),
        }];
        let text = format_leaderboard(&rows);
        assert!(text.contains("Danny"));
        assert!(text.contains("PERFECT VICTORY"));
        assert!(format_leaderboard(&[]).contains("empty"));
    }
}

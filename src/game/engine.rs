//! Encounter resolution engine for the adventure game.
//!
//! Everything in this module is pure: a resolver takes the current stats, the
//! current stage, a player action, and a random source, and returns the new
//! stage plus a typed event tag describing what happened. No I/O, no clocks.
//! Randomness is injected as a generic [`rand::Rng`] so tests can drive every
//! branch with a seeded [`rand::rngs::StdRng`].
//!
//! The three-way encounter draw (treasure/monster/trap) and the Bernoulli
//! success draws are independent per call and never retried.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health ceiling; resting never heals past this.
pub const MAX_HEALTH: i32 = 100;
/// XP threshold at which a game becomes a victory.
pub const VICTORY_XP: i32 = 200;
/// Score required (and at most spent) by `rest` and `get_help`.
pub const SPEND_COST: i32 = 10;

/// The (health, score, xp) triple defining player progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub health: i32,
    pub score: i32,
    pub xp: i32,
}

impl PlayerStats {
    /// Fresh-game stats.
    pub fn starting() -> Self {
        PlayerStats {
            health: MAX_HEALTH,
            score: 0,
            xp: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for PlayerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Health: {} | Score: {} | XP: {}",
            self.health, self.score, self.xp
        )
    }
}

/// Where the player currently stands in the two-phase encounter flow.
///
/// `adventure` may surface a monster or a treasure rumor; the matching
/// sub-choice actions are only valid while that stage is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Free to adventure or rest.
    Exploring,
    /// A monster blocks the way; fight or run.
    MonsterEncounter,
    /// A local mentioned a treasure chest; search alone, pay for help, or ignore.
    TreasureHunch,
}

impl Stage {
    /// Actions a player may legally take in this stage, for prompts.
    pub fn choices(&self, score: i32) -> &'static [Action] {
        match self {
            Stage::Exploring => &[Action::Adventure, Action::Rest],
            Stage::MonsterEncounter => &[Action::Fight, Action::Run],
            Stage::TreasureHunch => {
                if score >= SPEND_COST {
                    &[Action::SearchAlone, Action::GetHelp, Action::Ignore]
                } else {
                    &[Action::SearchAlone, Action::Ignore]
                }
            }
        }
    }

    /// Parse a token the way the console prompt reads it: full tokens always
    /// work, and the single-letter shorthand resolves against this stage
    /// ("r" is rest while exploring but run mid-fight).
    pub fn parse_choice(&self, token: &str) -> Option<Action> {
        if let Some(action) = Action::parse(token) {
            return Some(action);
        }
        match (self, token.trim().to_ascii_lowercase().as_str()) {
            (Stage::Exploring, "a") => Some(Action::Adventure),
            (Stage::Exploring, "r") => Some(Action::Rest),
            (Stage::MonsterEncounter, "f") => Some(Action::Fight),
            (Stage::MonsterEncounter, "r") => Some(Action::Run),
            (Stage::TreasureHunch, "s") => Some(Action::SearchAlone),
            (Stage::TreasureHunch, "h") => Some(Action::GetHelp),
            (Stage::TreasureHunch, "i") => Some(Action::Ignore),
            _ => None,
        }
    }
}

/// A player-chosen verb driving one resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Adventure,
    Rest,
    Fight,
    Run,
    SearchAlone,
    GetHelp,
    Ignore,
}

impl Action {
    /// Parse a full action token, case-insensitive. Single-letter shorthand
    /// is stage-dependent and lives in [`Stage::parse_choice`].
    pub fn parse(token: &str) -> Option<Action> {
        match token.trim().to_ascii_lowercase().as_str() {
            "adventure" => Some(Action::Adventure),
            "rest" => Some(Action::Rest),
            "fight" => Some(Action::Fight),
            "run" => Some(Action::Run),
            "search_alone" | "search" => Some(Action::SearchAlone),
            "get_help" | "help" => Some(Action::GetHelp),
            "ignore" => Some(Action::Ignore),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Action::Adventure => "adventure",
            Action::Rest => "rest",
            Action::Fight => "fight",
            Action::Run => "run",
            Action::SearchAlone => "search_alone",
            Action::GetHelp => "get_help",
            Action::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Typed classification of what a single resolution produced.
///
/// Variants carry the rolled numbers where the narration needs them; fixed
/// rewards live in the narration text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTag {
    /// Rested, healing `gained` health for `cost` score.
    Rested { gained: i32, cost: i32 },
    /// Tried to rest with fewer than [`SPEND_COST`] score points.
    TooPoorToRest,
    /// Adventure drew a monster; awaiting fight/run.
    MonsterAppeared,
    /// Adventure drew a treasure rumor; awaiting search/help/ignore.
    TreasureRumor,
    /// Adventure drew a trap: -10 health, +2 xp, resolved immediately.
    TrapSprung,
    /// Won the fight: +20 score, +20 xp.
    MonsterSlain,
    /// Lost the fight: -20 health, +5 xp.
    MonsterMauledYou,
    /// Ran from the monster; no change.
    RanAway,
    /// Solo search succeeded: +25 score, +25 xp.
    FoundTreasureAlone,
    /// Solo search failed: +3 xp for trying.
    SearchCameUpEmpty,
    /// Paid 10 score and the local delivered: +25 score, +10 xp.
    FoundTreasureWithHelp,
    /// Paid 10 score for nothing; the cost stays paid.
    HelpersFailed,
    /// Tried to hire help with fewer than [`SPEND_COST`] score points.
    TooPoorForHelp,
    /// Walked away from the rumor; no change.
    IgnoredTreasure,
    /// Action not valid in the current stage; nothing happened.
    InvalidChoice,
}

impl EventTag {
    /// True when the event left the stats untouched.
    pub fn is_no_op(&self) -> bool {
        matches!(
            self,
            EventTag::TooPoorToRest
                | EventTag::TooPoorForHelp
                | EventTag::RanAway
                | EventTag::IgnoredTreasure
                | EventTag::MonsterAppeared
                | EventTag::TreasureRumor
                | EventTag::InvalidChoice
        )
    }

    /// Player-facing narration for this event.
    pub fn narration(&self) -> String {
        match self {
            EventTag::Rested { gained, cost } => format!(
                "You rested and gained {} health at the cost of {} score points.",
                gained, cost
            ),
            EventTag::TooPoorToRest => {
                "You don't have enough score points to rest (need 10 points).".into()
            }
            EventTag::MonsterAppeared => "A wild ugly Monster appears!".into(),
            EventTag::TreasureRumor => {
                "You have learned about a treasure chest from a local in town!".into()
            }
            EventTag::TrapSprung => {
                "You encountered a trap!\nYou lost 10 health but gained 2 XP, you're tough!".into()
            }
            EventTag::MonsterSlain => {
                "You defeated the monster!\nYou gained 20 points and a whopping 20 XP!".into()
            }
            EventTag::MonsterMauledYou => {
                "The monster hurt you!\nYou lost 20 health but gained 5 XP, you're tough!".into()
            }
            EventTag::RanAway => {
                "You ran away safely! Nothing ventured and nothing gained!".into()
            }
            EventTag::FoundTreasureAlone => {
                "You found the treasure by yourself! You gained 25 points and 25 XP!".into()
            }
            EventTag::SearchCameUpEmpty => {
                "Despite searching, you couldn't find the treasure... But you gained 3 XP for trying!"
                    .into()
            }
            EventTag::FoundTreasureWithHelp => {
                "With the local's help, you found the treasure! You gained 25 points and 10 XP!"
                    .into()
            }
            EventTag::HelpersFailed => {
                "Despite the local's help, you couldn't find the treasure... And you lost 10 points!"
                    .into()
            }
            EventTag::TooPoorForHelp => {
                "You don't have enough points to get help (need 10 points).".into()
            }
            EventTag::IgnoredTreasure => {
                "You decided to ignore the treasure and move on.".into()
            }
            EventTag::InvalidChoice => {
                "That isn't an option right now. Choose again.".into()
            }
        }
    }
}

/// Resolve one action against the current stats and stage.
///
/// Mutates `stats` in place per the resolution table and returns the stage to
/// transition into plus the event tag. Precondition failures and invalid
/// actions leave `stats` untouched.
pub fn resolve<R: Rng>(
    stats: &mut PlayerStats,
    stage: Stage,
    action: Action,
    rng: &mut R,
) -> (Stage, EventTag) {
    match (stage, action) {
        (Stage::Exploring, Action::Adventure) => resolve_adventure(stats, rng),
        (Stage::Exploring, Action::Rest) => (Stage::Exploring, resolve_rest(stats)),
        (Stage::MonsterEncounter, Action::Fight) => {
            (Stage::Exploring, resolve_fight(stats, rng))
        }
        (Stage::MonsterEncounter, Action::Run) => (Stage::Exploring, EventTag::RanAway),
        (Stage::TreasureHunch, Action::SearchAlone) => {
            (Stage::Exploring, resolve_search_alone(stats, rng))
        }
        (Stage::TreasureHunch, Action::GetHelp) => {
            let tag = resolve_get_help(stats, rng);
            // An unaffordable hire keeps the rumor live; the cheaper choices remain.
            let next = if tag == EventTag::TooPoorForHelp {
                Stage::TreasureHunch
            } else {
                Stage::Exploring
            };
            (next, tag)
        }
        (Stage::TreasureHunch, Action::Ignore) => (Stage::Exploring, EventTag::IgnoredTreasure),
        (current, _) => (current, EventTag::InvalidChoice),
    }
}

/// Uniform three-way draw: treasure, monster, or trap. Only the trap mutates
/// stats here; the other two hand control to the sub-choice stage.
fn resolve_adventure<R: Rng>(stats: &mut PlayerStats, rng: &mut R) -> (Stage, EventTag) {
    match rng.gen_range(0..3) {
        0 => (Stage::TreasureHunch, EventTag::TreasureRumor),
        1 => (Stage::MonsterEncounter, EventTag::MonsterAppeared),
        _ => {
            stats.health -= 10;
            stats.xp += 2;
            (Stage::Exploring, EventTag::TrapSprung)
        }
    }
}

/// Rest heals up to 20, capped at [`MAX_HEALTH`], and charges only for the
/// health actually gained (at most [`SPEND_COST`]). The precondition check
/// runs before any arithmetic.
fn resolve_rest(stats: &mut PlayerStats) -> EventTag {
    if stats.score < SPEND_COST {
        return EventTag::TooPoorToRest;
    }
    let gained = (MAX_HEALTH - stats.health).min(20);
    let cost = gained.min(SPEND_COST);
    stats.health += gained;
    stats.score -= cost;
    EventTag::Rested { gained, cost }
}

fn resolve_fight<R: Rng>(stats: &mut PlayerStats, rng: &mut R) -> EventTag {
    if rng.gen_bool(0.5) {
        stats.score += 20;
        stats.xp += 20;
        EventTag::MonsterSlain
    } else {
        stats.health -= 20;
        stats.xp += 5;
        EventTag::MonsterMauledYou
    }
}

fn resolve_search_alone<R: Rng>(stats: &mut PlayerStats, rng: &mut R) -> EventTag {
    if rng.gen_bool(0.6) {
        stats.score += 25;
        stats.xp += 25;
        EventTag::FoundTreasureAlone
    } else {
        stats.xp += 3;
        EventTag::SearchCameUpEmpty
    }
}

/// Hiring help short-circuits on insufficient score before any payment; once
/// paid, a failed search does not refund the fee.
fn resolve_get_help<R: Rng>(stats: &mut PlayerStats, rng: &mut R) -> EventTag {
    if stats.score < SPEND_COST {
        return EventTag::TooPoorForHelp;
    }
    stats.score -= SPEND_COST;
    if rng.gen_bool(0.8) {
        stats.score += 25;
        stats.xp += 10;
        EventTag::FoundTreasureWithHelp
    } else {
        EventTag::HelpersFailed
    }
}

/// The four victory tiers, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryTier {
    Perfect,
    Glorious,
    Pyrrhic,
    Standard,
}

impl fmt::Display for VictoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VictoryTier::Perfect => "PERFECT VICTORY",
            VictoryTier::Glorious => "GLORIOUS VICTORY",
            VictoryTier::Pyrrhic => "PYRRHIC VICTORY",
            VictoryTier::Standard => "STANDARD VICTORY",
        })
    }
}

impl VictoryTier {
    /// Congratulation line shown when the tier is first achieved.
    pub fn congratulation(&self, player_name: &str) -> String {
        match self {
            VictoryTier::Perfect => format!(
                "Incredible, {}! You've mastered the game with style and grace!",
                player_name
            ),
            VictoryTier::Glorious => {
                format!("Well done, {}! A truly heroic victory!", player_name)
            }
            VictoryTier::Pyrrhic => format!(
                "Against all odds, {}, you've achieved victory at great cost!",
                player_name
            ),
            VictoryTier::Standard => {
                format!("Congratulations, {}! You've mastered the game!", player_name)
            }
        }
    }
}

/// Classify post-update stats into a victory tier, or `None` below the XP
/// threshold. Deterministic; tie-break order is Perfect, Glorious, Pyrrhic,
/// Standard — a run with health 85 but score 10 is Glorious, not Perfect.
pub fn classify_victory(stats: &PlayerStats) -> Option<VictoryTier> {
    if stats.xp < VICTORY_XP {
        return None;
    }
    if stats.health > 80 && stats.score > 50 {
        Some(VictoryTier::Perfect)
    } else if stats.health > 50 {
        Some(VictoryTier::Glorious)
    } else if stats.health <= 20 {
        Some(VictoryTier::Pyrrhic)
    } else {
        Some(VictoryTier::Standard)
    }
}

/// How a finished (or still-notable) game lands on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory(VictoryTier),
    Died,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Victory(tier) => tier.fmt(f),
            Outcome::Died => f.write_str("DIED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Find a seed whose first draws satisfy `pred`; predicates must consume
    /// the RNG in the same order the resolver under test does.
    fn seed_where<F: Fn(&mut StdRng) -> bool>(pred: F) -> u64 {
        for s in 0u64..20_000u64 {
            let mut rng = StdRng::seed_from_u64(s);
            if pred(&mut rng) {
                return s;
            }
        }
        panic!("no seed satisfied predicate within 20k attempts");
    }

    fn stats(health: i32, score: i32, xp: i32) -> PlayerStats {
        PlayerStats { health, score, xp }
    }

    #[test]
    fn trap_costs_health_and_grants_xp() {
        let seed = seed_where(|rng| rng.gen_range(0..3) == 2);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut s = PlayerStats::starting();
        let (stage, tag) = resolve(&mut s, Stage::Exploring, Action::Adventure, &mut rng);
        assert_eq!(tag, EventTag::TrapSprung);
        assert_eq!(stage, Stage::Exploring);
        assert_eq!(s, stats(90, 0, 2));
    }

    #[test]
    fn adventure_surfaces_monster_and_treasure_stages() {
        let monster_seed = seed_where(|rng| rng.gen_range(0..3) == 1);
        let mut rng = StdRng::seed_from_u64(monster_seed);
        let mut s = PlayerStats::starting();
        let (stage, tag) = resolve(&mut s, Stage::Exploring, Action::Adventure, &mut rng);
        assert_eq!((stage, tag), (Stage::MonsterEncounter, EventTag::MonsterAppeared));
        assert_eq!(s, PlayerStats::starting(), "the draw alone must not touch stats");

        let treasure_seed = seed_where(|rng| rng.gen_range(0..3) == 0);
        let mut rng = StdRng::seed_from_u64(treasure_seed);
        let (stage, tag) = resolve(&mut s, Stage::Exploring, Action::Adventure, &mut rng);
        assert_eq!((stage, tag), (Stage::TreasureHunch, EventTag::TreasureRumor));
    }

    #[test]
    fn rest_without_score_never_mutates() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = stats(40, 9, 50);
        let before = s;
        let (stage, tag) = resolve(&mut s, Stage::Exploring, Action::Rest, &mut rng);
        assert_eq!(tag, EventTag::TooPoorToRest);
        assert_eq!(stage, Stage::Exploring);
        assert_eq!(s, before);
    }

    #[test]
    fn rest_heals_twenty_and_charges_ten() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = stats(40, 30, 50);
        let (_, tag) = resolve(&mut s, Stage::Exploring, Action::Rest, &mut rng);
        assert_eq!(tag, EventTag::Rested { gained: 20, cost: 10 });
        assert_eq!(s, stats(60, 20, 50));
    }

    #[test]
    fn rest_clamps_health_and_charges_only_what_healed() {
        let mut rng = StdRng::seed_from_u64(1);
        // 4 below the cap: gain 4, pay 4.
        let mut s = stats(96, 30, 50);
        let (_, tag) = resolve(&mut s, Stage::Exploring, Action::Rest, &mut rng);
        assert_eq!(tag, EventTag::Rested { gained: 4, cost: 4 });
        assert_eq!(s, stats(100, 26, 50));
        // Already full: free no-op rest.
        let (_, tag) = resolve(&mut s, Stage::Exploring, Action::Rest, &mut rng);
        assert_eq!(tag, EventTag::Rested { gained: 0, cost: 0 });
        assert_eq!(s, stats(100, 26, 50));
    }

    #[test]
    fn rest_health_always_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for health in 1..=100 {
            let mut s = stats(health, 100, 0);
            resolve(&mut s, Stage::Exploring, Action::Rest, &mut rng);
            assert!(s.health >= 0 && s.health <= MAX_HEALTH, "health {}", s.health);
            assert!(s.score >= 90, "cost must be bounded by 10, score {}", s.score);
        }
    }

    #[test]
    fn get_help_without_score_short_circuits_before_payment() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = stats(100, 9, 0);
        let before = s;
        let (stage, tag) = resolve(&mut s, Stage::TreasureHunch, Action::GetHelp, &mut rng);
        assert_eq!(tag, EventTag::TooPoorForHelp);
        assert_eq!(stage, Stage::TreasureHunch, "rumor stays live when broke");
        assert_eq!(s, before);
    }

    #[test]
    fn get_help_success_nets_fifteen_score() {
        let seed = seed_where(|rng| rng.gen_bool(0.8));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut s = stats(100, 10, 0);
        let (stage, tag) = resolve(&mut s, Stage::TreasureHunch, Action::GetHelp, &mut rng);
        assert_eq!(tag, EventTag::FoundTreasureWithHelp);
        assert_eq!(stage, Stage::Exploring);
        assert_eq!(s, stats(100, 25, 10));
    }

    #[test]
    fn get_help_failure_keeps_the_fee() {
        let seed = seed_where(|rng| !rng.gen_bool(0.8));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut s = stats(100, 10, 0);
        let (_, tag) = resolve(&mut s, Stage::TreasureHunch, Action::GetHelp, &mut rng);
        assert_eq!(tag, EventTag::HelpersFailed);
        assert_eq!(s, stats(100, 0, 0));
    }

    #[test]
    fn search_alone_failure_grants_consolation_xp() {
        let seed = seed_where(|rng| !rng.gen_bool(0.6));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut s = stats(100, 0, 0);
        let (_, tag) = resolve(&mut s, Stage::TreasureHunch, Action::SearchAlone, &mut rng);
        assert_eq!(tag, EventTag::SearchCameUpEmpty);
        assert_eq!(s, stats(100, 0, 3));
    }

    #[test]
    fn run_and_ignore_change_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = stats(55, 42, 17);
        let before = s;
        let (stage, tag) = resolve(&mut s, Stage::MonsterEncounter, Action::Run, &mut rng);
        assert_eq!((stage, tag), (Stage::Exploring, EventTag::RanAway));
        let (stage, tag) = resolve(&mut s, Stage::TreasureHunch, Action::Ignore, &mut rng);
        assert_eq!((stage, tag), (Stage::Exploring, EventTag::IgnoredTreasure));
        assert_eq!(s, before);
    }

    #[test]
    fn out_of_stage_actions_are_rejected_without_mutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = stats(100, 50, 0);
        let before = s;
        for (stage, action) in [
            (Stage::Exploring, Action::Fight),
            (Stage::Exploring, Action::SearchAlone),
            (Stage::MonsterEncounter, Action::Adventure),
            (Stage::MonsterEncounter, Action::Rest),
            (Stage::TreasureHunch, Action::Fight),
            (Stage::TreasureHunch, Action::Adventure),
        ] {
            let (next, tag) = resolve(&mut s, stage, action, &mut rng);
            assert_eq!(tag, EventTag::InvalidChoice, "{:?}/{:?}", stage, action);
            assert_eq!(next, stage, "stage must not move on invalid input");
            assert_eq!(s, before);
        }
    }

    #[test]
    fn fight_outcomes_split_evenly_over_many_trials() {
        let mut rng = StdRng::seed_from_u64(0xDEC1DE);
        let mut wins = 0u32;
        const TRIALS: u32 = 10_000;
        for _ in 0..TRIALS {
            let mut s = PlayerStats::starting();
            let (_, tag) = resolve(&mut s, Stage::MonsterEncounter, Action::Fight, &mut rng);
            match tag {
                EventTag::MonsterSlain => {
                    wins += 1;
                    assert_eq!(s, stats(100, 20, 20));
                }
                EventTag::MonsterMauledYou => assert_eq!(s, stats(80, 0, 5)),
                other => panic!("unexpected fight tag {:?}", other),
            }
        }
        // ~4 sigma band around 5000 for p=0.5.
        assert!((4800..=5200).contains(&wins), "wins={}", wins);
    }

    #[test]
    fn victory_tiers_follow_tie_break_order() {
        assert_eq!(classify_victory(&stats(90, 60, 200)), Some(VictoryTier::Perfect));
        assert_eq!(classify_victory(&stats(60, 5, 200)), Some(VictoryTier::Glorious));
        assert_eq!(classify_victory(&stats(15, 5, 200)), Some(VictoryTier::Pyrrhic));
        assert_eq!(classify_victory(&stats(30, 5, 200)), Some(VictoryTier::Standard));
        assert_eq!(classify_victory(&stats(90, 60, 199)), None);
        // High health but low score fails Perfect and falls to Glorious.
        assert_eq!(classify_victory(&stats(85, 10, 200)), Some(VictoryTier::Glorious));
    }

    #[test]
    fn action_tokens_round_trip() {
        for action in [
            Action::Adventure,
            Action::Rest,
            Action::Fight,
            Action::Run,
            Action::SearchAlone,
            Action::GetHelp,
            Action::Ignore,
        ] {
            assert_eq!(Action::parse(action.token()), Some(action));
        }
        assert_eq!(Action::parse("  Fight "), Some(Action::Fight));
        assert_eq!(Action::parse("dance"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn shorthand_resolves_per_stage() {
        assert_eq!(Stage::Exploring.parse_choice("r"), Some(Action::Rest));
        assert_eq!(Stage::MonsterEncounter.parse_choice("r"), Some(Action::Run));
        assert_eq!(Stage::MonsterEncounter.parse_choice("F"), Some(Action::Fight));
        assert_eq!(Stage::TreasureHunch.parse_choice("h"), Some(Action::GetHelp));
        assert_eq!(Stage::TreasureHunch.parse_choice("x"), None);
        // Full tokens always parse regardless of stage.
        assert_eq!(Stage::Exploring.parse_choice("fight"), Some(Action::Fight));
    }

    #[test]
    fn stage_choices_hide_help_when_broke() {
        let rich = Stage::TreasureHunch.choices(10);
        assert!(rich.contains(&Action::GetHelp));
        let broke = Stage::TreasureHunch.choices(9);
        assert!(!broke.contains(&Action::GetHelp));
        assert!(broke.contains(&Action::SearchAlone));
    }
}

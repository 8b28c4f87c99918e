//! Factories for sessions, rosters, and event queries.

use crate::combatant::{CombatantId, Side, Stats};
use crate::config::{BattleConfig, CombatantSpec, ControlMode, Stage, TargetPolicy};
use crate::event::{BattleEvent, EventLog};
use crate::roster::Roster;
use crate::session::BattleSession;

// =============================================================================
// Specs and Rosters
// =============================================================================

/// An ally with zero defense.
pub fn ally(name: &str, hp: u32, attack: u32, speed: u32) -> CombatantSpec {
    CombatantSpec::new(name, Side::Ally, Stats::new(hp, attack, 0, speed))
}

/// An enemy with zero defense.
pub fn enemy(name: &str, hp: u32, attack: u32, speed: u32) -> CombatantSpec {
    CombatantSpec::new(name, Side::Enemy, Stats::new(hp, attack, 0, speed))
}

/// Spawns `specs` into a fresh roster.
pub fn roster_of(specs: &[CombatantSpec]) -> Roster {
    let mut roster = Roster::new();
    for spec in specs {
        roster
            .spawn(spec.name.clone(), spec.side, spec.stats)
            .expect("test specs are valid");
    }
    roster
}

// =============================================================================
// Sessions
// =============================================================================

/// Config where both sides are AI-driven.
pub fn auto_config(stage: Stage, policy: TargetPolicy, seed: u64) -> BattleConfig {
    BattleConfig {
        control: ControlMode::Auto,
        target_policy: policy,
        seed,
        ..BattleConfig::for_stage(stage)
    }
}

/// Starts a session with an event log already subscribed.
pub fn started_session(config: BattleConfig) -> (BattleSession, EventLog) {
    let log = EventLog::new();
    let mut session = BattleSession::new(config);
    session.subscribe(log.clone());
    session.start_from_config().expect("config builds a valid roster");
    (session, log)
}

/// Runs a player-controlled session to the end, always attacking the first
/// living opponent.
pub fn play_out(session: &mut BattleSession, max_commands: usize) {
    for _ in 0..max_commands {
        if session.battle_state().is_terminal() {
            return;
        }
        session.perform_attack(None);
    }
}

// =============================================================================
// Event Queries
// =============================================================================

/// Actors in the order their turns started.
pub fn turn_actors(events: &[BattleEvent]) -> Vec<CombatantId> {
    events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::TurnStarted { actor, .. } => Some(*actor),
            _ => None,
        })
        .collect()
}

/// Combatants in the order they were defeated.
pub fn defeated(events: &[BattleEvent]) -> Vec<CombatantId> {
    events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::CombatantDefeated { combatant, .. } => Some(*combatant),
            _ => None,
        })
        .collect()
}

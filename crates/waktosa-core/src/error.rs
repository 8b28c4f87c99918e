//! Error taxonomy for the battle core.
//!
//! Errors are reserved for conditions the caller has to react to: a battle
//! that cannot start, a configuration that cannot be used, or a resolver
//! call that broke its preconditions. Expected battle flow (defeats, empty
//! target lists, input arriving while an action is staged) is modeled with
//! plain values such as [`CommandOutcome`](crate::session::CommandOutcome)
//! and [`BattleState`](crate::scheduler::BattleState).

use thiserror::Error;

use crate::combatant::CombatantId;

/// Top-level error for the battle core.
#[derive(Debug, Error)]
pub enum BattleError {
    /// The battle could not be set up.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// The configuration was malformed or out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An attack was resolved with violated preconditions.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised while preparing a roster or starting a battle.
///
/// These are reported to the caller and never abort the process; the
/// battle simply does not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// `start_battle` was called with no combatants.
    #[error("cannot start a battle with an empty roster")]
    EmptyRoster,
    /// A combatant was declared with unusable stats.
    #[error("combatant `{name}` has invalid stats: {reason}")]
    InvalidStats {
        /// Display name of the offending combatant
        name: String,
        /// Which constraint was violated
        reason: &'static str,
    },
}

/// Errors raised while loading or validating a [`BattleConfig`](crate::config::BattleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse battle config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The base action value must be positive.
    #[error("base action value must be positive")]
    InvalidBaseActionValue,
}

/// Precondition violations reported by the [`AttackResolver`](crate::resolver::AttackResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The referenced combatant is not in the roster.
    #[error("combatant {0} is not in the roster")]
    UnknownCombatant(CombatantId),
    /// The acting combatant is already defeated.
    #[error("acting combatant {0} is defeated")]
    ActorDefeated(CombatantId),
    /// The targeted combatant is already defeated.
    #[error("target {0} is already defeated")]
    TargetDefeated(CombatantId),
}

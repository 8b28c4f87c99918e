//! Action-value turn scheduler.
//!
//! The scheduler owns the speed-driven turn model. Every combatant carries an
//! action value (AV): the amount of simulated time until its next turn. The
//! combatant with the lowest AV acts next.
//!
//! # Cadence
//!
//! - At battle start each combatant gets `round(BASE / speed)`, then all
//!   values are normalized so the earliest actor reads zero.
//! - After acting, the actor's AV is reset to its base and every living
//!   combatant is renormalized by subtracting the new minimum. Subtracting
//!   the minimum is the passage of time.
//!
//! This is not round-robin: a combatant twice as fast as another takes two
//! turns for each of the slower one's.
//!
//! # Ordering
//!
//! Turn order is derived on demand, never stored. Living combatants are
//! sorted by AV ascending, then speed descending, then spawn order, so the
//! order is total and deterministic.
//!
//! # Example
//!
//! ```
//! use waktosa_core::roster::Roster;
//! use waktosa_core::combatant::{Side, Stats};
//! use waktosa_core::scheduler::Scheduler;
//!
//! let mut roster = Roster::new();
//! let fast = roster.spawn("Pawang", Side::Ally, Stats::new(10, 1, 0, 200)).unwrap();
//! let slow = roster.spawn("Iblis", Side::Enemy, Stats::new(10, 1, 0, 100)).unwrap();
//!
//! let scheduler = Scheduler::default();
//! scheduler.initialize(&mut roster);
//!
//! let order: Vec<_> = scheduler.compute_order(&roster).iter().map(|s| s.id).collect();
//! assert_eq!(order, vec![fast, slow]);
//! ```

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::combatant::{Combatant, CombatantId, CombatantSnapshot, Side};
use crate::roster::Roster;

/// Default BASE constant for `round(BASE / speed)`.
pub const DEFAULT_BASE_ACTION_VALUE: u32 = 10_000;

// =============================================================================
// Battle State
// =============================================================================

/// How a battle ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Every enemy was defeated
    AlliesWon,
    /// Every ally was defeated
    EnemiesWon,
    /// Nobody is left standing
    Draw,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlliesWon => write!(f, "Victory! All enemies defeated."),
            Self::EnemiesWon => write!(f, "Game over! The allies were defeated."),
            Self::Draw => write!(f, "Draw: no combatant left standing."),
        }
    }
}

/// Overall battle status.
///
/// `Ended` is terminal: once reached, no further turns are scheduled.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleState {
    /// Turns are still being scheduled
    #[default]
    InProgress,
    /// The battle is over
    Ended(BattleOutcome),
}

impl BattleState {
    /// Returns `true` once the battle has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended(_))
    }

    /// Returns the outcome if the battle has ended.
    #[must_use]
    pub const fn outcome(self) -> Option<BattleOutcome> {
        match self {
            Self::InProgress => None,
            Self::Ended(outcome) => Some(outcome),
        }
    }
}

/// What happens after a turn ends.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnAdvance {
    /// The given combatant acts next
    Next(CombatantId),
    /// The battle is over
    Ended(BattleOutcome),
}

/// Result of [`Scheduler::end_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTransition {
    /// Defeated combatants removed from the roster during this transition
    pub removed: Vec<Combatant>,
    /// The next actor, or the battle outcome
    pub advance: TurnAdvance,
}

// =============================================================================
// Scheduler
// =============================================================================

/// Computes and advances the action-value turn order.
///
/// The scheduler holds only its tuning constant; all scheduling state lives
/// on the combatants in the [`Roster`]. Every method is synchronous and
/// performs no I/O.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scheduler {
    base_action_value: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_ACTION_VALUE)
    }
}

impl Scheduler {
    /// Creates a scheduler with the given BASE constant.
    ///
    /// A zero base is raised to 1.
    #[must_use]
    pub fn new(base_action_value: u32) -> Self {
        Self {
            base_action_value: base_action_value.max(1),
        }
    }

    /// Returns the BASE constant.
    #[must_use]
    pub const fn base_action_value(&self) -> u32 {
        self.base_action_value
    }

    /// Returns `round(BASE / speed)`, never less than 1.
    ///
    /// Rounds half up. A speed of zero is treated as 1.
    #[must_use]
    pub fn base_for_speed(&self, speed: u32) -> u32 {
        let speed = u64::from(speed.max(1));
        let base = u64::from(self.base_action_value);
        let rounded = (base + speed / 2) / speed;
        // rounded <= base, which came from a u32
        u32::try_from(rounded).unwrap_or(u32::MAX).max(1)
    }

    /// Assigns every combatant its base action value, then normalizes.
    pub fn initialize(&self, roster: &mut Roster) {
        for combatant in roster.iter_mut() {
            let base = self.base_for_speed(combatant.speed());
            combatant.set_action_value(base);
        }
        self.normalize(roster, 0);
    }

    /// Returns living combatants in turn order.
    ///
    /// Sorted by action value ascending, speed descending, then spawn order.
    /// Does not mutate anything; safe to call at any time for display.
    #[must_use]
    pub fn compute_order(&self, roster: &Roster) -> Vec<CombatantSnapshot> {
        let mut order: Vec<CombatantSnapshot> = roster.alive().map(Combatant::snapshot).collect();
        order.sort_by_key(|c| (c.action_value, Reverse(c.speed), c.id));
        order
    }

    /// Returns the head of the turn order without mutating anything.
    #[must_use]
    pub fn current_actor(&self, roster: &Roster) -> Option<CombatantId> {
        roster
            .alive()
            .min_by_key(|c| (c.action_value(), Reverse(c.speed()), c.id()))
            .map(Combatant::id)
    }

    /// Shifts living combatants' action values so the minimum reads `baseline`.
    ///
    /// Returns the amount each value moved down by (the old minimum minus
    /// `baseline`, or zero if the minimum was already at or below it).
    /// Calling this twice in a row is the same as calling it once.
    pub fn normalize(&self, roster: &mut Roster, baseline: u32) -> u32 {
        let Some(min) = roster.alive().map(Combatant::action_value).min() else {
            return 0;
        };
        if min == baseline {
            return 0;
        }
        for combatant in roster.alive_mut() {
            let shifted = (combatant.action_value() - min).saturating_add(baseline);
            combatant.set_action_value(shifted);
        }
        debug!(min, baseline, "normalized action values");
        min.saturating_sub(baseline)
    }

    /// Resets `actor` to its base action value and renormalizes.
    ///
    /// Returns `false` without touching anything if the actor is missing or
    /// defeated.
    pub fn advance_after_action(&self, roster: &mut Roster, actor: CombatantId) -> bool {
        let Some(combatant) = roster.get_mut(actor).filter(|c| c.is_alive()) else {
            return false;
        };
        let base = self.base_for_speed(combatant.speed());
        combatant.set_action_value(base);
        debug!(actor = %actor, action_value = base, "action value reset");
        self.normalize(roster, 0);
        true
    }

    /// Evaluates the end-of-battle conditions over living combatants.
    ///
    /// Checked in order:
    /// 1. No living ally while an enemy still stands: [`BattleOutcome::EnemiesWon`]
    /// 2. No living enemy while an ally still stands: [`BattleOutcome::AlliesWon`]
    /// 3. Nobody alive at all: [`BattleOutcome::Draw`]
    #[must_use]
    pub fn check_end(&self, roster: &Roster) -> Option<BattleOutcome> {
        let allies = roster.alive_count(Side::Ally);
        let enemies = roster.alive_count(Side::Enemy);

        if allies == 0 && enemies > 0 {
            return Some(BattleOutcome::EnemiesWon);
        }
        if enemies == 0 && allies > 0 {
            return Some(BattleOutcome::AlliesWon);
        }
        if allies + enemies == 0 {
            return Some(BattleOutcome::Draw);
        }
        None
    }

    /// Selects the next actor, normalizing first if its action value is nonzero.
    pub fn prepare_turn(&self, roster: &mut Roster) -> Option<CombatantId> {
        let next = self.current_actor(roster)?;
        if roster.get(next).is_some_and(|c| c.action_value() != 0) {
            self.normalize(roster, 0);
        }
        Some(next)
    }

    /// Closes the current turn and decides what happens next.
    ///
    /// 1. Removes defeated combatants from the roster
    /// 2. Resets the actor's action value if it survived, otherwise renormalizes
    /// 3. Checks for the end of the battle
    /// 4. Selects the next actor
    ///
    /// Pass `None` as `actor` when no action was taken.
    pub fn end_turn(&self, roster: &mut Roster, actor: Option<CombatantId>) -> TurnTransition {
        let removed = roster.remove_defeated();
        for combatant in &removed {
            debug!(combatant = %combatant.id(), name = combatant.name(), "removed from turn order");
        }

        let advanced = actor.is_some_and(|id| self.advance_after_action(roster, id));
        if !advanced {
            self.normalize(roster, 0);
        }

        if let Some(outcome) = self.check_end(roster) {
            return TurnTransition {
                removed,
                advance: TurnAdvance::Ended(outcome),
            };
        }

        let advance = if let Some(next) = self.prepare_turn(roster) {
            TurnAdvance::Next(next)
        } else {
            // check_end reports a draw for an empty roster, so this is only
            // reachable if the two disagree
            warn!("turn order empty after end of turn; re-evaluating battle end");
            TurnAdvance::Ended(self.check_end(roster).unwrap_or(BattleOutcome::Draw))
        };

        TurnTransition { removed, advance }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Attack resolver for damage and defeat.
//!
//! The `AttackResolver` handles:
//! - Single-target attacks ([`AttackResolver::resolve`])
//! - Area attacks hitting several targets in one step ([`AttackResolver::resolve_area`])
//!
//! # Defeat Handling
//!
//! When a target's hp reaches 0, a `CombatantDefeated` event is recorded.
//! The combatant is not removed here; the scheduler removes defeated
//! combatants when the turn ends.

use tracing::{debug, info};

use crate::combatant::CombatantId;
use crate::error::ResolveError;
use crate::event::BattleEvent;
use crate::roster::Roster;

use super::compute_damage;

/// Report of one attack against one target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Combatant that attacked
    pub attacker: CombatantId,
    /// Combatant that was hit
    pub target: CombatantId,
    /// Damage applied, always at least 1
    pub damage: u32,
    /// Target hp after the hit
    pub remaining_hp: u32,
    /// Whether this hit defeated the target
    pub defeated: bool,
}

/// Resolver for attack actions.
///
/// # Processing Order
///
/// For every hit:
/// 1. Compute `max(1, attack - defense)`
/// 2. Subtract from the target's hp, saturating at 0
/// 3. Record `AttackResolved`
/// 4. Record `CombatantDefeated` if hp reached 0
///
/// # Example
///
/// ```
/// use waktosa_core::resolver::AttackResolver;
/// use waktosa_core::roster::Roster;
/// use waktosa_core::combatant::{Side, Stats};
///
/// let mut roster = Roster::new();
/// let hero = roster.spawn("Pawang", Side::Ally, Stats::new(10, 10, 0, 100)).unwrap();
/// let demon = roster.spawn("Iblis", Side::Enemy, Stats::new(10, 3, 0, 100)).unwrap();
///
/// let mut events = Vec::new();
/// let outcome = AttackResolver::new().resolve(&mut roster, hero, demon, &mut events).unwrap();
///
/// assert!(outcome.defeated);
/// assert_eq!(events.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttackResolver;

impl AttackResolver {
    /// Creates a new attack resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves one attack from `actor` against `target`.
    ///
    /// Events describing the hit are appended to `events` before returning.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::UnknownCombatant`] if either id is not in the roster
    /// - [`ResolveError::ActorDefeated`] if the actor has no hp left
    /// - [`ResolveError::TargetDefeated`] if the target has no hp left
    ///
    /// Nothing is mutated when an error is returned.
    pub fn resolve(
        &self,
        roster: &mut Roster,
        actor: CombatantId,
        target: CombatantId,
        events: &mut Vec<BattleEvent>,
    ) -> Result<AttackOutcome, ResolveError> {
        let attack = Self::actor_attack(roster, actor)?;
        match roster.get(target) {
            None => return Err(ResolveError::UnknownCombatant(target)),
            Some(t) if t.is_defeated() => return Err(ResolveError::TargetDefeated(target)),
            Some(_) => {}
        }
        Self::strike(roster, actor, attack, target, events)
            .ok_or(ResolveError::UnknownCombatant(target))
    }

    /// Resolves one area attack from `actor` against every listed target.
    ///
    /// All hits land in the same step, so both sides can be wiped out
    /// together. Unknown or already-defeated targets are skipped, as are
    /// repeated ids. The actor may be among the targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is unknown or defeated. Nothing is
    /// mutated in that case.
    pub fn resolve_area(
        &self,
        roster: &mut Roster,
        actor: CombatantId,
        targets: &[CombatantId],
        events: &mut Vec<BattleEvent>,
    ) -> Result<Vec<AttackOutcome>, ResolveError> {
        // Read once up front: the actor may fall to its own blast mid-resolution
        let attack = Self::actor_attack(roster, actor)?;

        let mut outcomes: Vec<AttackOutcome> = Vec::with_capacity(targets.len());
        for &target in targets {
            if outcomes.iter().any(|o| o.target == target) {
                continue;
            }
            if !roster.get(target).is_some_and(|t| t.is_alive()) {
                debug!(target = %target, "area attack skipped unavailable target");
                continue;
            }
            if let Some(outcome) = Self::strike(roster, actor, attack, target, events) {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    fn actor_attack(roster: &Roster, actor: CombatantId) -> Result<u32, ResolveError> {
        let combatant = roster
            .get(actor)
            .ok_or(ResolveError::UnknownCombatant(actor))?;
        if combatant.is_defeated() {
            return Err(ResolveError::ActorDefeated(actor));
        }
        Ok(combatant.stats().attack)
    }

    /// Applies one hit to a target known to be alive.
    fn strike(
        roster: &mut Roster,
        actor: CombatantId,
        attack: u32,
        target: CombatantId,
        events: &mut Vec<BattleEvent>,
    ) -> Option<AttackOutcome> {
        let victim = roster.get_mut(target)?;
        let damage = compute_damage(attack, victim.stats().defense);
        let remaining_hp = victim.take_damage(damage);
        let defeated = remaining_hp == 0;

        debug!(
            attacker = %actor,
            target = %target,
            damage,
            remaining_hp,
            max_hp = victim.max_hp(),
            "attack resolved"
        );
        events.push(BattleEvent::AttackResolved {
            attacker: actor,
            target,
            damage,
            remaining_hp,
        });

        if defeated {
            info!(combatant = %target, name = victim.name(), "combatant defeated");
            events.push(BattleEvent::CombatantDefeated {
                combatant: target,
                name: victim.name().to_string(),
                side: victim.side(),
                defeated_by: Some(actor),
            });
        }

        Some(AttackOutcome {
            attacker: actor,
            target,
            damage,
            remaining_hp,
            defeated,
        })
    }
}

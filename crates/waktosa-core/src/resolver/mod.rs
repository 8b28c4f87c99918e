//! Resolver module for attack resolution.
//!
//! Resolvers apply one combat action to the roster and report what
//! happened. They are the only code that changes hit points.
//!
//! # Invariants
//!
//! - Resolution is synchronous and atomic: one call is one hp mutation per
//!   target, with nothing to roll back if the battle is aborted afterwards
//! - Resolvers never advance turns; the caller invokes
//!   [`Scheduler::end_turn`](crate::scheduler::Scheduler::end_turn) afterwards
//! - Notifications are appended to the caller's event buffer before the
//!   call returns, so defeat cleanup never depends on polling
//!
//! # Available Resolvers
//!
//! - [`AttackResolver`]: Flat attack-minus-defense damage, single target or area

mod combat;

pub use combat::{AttackOutcome, AttackResolver};

/// Damage dealt by an attack: `max(1, attack - defense)`.
///
/// An attack is never fully negated, so high defense cannot stall a battle.
///
/// # Example
///
/// ```
/// use waktosa_core::resolver::compute_damage;
///
/// assert_eq!(compute_damage(10, 0), 10);
/// assert_eq!(compute_damage(12, 5), 7);
/// assert_eq!(compute_damage(5, 20), 1);
/// ```
#[must_use]
pub const fn compute_damage(attack: u32, defense: u32) -> u32 {
    let raw = attack.saturating_sub(defense);
    if raw == 0 {
        1
    } else {
        raw
    }
}

//! Roster module for the battle core.
//!
//! The Roster is the container for every combatant in a battle. It provides:
//! - Ordered storage where iteration order is spawn order
//! - Monotonic id assignment
//! - Alive / per-side queries used by the scheduler, resolver, and session
//! - Removal of defeated combatants
//!
//! # Determinism
//!
//! Combatants are stored in a `Vec` in spawn order and ids grow
//! monotonically, so every query iterates in the same order on every run.
//! Targeting fallbacks ("first living opponent") rely on this.
//!
//! # Example
//!
//! ```
//! use waktosa_core::roster::Roster;
//! use waktosa_core::combatant::{Side, Stats};
//!
//! let mut roster = Roster::new();
//! let hero = roster.spawn("Pawang", Side::Ally, Stats::new(100, 12, 5, 110)).unwrap();
//! let demon = roster.spawn("Iblis", Side::Enemy, Stats::new(80, 10, 3, 90)).unwrap();
//!
//! let ids: Vec<_> = roster.iter().map(|c| c.id()).collect();
//! assert_eq!(ids, vec![hero, demon]);
//! assert_eq!(roster.first_alive_opponent(Side::Ally).map(|c| c.id()), Some(demon));
//! ```

use serde::Serialize;

use crate::combatant::{Combatant, CombatantId, CombatantSnapshot, Side, Stats};
use crate::error::SetupError;

/// Ordered collection of battle participants.
///
/// The roster is owned and mutated by the
/// [`BattleSession`](crate::session::BattleSession); external layers only
/// receive shared references or snapshots.
///
/// Every combatant enters through [`spawn`](Self::spawn), so ids are unique
/// and stats are valid. A roster serializes but cannot be deserialized;
/// rebuild one from [`CombatantSpec`](crate::config::CombatantSpec)s instead.
///
/// ```compile_fail
/// use waktosa_core::roster::Roster;
///
/// let forged: Roster = serde_json::from_str(r#"{"next_id":0,"combatants":[]}"#).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    /// Monotonically increasing id counter.
    next_id: u64,
    /// Combatants in spawn order.
    combatants: Vec<Combatant>,
    /// Number of allies ever spawned, including removed ones.
    spawned_allies: usize,
    /// Number of enemies ever spawned, including removed ones.
    spawned_enemies: usize,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a combatant at full health and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidStats`] if the stats fail validation.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        side: Side,
        stats: Stats,
    ) -> Result<CombatantId, SetupError> {
        let name = name.into();
        stats.validate(&name)?;

        let id = CombatantId::new(self.next_id);
        self.next_id += 1;

        match side {
            Side::Ally => self.spawned_allies += 1,
            Side::Enemy => self.spawned_enemies += 1,
        }

        self.combatants.push(Combatant::new(id, name, side, stats));
        Ok(id)
    }

    /// Returns a combatant by id.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id() == id)
    }

    /// Returns `true` if the combatant is still in the roster.
    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over all combatants in spawn order, defeated ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> + '_ {
        self.combatants.iter_mut()
    }

    /// Iterates over living combatants in spawn order.
    pub fn alive(&self) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants.iter().filter(|c| c.is_alive())
    }

    pub(crate) fn alive_mut(&mut self) -> impl Iterator<Item = &mut Combatant> + '_ {
        self.combatants.iter_mut().filter(|c| c.is_alive())
    }

    /// Iterates over living combatants on `side` in spawn order.
    pub fn alive_on(&self, side: Side) -> impl Iterator<Item = &Combatant> + '_ {
        self.alive().filter(move |c| c.side() == side)
    }

    /// Returns the first living combatant opposing `side`, in spawn order.
    #[must_use]
    pub fn first_alive_opponent(&self, side: Side) -> Option<&Combatant> {
        self.alive_on(side.opponent()).next()
    }

    /// Returns snapshots of every living combatant opposing `side`.
    #[must_use]
    pub fn alive_opponents(&self, side: Side) -> Vec<CombatantSnapshot> {
        self.alive_on(side.opponent())
            .map(Combatant::snapshot)
            .collect()
    }

    /// Returns the number of living combatants on `side`.
    #[must_use]
    pub fn alive_count(&self, side: Side) -> usize {
        self.alive_on(side).count()
    }

    /// Returns the number of combatants ever spawned on `side`.
    #[must_use]
    pub const fn spawned_count(&self, side: Side) -> usize {
        match side {
            Side::Ally => self.spawned_allies,
            Side::Enemy => self.spawned_enemies,
        }
    }

    /// Removes defeated combatants and returns them in spawn order.
    pub fn remove_defeated(&mut self) -> Vec<Combatant> {
        let (defeated, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut self.combatants)
            .into_iter()
            .partition(Combatant::is_defeated);
        self.combatants = alive;
        defeated
    }

    /// Returns the number of combatants currently in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Returns `true` if the roster holds no combatants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}

//! Combatant types for the battle core.
//!
//! This module provides the data record for a single battle participant:
//! - [`CombatantId`]: Unique identifier assigned at spawn time
//! - [`Side`]: Faction partition that drives control and targeting
//! - [`Stats`]: Immutable combat statistics
//! - [`Combatant`]: Stats plus mutable battle state (hp, action value)
//! - [`CombatantSnapshot`]: Owned, read-only copy for display layers
//!
//! # Mutation
//!
//! Combatant fields are private. Hit points are only changed by the
//! [`AttackResolver`](crate::resolver::AttackResolver) and action values
//! only by the [`Scheduler`](crate::scheduler::Scheduler); external code
//! reads through accessors or snapshots.
//!
//! # Example
//!
//! ```
//! use waktosa_core::combatant::{Combatant, CombatantId, Side, Stats};
//!
//! let hero = Combatant::new(
//!     CombatantId::new(0),
//!     "Pawang",
//!     Side::Ally,
//!     Stats::new(100, 12, 5, 110),
//! );
//!
//! assert_eq!(hero.current_hp(), 100);
//! assert!(hero.is_alive());
//! assert_eq!(hero.side().opponent(), Side::Enemy);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SetupError;

/// Unique identifier for a combatant.
///
/// Identifiers are assigned in spawn order by the [`Roster`](crate::roster::Roster)
/// and are never reused within a battle. Display names may repeat; ids may not.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates a new `CombatantId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Faction a combatant fights for.
///
/// The side is set once at creation. It decides who is player-controlled,
/// which combatants are valid targets, and how the battle end is evaluated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The village keepers; player-controlled unless the session runs in auto mode
    Ally,
    /// The invading demons; always AI-controlled
    Enemy,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ally => write!(f, "Ally"),
            Self::Enemy => write!(f, "Enemy"),
        }
    }
}

/// Combat statistics fixed at battle setup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Maximum hit points; must be positive
    pub max_hp: u32,
    /// Raw damage before defense is subtracted
    pub attack: u32,
    /// Flat damage reduction applied to incoming attacks
    pub defense: u32,
    /// Drives the base action value; must be positive
    pub speed: u32,
}

impl Stats {
    /// Creates a new stat block.
    #[must_use]
    pub const fn new(max_hp: u32, attack: u32, defense: u32, speed: u32) -> Self {
        Self {
            max_hp,
            attack,
            defense,
            speed,
        }
    }

    /// Checks that the stats can take part in a battle.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidStats`] if `max_hp` or `speed` is zero.
    pub fn validate(&self, name: &str) -> Result<(), SetupError> {
        if self.max_hp == 0 {
            return Err(SetupError::InvalidStats {
                name: name.to_string(),
                reason: "max hp must be positive",
            });
        }
        if self.speed == 0 {
            return Err(SetupError::InvalidStats {
                name: name.to_string(),
                reason: "speed must be positive",
            });
        }
        Ok(())
    }
}

impl Default for Stats {
    /// The stat block of an unconfigured hero.
    fn default() -> Self {
        Self::new(100, 10, 5, 10)
    }
}

/// A single battle participant.
///
/// # Invariants
///
/// - `current_hp` is always within `[0, max_hp]`
/// - A combatant with `current_hp == 0` is defeated and takes no further
///   part in turn order or targeting
///
/// Combatants serialize for replays and display but cannot be deserialized;
/// they are only created through [`Roster::spawn`](crate::roster::Roster::spawn),
/// which validates stats and assigns the id.
///
/// ```compile_fail
/// use waktosa_core::combatant::Combatant;
///
/// let forged: Combatant = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    side: Side,
    stats: Stats,
    current_hp: u32,
    action_value: u32,
}

impl Combatant {
    /// Creates a combatant at full health with an action value of zero.
    ///
    /// The scheduler assigns the real action value when the battle starts.
    #[must_use]
    pub fn new(id: CombatantId, name: impl Into<String>, side: Side, stats: Stats) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            stats,
            current_hp: stats.max_hp,
            action_value: 0,
        }
    }

    /// Returns the combatant's identifier.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the side this combatant fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Returns the stat block.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Returns the current hit points.
    #[must_use]
    pub const fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Returns the maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.stats.max_hp
    }

    /// Returns the speed stat.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.stats.speed
    }

    /// Returns the current action value. Lower acts sooner.
    #[must_use]
    pub const fn action_value(&self) -> u32 {
        self.action_value
    }

    /// Returns `true` while the combatant has hit points left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Returns `true` once hit points reach zero.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    /// Returns an owned copy of the displayable state.
    #[must_use]
    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id,
            name: self.name.clone(),
            side: self.side,
            current_hp: self.current_hp,
            max_hp: self.stats.max_hp,
            speed: self.stats.speed,
            action_value: self.action_value,
        }
    }

    pub(crate) fn set_action_value(&mut self, value: u32) {
        self.action_value = value;
    }

    /// Subtracts `amount` from hit points, saturating at zero.
    ///
    /// Returns the remaining hit points.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp
    }
}

/// Read-only copy of a combatant's state for display layers.
///
/// Snapshots are values: holding one never lets external code mutate the
/// roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Identifier of the combatant
    pub id: CombatantId,
    /// Display name
    pub name: String,
    /// Side the combatant fights for
    pub side: Side,
    /// Hit points at snapshot time
    pub current_hp: u32,
    /// Maximum hit points
    pub max_hp: u32,
    /// Speed stat
    pub speed: u32,
    /// Action value at snapshot time
    pub action_value: u32,
}

impl CombatantSnapshot {
    /// Returns `true` if the combatant was alive when the snapshot was taken.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0
    }
}

//! Battle events and their transport.
//!
//! Every observable change in a battle is described by a [`BattleEvent`].
//! The [`BattleSession`](crate::session::BattleSession) pushes events to
//! subscribed [`BattleListener`]s synchronously, in the order they happen.
//!
//! # Ordering
//!
//! Within one action, `AttackResolved` always precedes the
//! `CombatantDefeated` it caused, and a `CombatantDefeated` is always
//! delivered before the turn ends. Presentation layers can therefore
//! play a defeat animation without polling hit points.
//!
//! # Transports
//!
//! - [`EventLog`]: Cloneable recorder shared behind a mutex
//! - [`std::sync::mpsc::Sender<BattleEvent>`]: Message passing to another thread

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::{CombatantId, Side};
use crate::scheduler::BattleOutcome;

/// Something that happened during a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// The battle started with this many combatants.
    BattleStarted {
        /// Size of the roster at start
        combatants: usize,
    },
    /// A combatant's turn began.
    TurnStarted {
        /// Turn number, starting at 1
        turn: u64,
        /// The acting combatant
        actor: CombatantId,
        /// Display name of the actor
        name: String,
        /// Side of the actor
        side: Side,
        /// Actor's action value when the turn began
        action_value: u32,
    },
    /// An attack hit its target.
    AttackResolved {
        /// Attacking combatant
        attacker: CombatantId,
        /// Combatant that was hit
        target: CombatantId,
        /// Damage applied
        damage: u32,
        /// Target hp after the hit
        remaining_hp: u32,
    },
    /// A combatant's hp reached zero.
    CombatantDefeated {
        /// The defeated combatant
        combatant: CombatantId,
        /// Display name of the defeated combatant
        name: String,
        /// Side of the defeated combatant
        side: Side,
        /// Combatant whose attack landed the final hit
        defeated_by: Option<CombatantId>,
    },
    /// The battle reached a terminal outcome.
    BattleEnded {
        /// Final result
        outcome: BattleOutcome,
    },
    /// The battle was abandoned before either side won.
    BattleAborted,
}

impl BattleEvent {
    /// Returns the combatant this event is mainly about, if any.
    #[must_use]
    pub const fn primary_combatant(&self) -> Option<CombatantId> {
        match self {
            Self::TurnStarted { actor, .. } => Some(*actor),
            Self::AttackResolved { target, .. } => Some(*target),
            Self::CombatantDefeated { combatant, .. } => Some(*combatant),
            Self::BattleStarted { .. } | Self::BattleEnded { .. } | Self::BattleAborted => None,
        }
    }

    /// Returns `true` for events that close the battle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::BattleEnded { .. } | Self::BattleAborted)
    }
}

/// Observer of battle events.
///
/// Listeners are called synchronously from inside the session, so an
/// implementation must not block for long.
pub trait BattleListener: Send {
    /// Called once per event, in emission order.
    fn on_event(&mut self, event: &BattleEvent);
}

impl BattleListener for Sender<BattleEvent> {
    fn on_event(&mut self, event: &BattleEvent) {
        if self.send(event.clone()).is_err() {
            debug!("event receiver dropped");
        }
    }
}

/// Shared, cloneable event recorder.
///
/// Clones share the same log, so one clone can be subscribed to a session
/// while another is kept for reading.
///
/// # Example
///
/// ```
/// use waktosa_core::event::{BattleEvent, BattleListener, EventLog};
///
/// let log = EventLog::new();
/// let mut subscribed = log.clone();
/// subscribed.on_event(&BattleEvent::BattleAborted);
///
/// assert_eq!(log.event_count(), 1);
/// assert_eq!(log.take_events(), vec![BattleEvent::BattleAborted]);
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<BattleEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock still holds a consistent `Vec`, so recover it.
    fn lock(&self) -> MutexGuard<'_, Vec<BattleEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drains and returns all recorded events in order.
    pub fn take_events(&self) -> Vec<BattleEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a copy of the recorded events without draining them.
    #[must_use]
    pub fn events(&self) -> Vec<BattleEvent> {
        self.lock().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl BattleListener for EventLog {
    fn on_event(&mut self, event: &BattleEvent) {
        self.lock().push(event.clone());
    }
}

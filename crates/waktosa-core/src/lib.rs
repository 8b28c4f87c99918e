//! # Waktosa Core
//!
//! Turn-based battle core for Waktosa.
//!
//! This crate runs the battle logic of the game with no engine attached:
//! speed-driven turn scheduling, attack resolution, defeat handling, and
//! victory detection. Presentation layers drive it through a
//! [`BattleSession`](session::BattleSession) and observe it through
//! [`BattleEvent`](event::BattleEvent)s.
//!
//! ## Architecture
//!
//! - **Combatants**: Stat blocks with hp and an action value ([`combatant`])
//! - **Roster**: Ordered container with id assignment ([`roster`])
//! - **Scheduler**: Action-value turn order and end detection ([`scheduler`])
//! - **Resolver**: Damage and defeat ([`resolver`])
//! - **Session**: Turn-flow state machine ([`session`])
//!
//! ## Usage
//!
//! ```
//! use waktosa_core::config::{BattleConfig, Stage};
//! use waktosa_core::session::{BattleSession, SessionPhase};
//!
//! let mut session = BattleSession::new(BattleConfig::for_stage(Stage::Village));
//! session.start_from_config().unwrap();
//!
//! // The fastest keeper acts first and waits for a command.
//! assert_eq!(session.phase(), SessionPhase::WaitingForPlayerAction);
//! let outcome = session.perform_attack(None);
//! assert!(outcome.is_resolved());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod combatant;
pub mod config;
pub mod error;
pub mod event;
pub mod resolver;
pub mod roster;
pub mod scheduler;
pub mod session;

pub use combatant::{Combatant, CombatantId, CombatantSnapshot, Side, Stats};
pub use config::{BattleConfig, CombatantSpec, ControlMode, Stage, TargetPolicy};
pub use error::{BattleError, ConfigError, ResolveError, SetupError};
pub use event::{BattleEvent, BattleListener, EventLog};
pub use resolver::{AttackOutcome, AttackResolver};
pub use roster::Roster;
pub use scheduler::{BattleOutcome, BattleState, Scheduler, TurnAdvance};
pub use session::{BattleSession, CommandOutcome, DropReason, SessionPhase};

#[cfg(test)]
mod tests;

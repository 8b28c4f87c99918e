//! Battle session: the turn-flow state machine.
//!
//! A [`BattleSession`] owns the roster and drives one battle from start to
//! finish. External layers talk to it through a small command surface:
//!
//! - [`start_battle`](BattleSession::start_battle): set up and begin
//! - [`perform_attack`](BattleSession::perform_attack): player input
//! - [`perform_area_attack`](BattleSession::perform_area_attack): one blast at many targets
//! - [`end_turn`](BattleSession::end_turn): hand control back after staging
//! - [`abort`](BattleSession::abort): leave without a result
//!
//! plus read-only queries for presentation.
//!
//! # Phases
//!
//! ```text
//! NotStarted -> AwaitingTurnStart -> WaitingForPlayerAction -> ActionInProgress
//!                    ^         \_______(AI actor)________________/     |
//!                    |                                                  v
//!                    +-------------------- TurnResolved <---------------+
//!                                              |
//!                                              v
//!                                         BattleEnded
//! ```
//!
//! # Re-entrancy
//!
//! While an action is in progress, further attack commands are dropped, so
//! repeated input can never resolve two actions in one turn. Consecutive AI
//! turns run in an iterative loop rather than through recursion, so a long
//! chain of enemy turns uses constant stack.
//!
//! # Example
//!
//! ```
//! use waktosa_core::config::{BattleConfig, ControlMode};
//! use waktosa_core::session::BattleSession;
//!
//! let config = BattleConfig {
//!     control: ControlMode::Auto,
//!     ..BattleConfig::default()
//! };
//! let mut session = BattleSession::new(config);
//! session.start_from_config().unwrap();
//!
//! assert!(session.battle_state().is_terminal());
//! ```

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::combatant::{Combatant, CombatantId, CombatantSnapshot, Side};
use crate::config::{BattleConfig, TargetPolicy};
use crate::error::{BattleError, SetupError};
use crate::event::{BattleEvent, BattleListener};
use crate::resolver::{AttackOutcome, AttackResolver};
use crate::roster::Roster;
use crate::scheduler::{BattleOutcome, BattleState, Scheduler, TurnAdvance};

// =============================================================================
// Phases and Command Outcomes
// =============================================================================

/// Where the session is in the turn flow.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No battle has been started
    #[default]
    NotStarted,
    /// The next turn is about to begin
    AwaitingTurnStart,
    /// A player-controlled ally is waiting for a command
    WaitingForPlayerAction,
    /// An action has resolved and the presentation layer is staging it
    ActionInProgress,
    /// The turn closed; the next one has not begun yet
    TurnResolved,
    /// The battle is over, by outcome or by abort
    BattleEnded,
}

/// Why a command had no effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Another action is still being staged
    ActionInProgress,
    /// The current actor is not waiting for player input
    NotPlayerTurn,
    /// The battle is over
    BattleEnded,
    /// The actor has nobody left to attack
    NoLivingOpponent,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionInProgress => write!(f, "an action is already in progress"),
            Self::NotPlayerTurn => write!(f, "it is not a player turn"),
            Self::BattleEnded => write!(f, "the battle has ended"),
            Self::NoLivingOpponent => write!(f, "no living opponent to target"),
        }
    }
}

/// Result of a player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The attack was resolved
    Resolved(AttackOutcome),
    /// The area attack was resolved, one report per target hit
    AreaResolved(Vec<AttackOutcome>),
    /// The command was ignored
    Dropped(DropReason),
}

impl CommandOutcome {
    /// Returns `true` if the command took effect.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::AreaResolved(_))
    }
}

// =============================================================================
// BattleSession
// =============================================================================

/// Owns one battle and sequences its turns.
///
/// All mutation goes through the session's commands, and everything runs
/// synchronously on the caller's thread. Listeners receive events in the
/// order they happen; the full history is also kept on the session.
pub struct BattleSession {
    config: BattleConfig,
    scheduler: Scheduler,
    resolver: AttackResolver,
    roster: Roster,
    phase: SessionPhase,
    state: BattleState,
    current_actor: Option<CombatantId>,
    /// Blocks attack commands while an action is being staged.
    action_in_progress: bool,
    /// Hold placed by the presentation layer; only it clears this.
    external_hold: bool,
    turn: u64,
    rng: ChaCha8Rng,
    listeners: Vec<Box<dyn BattleListener>>,
    history: Vec<BattleEvent>,
}

impl fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleSession")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("current_actor", &self.current_actor)
            .field("action_in_progress", &self.action_in_progress)
            .field("external_hold", &self.external_hold)
            .field("turn", &self.turn)
            .field("roster", &self.roster)
            .field("listeners", &format!("[{} listeners]", self.listeners.len()))
            .field("history", &format!("[{} events]", self.history.len()))
            .finish_non_exhaustive()
    }
}

impl BattleSession {
    /// Creates an idle session.
    ///
    /// Nothing happens until [`start_battle`](Self::start_battle) or
    /// [`start_from_config`](Self::start_from_config) is called.
    #[must_use]
    pub fn new(config: BattleConfig) -> Self {
        let scheduler = Scheduler::new(config.base_action_value);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            scheduler,
            resolver: AttackResolver::new(),
            roster: Roster::new(),
            phase: SessionPhase::NotStarted,
            state: BattleState::InProgress,
            current_actor: None,
            action_in_progress: false,
            external_hold: false,
            turn: 0,
            rng,
            listeners: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Registers a listener for all future events.
    pub fn subscribe(&mut self, listener: impl BattleListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Builds the configured roster and starts the battle.
    ///
    /// # Errors
    ///
    /// Returns an error if a combatant has invalid stats or the roster is
    /// empty. The session is left unchanged in that case.
    pub fn start_from_config(&mut self) -> Result<(), BattleError> {
        let roster = self.config.build_roster()?;
        self.start_battle(roster)?;
        Ok(())
    }

    /// Starts a battle with `roster`.
    ///
    /// Action values are initialized and turns run until a player action is
    /// needed, an action awaits [`end_turn`](Self::end_turn), or the battle
    /// ends. Calling this again restarts from turn 1 with the new roster.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptyRoster`] if `roster` has no combatants.
    /// The session is left unchanged in that case.
    pub fn start_battle(&mut self, mut roster: Roster) -> Result<(), SetupError> {
        if roster.is_empty() {
            warn!("refusing to start a battle with an empty roster");
            return Err(SetupError::EmptyRoster);
        }

        self.scheduler.initialize(&mut roster);
        self.roster = roster;
        self.state = BattleState::InProgress;
        self.current_actor = None;
        self.action_in_progress = false;
        self.external_hold = false;
        self.turn = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.history.clear();

        info!(
            combatants = self.roster.len(),
            allies = self.roster.alive_count(Side::Ally),
            enemies = self.roster.alive_count(Side::Enemy),
            "battle started"
        );
        self.emit(BattleEvent::BattleStarted {
            combatants: self.roster.len(),
        });

        if let Some(outcome) = self.scheduler.check_end(&self.roster) {
            self.finish(outcome);
            return Ok(());
        }

        self.phase = SessionPhase::AwaitingTurnStart;
        self.drive();
        Ok(())
    }

    /// Performs the current player's attack.
    ///
    /// A missing, unknown, defeated, or same-side target falls back to the
    /// first living opponent in spawn order.
    pub fn perform_attack(&mut self, target: Option<CombatantId>) -> CommandOutcome {
        let (actor, side) = match self.player_actor() {
            Ok(actor) => actor,
            Err(reason) => return CommandOutcome::Dropped(reason),
        };

        let Some(target) = self.retarget(side, target) else {
            return CommandOutcome::Dropped(DropReason::NoLivingOpponent);
        };

        self.phase = SessionPhase::ActionInProgress;
        self.action_in_progress = true;
        let outcome = self.strike(actor, target);
        self.after_action();

        match outcome {
            Some(outcome) => CommandOutcome::Resolved(outcome),
            None => CommandOutcome::Dropped(DropReason::NoLivingOpponent),
        }
    }

    /// Performs the current player's area attack against every listed target.
    ///
    /// All hits land in one resolution step, so both sides can fall together
    /// and the battle can end in a draw. Unknown and defeated ids are
    /// skipped; the actor and its allies may be listed.
    pub fn perform_area_attack(&mut self, targets: &[CombatantId]) -> CommandOutcome {
        let actor = match self.player_actor() {
            Ok((actor, _)) => actor,
            Err(reason) => return CommandOutcome::Dropped(reason),
        };
        let any_living = targets
            .iter()
            .any(|&id| self.roster.get(id).is_some_and(Combatant::is_alive));
        if !any_living {
            return CommandOutcome::Dropped(DropReason::NoLivingOpponent);
        }

        self.phase = SessionPhase::ActionInProgress;
        self.action_in_progress = true;
        let mut events = Vec::new();
        let result = self
            .resolver
            .resolve_area(&mut self.roster, actor, targets, &mut events);
        for event in events {
            self.emit(event);
        }
        self.after_action();

        match result {
            Ok(outcomes) => CommandOutcome::AreaResolved(outcomes),
            Err(err) => {
                warn!(error = %err, "area attack could not be resolved");
                CommandOutcome::Dropped(DropReason::NoLivingOpponent)
            }
        }
    }

    /// Closes the staged action's turn and continues the battle.
    ///
    /// Only needed when `auto_advance` is off. Returns `false` if no action
    /// is being staged.
    pub fn end_turn(&mut self) -> bool {
        if self.phase != SessionPhase::ActionInProgress {
            debug!(phase = ?self.phase, "end_turn ignored outside of an action");
            return false;
        }
        self.close_turn();
        self.drive();
        true
    }

    /// Places or releases an external hold on the in-progress gate.
    ///
    /// Presentation layers hold the gate while an animation plays and
    /// release it when done. The hold is separate from the gate the session
    /// sets around its own actions, so it survives turn transitions and AI
    /// turns until released here or the battle is restarted.
    pub fn set_action_in_progress(&mut self, in_progress: bool) {
        self.external_hold = in_progress;
    }

    /// Abandons the battle without an outcome.
    ///
    /// The phase moves to [`SessionPhase::BattleEnded`] while the battle
    /// state stays [`BattleState::InProgress`]. Does nothing if the battle
    /// already ended or never started.
    pub fn abort(&mut self) {
        if matches!(self.phase, SessionPhase::BattleEnded | SessionPhase::NotStarted) {
            return;
        }
        info!(turn = self.turn, "battle aborted");
        self.phase = SessionPhase::BattleEnded;
        self.current_actor = None;
        self.action_in_progress = false;
        self.emit(BattleEvent::BattleAborted);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns the combatant whose turn it is.
    #[must_use]
    pub fn current_actor(&self) -> Option<CombatantSnapshot> {
        self.current_actor
            .and_then(|id| self.roster.get(id))
            .map(Combatant::snapshot)
    }

    /// Returns living combatants in upcoming turn order.
    #[must_use]
    pub fn turn_order_snapshot(&self) -> Vec<CombatantSnapshot> {
        self.scheduler.compute_order(&self.roster)
    }

    /// Returns living combatants opposing `side`, in spawn order.
    #[must_use]
    pub fn alive_opponents(&self, side: Side) -> Vec<CombatantSnapshot> {
        self.roster.alive_opponents(side)
    }

    /// Returns the roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns the battle state.
    #[must_use]
    pub const fn battle_state(&self) -> BattleState {
        self.state
    }

    /// Returns the number of the current turn, starting at 1.
    #[must_use]
    pub const fn turn_number(&self) -> u64 {
        self.turn
    }

    /// Returns `true` while attack commands are blocked.
    #[must_use]
    pub const fn is_action_in_progress(&self) -> bool {
        self.action_in_progress || self.external_hold
    }

    /// Returns every event emitted since the battle started.
    #[must_use]
    pub fn history(&self) -> &[BattleEvent] {
        &self.history
    }

    // -------------------------------------------------------------------------
    // Turn flow
    // -------------------------------------------------------------------------

    /// Runs turns until one needs outside input or the battle ends.
    fn drive(&mut self) {
        while self.phase == SessionPhase::AwaitingTurnStart {
            self.begin_turn();
        }
    }

    fn begin_turn(&mut self) {
        let next = self
            .scheduler
            .prepare_turn(&mut self.roster)
            .and_then(|id| self.roster.get(id))
            .map(Combatant::snapshot);
        let Some(snapshot) = next else {
            warn!("no combatant can act; re-evaluating battle end");
            let outcome = self
                .scheduler
                .check_end(&self.roster)
                .unwrap_or(BattleOutcome::Draw);
            self.finish(outcome);
            return;
        };
        let actor = snapshot.id;

        self.turn += 1;
        self.current_actor = Some(actor);
        info!(
            turn = self.turn,
            actor = %actor,
            name = %snapshot.name,
            side = %snapshot.side,
            "turn started"
        );
        self.emit(BattleEvent::TurnStarted {
            turn: self.turn,
            actor,
            name: snapshot.name,
            side: snapshot.side,
            action_value: snapshot.action_value,
        });

        if self.config.is_player_controlled(snapshot.side) {
            self.phase = SessionPhase::WaitingForPlayerAction;
            return;
        }

        self.phase = SessionPhase::ActionInProgress;
        self.action_in_progress = true;
        match self.select_ai_target(snapshot.side) {
            Some(target) => {
                self.strike(actor, target);
            }
            None => debug!(actor = %actor, "no target available; turn passes"),
        }
        self.after_action();
    }

    /// Ends the turn now, or leaves it staged for [`end_turn`](Self::end_turn).
    fn after_action(&mut self) {
        if self.config.auto_advance {
            self.close_turn();
            self.drive();
        }
    }

    fn close_turn(&mut self) {
        let transition = self.scheduler.end_turn(&mut self.roster, self.current_actor);
        self.phase = SessionPhase::TurnResolved;
        self.action_in_progress = false;

        match transition.advance {
            TurnAdvance::Next(next) => {
                debug!(next = %next, removed = transition.removed.len(), "turn resolved");
                self.phase = SessionPhase::AwaitingTurnStart;
            }
            TurnAdvance::Ended(outcome) => self.finish(outcome),
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        info!(outcome = %outcome, turns = self.turn, "battle ended");
        self.state = BattleState::Ended(outcome);
        self.phase = SessionPhase::BattleEnded;
        self.current_actor = None;
        self.action_in_progress = false;
        self.emit(BattleEvent::BattleEnded { outcome });
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Checks that a player command may run now and returns its actor.
    fn player_actor(&self) -> Result<(CombatantId, Side), DropReason> {
        if self.phase == SessionPhase::BattleEnded || self.state.is_terminal() {
            return Err(DropReason::BattleEnded);
        }
        if self.is_action_in_progress() {
            warn!("command dropped: an action is already in progress");
            return Err(DropReason::ActionInProgress);
        }
        if self.phase != SessionPhase::WaitingForPlayerAction {
            return Err(DropReason::NotPlayerTurn);
        }
        self.current_actor
            .and_then(|id| self.roster.get(id))
            .map(|c| (c.id(), c.side()))
            .ok_or(DropReason::NotPlayerTurn)
    }

    /// Keeps `requested` if it is a living opponent, else falls back.
    fn retarget(&self, side: Side, requested: Option<CombatantId>) -> Option<CombatantId> {
        if let Some(id) = requested {
            let valid = self
                .roster
                .get(id)
                .is_some_and(|c| c.is_alive() && c.side() != side);
            if valid {
                return Some(id);
            }
            warn!(requested = %id, "invalid target; falling back to first living opponent");
        }
        self.roster.first_alive_opponent(side).map(Combatant::id)
    }

    fn select_ai_target(&mut self, side: Side) -> Option<CombatantId> {
        match self.config.target_policy {
            TargetPolicy::FirstLiving => self.roster.first_alive_opponent(side).map(Combatant::id),
            TargetPolicy::Random => {
                let candidates: Vec<CombatantId> = self
                    .roster
                    .alive_on(side.opponent())
                    .map(Combatant::id)
                    .collect();
                if candidates.is_empty() {
                    return None;
                }
                Some(candidates[self.rng.gen_range(0..candidates.len())])
            }
        }
    }

    fn strike(&mut self, actor: CombatantId, target: CombatantId) -> Option<AttackOutcome> {
        let mut events = Vec::new();
        let result = self
            .resolver
            .resolve(&mut self.roster, actor, target, &mut events);
        for event in events {
            self.emit(event);
        }
        match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(error = %err, "attack could not be resolved");
                None
            }
        }
    }

    fn emit(&mut self, event: BattleEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
        self.history.push(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

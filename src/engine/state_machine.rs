use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

/// Coarse lifecycle states a game moves through.
///
/// The order is strictly forward: `Initial -> Starting -> Playing -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Game created; roster and settings can still be changed.
    Initial,
    /// Settings are frozen while the start sequence runs outside the engine.
    Starting,
    /// Cycles are running and challenges can be completed.
    Playing,
    /// Game is over; the cycle timer has been cancelled.
    Ended,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Freeze settings before the start sequence completes.
    EnterStarting,
    /// Begin cycling challenges.
    Start,
    /// Stop the game for good.
    End,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The state the machine was in when the invalid event was received.
    pub from: GameState,
    /// The event that cannot be applied from this state.
    pub event: GameEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    #[error("state transition already pending")]
    AlreadyPending,
    /// The requested transition is not valid from the current state.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// No transition is currently pending.
    #[error("no transition is pending")]
    NoPending,
    /// Plan ID does not match the pending plan.
    #[error("pending transition does not match (expected {expected}, got {got})")]
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// State changed since the plan was created.
    #[error("state changed during transition (expected {expected:?}, got {actual:?})")]
    StateMismatch {
        /// State when plan was created.
        expected: GameState,
        /// Current state.
        actual: GameState,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortError {
    #[error("no pending transition")]
    NoPending,
    #[error("transition plan does not match (expected {expected}, got {got})")]
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A planned transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: PlanId,
    pub from: GameState,
    pub to: GameState,
    pub event: GameEvent,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub state: GameState,
    /// Number of transitions applied so far.
    pub version: usize,
    /// Target state of a planned but not yet applied transition.
    pub pending: Option<GameState>,
}

/// Lifecycle guard of a single game.
///
/// Side-effecting transitions are split into `plan` and `apply` so the caller
/// can run the associated work in between and `abort` if it fails, without
/// ever exposing a state whose side effects did not happen.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    state: GameState,
    version: usize,
    pending: Option<Plan>,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            state: GameState::Initial,
            version: 0,
            pending: None,
        }
    }
}

impl GameStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Whether the game has left [`GameState::Initial`].
    pub fn has_started(&self) -> bool {
        self.state != GameState::Initial
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Whether the game can currently be ended.
    pub fn is_active(&self) -> bool {
        matches!(self.state, GameState::Playing)
    }

    pub fn has_ended(&self) -> bool {
        self.state == GameState::Ended
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Validate that `event` can be applied from the current state and reserve the transition.
    pub fn plan(&mut self, event: GameEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self.compute_transition(event)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.state,
            to: next,
            event,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition and return the new state.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<GameState, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected,
                got: plan_id,
            });
        }

        if self.state != plan.from {
            return Err(ApplyError::StateMismatch {
                expected: plan.from,
                actual: self.state,
            });
        }

        self.state = plan.to;
        self.version += 1;

        Ok(self.state)
    }

    /// Drop a planned transition, leaving the current state untouched.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    fn compute_transition(&self, event: GameEvent) -> Result<GameState, InvalidTransition> {
        let next = match (self.state, event) {
            (GameState::Initial, GameEvent::EnterStarting) => GameState::Starting,
            (GameState::Initial | GameState::Starting, GameEvent::Start) => GameState::Playing,
            (GameState::Playing, GameEvent::End) => GameState::Ended,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

use std::{future::Future, sync::Arc};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, info_span, warn};

use crate::engine::{
    challenge::{ChallengeGenerator, ChallengeSet},
    cycle::{Completion, CycleError, CycleId, CycleManager, CycleSnapshot},
    notifier::CycleNotifier,
    settings::{Settings, SettingsError},
    state_machine::{
        ApplyError, GameEvent, GameState, GameStateMachine, InvalidTransition, Plan, PlanError,
        Snapshot,
    },
    timer::CycleTimer,
};

/// Errors surfaced by [`SnakeGame`] operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("state transition already pending")]
    TransitionPending,
    #[error("failed to apply transition: {0}")]
    Apply(#[from] ApplyError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Settings cannot change once the game has left its initial state.
    #[error("cannot change settings while the game is {state:?}")]
    SettingsFrozen { state: GameState },
}

impl From<PlanError> for GameError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::AlreadyPending => GameError::TransitionPending,
            PlanError::InvalidTransition(invalid) => GameError::InvalidTransition(invalid),
        }
    }
}

/// Challenge cycle engine of one game.
///
/// Composes the lifecycle state machine, the cycle window and the cycle
/// timer. Lifecycle transitions serialize on `transition_gate`; cycle reads
/// and arbitration go through the [`CycleManager`] lock only, so completion
/// attempts never wait on a lifecycle change in progress.
pub struct SnakeGame {
    settings: RwLock<Settings>,
    machine: RwLock<GameStateMachine>,
    transition_gate: Mutex<()>,
    cycles: Arc<CycleManager>,
    timer: Mutex<Option<CycleTimer>>,
    notifier: Arc<dyn CycleNotifier>,
}

impl SnakeGame {
    pub fn new(
        settings: Settings,
        generator: Arc<dyn ChallengeGenerator>,
        notifier: Arc<dyn CycleNotifier>,
    ) -> Self {
        Self {
            settings: RwLock::new(settings),
            machine: RwLock::new(GameStateMachine::new()),
            transition_gate: Mutex::new(()),
            cycles: Arc::new(CycleManager::new(generator)),
            timer: Mutex::new(None),
            notifier,
        }
    }

    pub async fn state(&self) -> GameState {
        self.machine.read().await.state()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.machine.read().await.snapshot()
    }

    pub async fn has_started(&self) -> bool {
        self.machine.read().await.has_started()
    }

    pub async fn is_playing(&self) -> bool {
        self.machine.read().await.is_playing()
    }

    pub async fn is_active(&self) -> bool {
        self.machine.read().await.is_active()
    }

    pub async fn has_ended(&self) -> bool {
        self.machine.read().await.has_ended()
    }

    pub async fn settings(&self) -> Settings {
        *self.settings.read().await
    }

    /// Replace the settings. Only allowed before the game has started.
    pub async fn update_settings(&self, settings: Settings) -> Result<(), GameError> {
        let _gate = self.transition_gate.lock().await;
        let state = self.state().await;
        if state != GameState::Initial {
            return Err(GameError::SettingsFrozen { state });
        }
        settings.validate()?;
        *self.settings.write().await = settings;
        Ok(())
    }

    /// Freeze settings while the caller runs its own start sequence.
    pub async fn enter_starting(&self) -> Result<(), GameError> {
        self.run_transition(GameEvent::EnterStarting, || async { Ok(()) })
            .await
    }

    /// Generate the first two challenge sets and start the cycle timer.
    ///
    /// Returns the challenges of cycle 0.
    pub async fn start_game(&self) -> Result<Arc<ChallengeSet>, GameError> {
        self.run_transition(GameEvent::Start, move || async move {
            let settings = self.settings().await;
            self.cycles.initialize(settings.num_challenges).await?;
            let current = self.cycles.current_set().await?;

            let timer = CycleTimer::spawn(
                &settings,
                self.cycles.clone(),
                self.notifier.clone(),
                info_span!("cycle_timer"),
            );
            *self.timer.lock().await = Some(timer);

            Ok(current)
        })
        .await
    }

    /// Stop the cycle timer. Only legal while playing.
    pub async fn end_game(&self) -> Result<(), GameError> {
        self.run_transition(GameEvent::End, move || async move {
            let timer = self.timer.lock().await.take();
            if let Some(timer) = timer {
                timer.cancel().await;
            }
            Ok(())
        })
        .await
    }

    /// Claim challenge `challenge_id` of cycle `cycle_id` for the caller.
    pub async fn complete_challenge(
        &self,
        challenge_id: usize,
        cycle_id: CycleId,
    ) -> Result<Completion, GameError> {
        Ok(self.cycles.try_complete(challenge_id, cycle_id).await?)
    }

    pub async fn current_challenges(&self) -> Result<Arc<ChallengeSet>, GameError> {
        Ok(self.cycles.current_set().await?)
    }

    pub async fn next_challenges(&self) -> Result<Arc<ChallengeSet>, GameError> {
        Ok(self.cycles.next_set().await?)
    }

    pub async fn cycle_id(&self) -> Result<CycleId, GameError> {
        Ok(self.cycles.cycle_id().await?)
    }

    /// Cycle id, completion flag and both sets read atomically.
    pub async fn cycle_snapshot(&self) -> Result<CycleSnapshot, GameError> {
        Ok(self.cycles.snapshot().await?)
    }

    /// Plan `event`, run `work`, then apply the transition or abort it if `work` failed.
    async fn run_transition<F, Fut, T>(&self, event: GameEvent, work: F) -> Result<T, GameError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GameError>>,
    {
        let _gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.machine.write().await.plan(event)?;

        match work().await {
            Ok(value) => {
                let next = self.machine.write().await.apply(plan_id)?;
                info!(?event, state = ?next, "game state transition applied");
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = self.machine.write().await.abort(plan_id) {
                    warn!(
                        ?event,
                        %plan_id,
                        error = %abort_err,
                        "failed to abort transition after work error"
                    );
                }
                Err(err)
            }
        }
    }
}

//! Sliding window of challenge sets and the per-cycle completion arbitration.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::engine::challenge::{Challenge, ChallengeGenerator, ChallengeSet};

/// Monotonic identifier of a cycle, starting at 0.
pub type CycleId = u64;

/// Reasons a cycle operation is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// The caller referenced a cycle that is no longer current.
    #[error("cannot complete a challenge from an expired cycle (got {expected}, current {current})")]
    ExpiredCycle { expected: CycleId, current: CycleId },
    /// Another team already won the current cycle.
    #[error("a challenge has already been completed in cycle {cycle_id}")]
    AlreadyCompleted { cycle_id: CycleId },
    /// The challenge index is outside the current set.
    #[error("invalid challenge id {challenge_id} (cycle has {count} challenges)")]
    InvalidChallengeId { challenge_id: usize, count: usize },
    #[error("challenge cycles have not been initialized")]
    NotInitialized,
    #[error("challenge cycles are already initialized")]
    AlreadyInitialized,
}

/// Window of exactly two sets: the active cycle and the pre-generated next one.
#[derive(Debug, Clone)]
pub struct CycleWindow {
    current: Arc<ChallengeSet>,
    next: Arc<ChallengeSet>,
}

impl CycleWindow {
    fn new(current: ChallengeSet, next: ChallengeSet) -> Self {
        Self {
            current: Arc::new(current),
            next: Arc::new(next),
        }
    }

    /// Drop the current set, promote the next one and install `fresh` as next.
    fn slide(&mut self, fresh: ChallengeSet) {
        self.current = std::mem::replace(&mut self.next, Arc::new(fresh));
    }

    pub fn current(&self) -> &Arc<ChallengeSet> {
        &self.current
    }

    pub fn next(&self) -> &Arc<ChallengeSet> {
        &self.next
    }
}

/// Winning claim returned by [`CycleManager::try_complete`].
#[derive(Debug, Clone)]
pub struct Completion {
    pub cycle_id: CycleId,
    pub challenge_id: usize,
    /// The challenge that was claimed from the current set.
    pub challenge: Challenge,
    /// Upcoming set, revealed early to the frozen teams.
    pub next: Arc<ChallengeSet>,
}

/// Consistent view of the cycle state taken under a single lock acquisition.
#[derive(Debug, Clone)]
pub struct CycleSnapshot {
    pub cycle_id: CycleId,
    pub completed: bool,
    pub current: Arc<ChallengeSet>,
    pub next: Arc<ChallengeSet>,
}

#[derive(Debug)]
struct CycleState {
    window: CycleWindow,
    cycle_id: CycleId,
    completed: bool,
    num_challenges: usize,
}

/// Sole owner of the cycle window, cycle id and completion flag.
///
/// Every read and mutation happens under one mutex, so no caller can observe
/// a new cycle id paired with an old set, and `shift` never interleaves with
/// `try_complete`.
pub struct CycleManager {
    generator: Arc<dyn ChallengeGenerator>,
    inner: Mutex<Option<CycleState>>,
}

impl CycleManager {
    pub fn new(generator: Arc<dyn ChallengeGenerator>) -> Self {
        Self {
            generator,
            inner: Mutex::new(None),
        }
    }

    /// Generate the first two sets. Must be called exactly once, before any other operation.
    pub async fn initialize(&self, num_challenges: usize) -> Result<(), CycleError> {
        let mut guard = self.inner.lock().await;
        if guard.is_some() {
            return Err(CycleError::AlreadyInitialized);
        }

        let current = self.generator.generate(num_challenges);
        let next = self.generator.generate(num_challenges);
        *guard = Some(CycleState {
            window: CycleWindow::new(current, next),
            cycle_id: 0,
            completed: false,
            num_challenges,
        });
        Ok(())
    }

    pub async fn current_set(&self) -> Result<Arc<ChallengeSet>, CycleError> {
        let guard = self.inner.lock().await;
        let state = guard.as_ref().ok_or(CycleError::NotInitialized)?;
        Ok(state.window.current().clone())
    }

    pub async fn next_set(&self) -> Result<Arc<ChallengeSet>, CycleError> {
        let guard = self.inner.lock().await;
        let state = guard.as_ref().ok_or(CycleError::NotInitialized)?;
        Ok(state.window.next().clone())
    }

    pub async fn cycle_id(&self) -> Result<CycleId, CycleError> {
        let guard = self.inner.lock().await;
        let state = guard.as_ref().ok_or(CycleError::NotInitialized)?;
        Ok(state.cycle_id)
    }

    pub async fn snapshot(&self) -> Result<CycleSnapshot, CycleError> {
        let guard = self.inner.lock().await;
        let state = guard.as_ref().ok_or(CycleError::NotInitialized)?;
        Ok(CycleSnapshot {
            cycle_id: state.cycle_id,
            completed: state.completed,
            current: state.window.current().clone(),
            next: state.window.next().clone(),
        })
    }

    /// Rotate the window, advance the cycle id and reset the completion flag.
    ///
    /// Returns the id of the cycle that is now current.
    pub async fn shift(&self) -> Result<CycleId, CycleError> {
        let mut guard = self.inner.lock().await;
        let state = guard.as_mut().ok_or(CycleError::NotInitialized)?;

        let fresh = self.generator.generate(state.num_challenges);
        state.window.slide(fresh);
        state.cycle_id += 1;
        state.completed = false;

        Ok(state.cycle_id)
    }

    /// Claim challenge `challenge_id` of cycle `expected_cycle_id`.
    ///
    /// At most one call succeeds per cycle; the check-and-set is indivisible.
    pub async fn try_complete(
        &self,
        challenge_id: usize,
        expected_cycle_id: CycleId,
    ) -> Result<Completion, CycleError> {
        let mut guard = self.inner.lock().await;
        let state = guard.as_mut().ok_or(CycleError::NotInitialized)?;

        if expected_cycle_id != state.cycle_id {
            return Err(CycleError::ExpiredCycle {
                expected: expected_cycle_id,
                current: state.cycle_id,
            });
        }
        if state.completed {
            return Err(CycleError::AlreadyCompleted {
                cycle_id: state.cycle_id,
            });
        }
        let Some(challenge) = state.window.current().get(challenge_id).cloned() else {
            return Err(CycleError::InvalidChallengeId {
                challenge_id,
                count: state.num_challenges,
            });
        };

        state.completed = true;
        debug!(cycle_id = state.cycle_id, challenge_id, "challenge completed");

        Ok(Completion {
            cycle_id: state.cycle_id,
            challenge_id,
            challenge,
            next: state.window.next().clone(),
        })
    }
}

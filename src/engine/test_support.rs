use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::{FutureExt, future::BoxFuture};
use tokio::sync::mpsc;

use crate::engine::{
    challenge::{Challenge, ChallengeGenerator, ChallengeSet},
    cycle::CycleId,
    notifier::{CycleNotifier, NotifyError},
};

/// Generator numbering challenges globally so every set is distinct.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    counter: AtomicUsize,
}

impl ChallengeGenerator for SequenceGenerator {
    fn generate(&self, count: usize) -> ChallengeSet {
        ChallengeSet::new(
            (0..count)
                .map(|_| {
                    let n = self.counter.fetch_add(1, Ordering::Relaxed);
                    Challenge::new(format!("challenge {n}"), format!("description {n}"))
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Warning,
    Broadcast(CycleId),
}

/// Notifier forwarding every callback into a channel the test can inspect.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Notification>,
    broadcast_delay: Duration,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        Self::build(Duration::ZERO, false)
    }

    /// Broadcasts are recorded only after `delay` has elapsed.
    pub fn with_broadcast_delay(
        delay: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        Self::build(delay, false)
    }

    /// Records every callback, then reports it as failed.
    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        Self::build(Duration::ZERO, true)
    }

    fn build(
        broadcast_delay: Duration,
        fail: bool,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                broadcast_delay,
                fail,
            }),
            rx,
        )
    }

    fn outcome(&self) -> Result<(), NotifyError> {
        if self.fail {
            Err(NotifyError::TargetGone("test notifier".into()))
        } else {
            Ok(())
        }
    }
}

impl CycleNotifier for RecordingNotifier {
    fn warning_ping(&self) -> BoxFuture<'static, Result<(), NotifyError>> {
        let _ = self.tx.send(Notification::Warning);
        let outcome = self.outcome();
        async move { outcome }.boxed()
    }

    fn broadcast_challenges(&self, cycle_id: CycleId) -> BoxFuture<'static, Result<(), NotifyError>> {
        let tx = self.tx.clone();
        let delay = self.broadcast_delay;
        let outcome = self.outcome();
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let _ = tx.send(Notification::Broadcast(cycle_id));
            outcome
        }
        .boxed()
    }
}

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::engine::cycle::CycleId;

/// Error raised by a notification target. Logged by the cycle timer, never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The receiving side of the notification no longer exists.
    #[error("notification target is gone: {0}")]
    TargetGone(String),
    #[error("notification failed: {message}")]
    Failed {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl NotifyError {
    /// Wrap any delivery failure.
    pub fn failed(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        NotifyError::Failed {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Outward callbacks invoked by the cycle timer, implemented by the presentation layer.
pub trait CycleNotifier: Send + Sync {
    /// The current cycle is about to end. The timer does not wait for this to finish.
    fn warning_ping(&self) -> BoxFuture<'static, Result<(), NotifyError>>;

    /// Cycle `cycle_id` is now current. The timer awaits this before its next iteration.
    fn broadcast_challenges(&self, cycle_id: CycleId) -> BoxFuture<'static, Result<(), NotifyError>>;
}

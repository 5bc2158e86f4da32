//! Background task driving the cycle cadence: sleep, warn, shift, broadcast.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::{JoinHandle, JoinSet},
    time::sleep,
};
use tracing::{Instrument, Span, info, warn};

use crate::engine::{cycle::CycleManager, notifier::CycleNotifier, settings::Settings};

/// Handle on a running cycle timer task.
///
/// Dropping the handle without calling [`CycleTimer::cancel`] also stops the
/// loop at its next suspension point, since the cancellation channel closes.
pub struct CycleTimer {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CycleTimer {
    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(
        settings: &Settings,
        cycles: Arc<CycleManager>,
        notifier: Arc<dyn CycleNotifier>,
        span: Span,
    ) -> Self {
        let (cancel, cancelled) = watch::channel(false);
        let cadence = Cadence::from(settings);
        let handle = tokio::spawn(run(cadence, cycles, notifier, cancelled).instrument(span));
        Self { cancel, handle }
    }

    /// Signal cancellation and wait for the loop to stop.
    ///
    /// Once this returns the loop will not shift or notify again.
    pub async fn cancel(self) {
        let _ = self.cancel.send(true);
        if let Err(err) = self.handle.await {
            if err.is_panic() {
                warn!(error = %err, "cycle timer panicked");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[derive(Debug, Clone, Copy)]
struct Cadence {
    cycle: Duration,
    warning: Duration,
    warn_before_end: bool,
}

impl From<&Settings> for Cadence {
    fn from(settings: &Settings) -> Self {
        Self {
            cycle: settings.cycle_duration(),
            warning: settings.warning_duration(),
            warn_before_end: settings.has_warning_window(),
        }
    }
}

async fn run(
    cadence: Cadence,
    cycles: Arc<CycleManager>,
    notifier: Arc<dyn CycleNotifier>,
    mut cancelled: watch::Receiver<bool>,
) {
    // Warning pings run detached from the cadence; dropping the set aborts stragglers.
    let mut warnings = JoinSet::new();

    loop {
        while warnings.try_join_next().is_some() {}

        if cadence.warn_before_end {
            if pause(cadence.cycle - cadence.warning, &mut cancelled).await {
                break;
            }

            let notifier = notifier.clone();
            warnings.spawn(
                async move {
                    if let Err(err) = notifier.warning_ping().await {
                        warn!(error = %err, "cycle warning ping failed");
                    }
                }
                .in_current_span(),
            );

            if pause(cadence.warning, &mut cancelled).await {
                break;
            }
        } else if pause(cadence.cycle, &mut cancelled).await {
            break;
        }

        if *cancelled.borrow() {
            break;
        }

        let cycle_id = match cycles.shift().await {
            Ok(cycle_id) => cycle_id,
            Err(err) => {
                warn!(error = %err, "failed to shift challenge window; stopping cycle timer");
                break;
            }
        };
        info!(cycle_id, "challenge window shifted");

        tokio::select! {
            result = notifier.broadcast_challenges(cycle_id) => {
                if let Err(err) = result {
                    warn!(cycle_id, error = %err, "challenge broadcast failed");
                }
            }
            _ = cancelled.wait_for(|stop| *stop) => break,
        }
    }

    warnings.abort_all();
    info!("cycle timer stopped");
}

/// Sleep for `duration` unless cancelled first. Returns `true` when cancelled.
async fn pause(duration: Duration, cancelled: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(duration) => false,
        // A closed channel means the handle is gone; treat it as cancellation.
        _ = cancelled.wait_for(|stop| *stop) => true,
    }
}

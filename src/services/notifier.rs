use std::sync::Weak;

use futures::{FutureExt, future::BoxFuture};
use uuid::Uuid;

use crate::{
    engine::{CycleId, CycleNotifier, NotifyError, SnakeGame},
    services::sse_events,
    state::SseHub,
};

/// Publishes the engine's cycle callbacks on the public SSE hub.
///
/// Holds a weak handle on its engine: the engine owns the notifier, so a
/// strong one would keep both alive forever.
pub struct SseCycleNotifier {
    game_id: Uuid,
    engine: Weak<SnakeGame>,
    hub: SseHub,
}

impl SseCycleNotifier {
    pub fn new(game_id: Uuid, engine: Weak<SnakeGame>, hub: SseHub) -> Self {
        Self {
            game_id,
            engine,
            hub,
        }
    }

    fn engine(&self) -> Result<std::sync::Arc<SnakeGame>, NotifyError> {
        self.engine
            .upgrade()
            .ok_or_else(|| NotifyError::TargetGone(format!("game `{}` was dropped", self.game_id)))
    }
}

impl CycleNotifier for SseCycleNotifier {
    fn warning_ping(&self) -> BoxFuture<'static, Result<(), NotifyError>> {
        let engine = self.engine();
        let hub = self.hub.clone();
        let game_id = self.game_id;

        async move {
            let settings = engine?.settings().await;
            sse_events::broadcast_cycle_warning(&hub, game_id, settings.warning_time)
                .map_err(|err| NotifyError::failed("serializing cycle warning", err))
        }
        .boxed()
    }

    fn broadcast_challenges(&self, cycle_id: CycleId) -> BoxFuture<'static, Result<(), NotifyError>> {
        let engine = self.engine();
        let hub = self.hub.clone();
        let game_id = self.game_id;

        async move {
            let engine = engine?;
            if !engine.is_playing().await {
                return Ok(());
            }

            let snapshot = engine
                .cycle_snapshot()
                .await
                .map_err(|err| NotifyError::failed("reading cycle window", err))?;
            if snapshot.cycle_id != cycle_id {
                // A later shift already superseded this broadcast.
                return Ok(());
            }

            sse_events::broadcast_challenges(&hub, game_id, cycle_id, &snapshot.current)
                .map_err(|err| NotifyError::failed("serializing challenges", err))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        engine::{Settings, test_support::SequenceGenerator},
        services::sse_events::{EVENT_CHALLENGES, EVENT_CYCLE_WARNING},
    };

    fn engine_with_hub() -> (Arc<SnakeGame>, SseHub, Uuid) {
        let hub = SseHub::new(16);
        let game_id = Uuid::new_v4();
        let notifier_hub = hub.clone();
        let engine = Arc::new_cyclic(|engine| {
            SnakeGame::new(
                Settings::new(30, 5, 2).unwrap(),
                Arc::new(SequenceGenerator::default()),
                Arc::new(SseCycleNotifier::new(game_id, engine.clone(), notifier_hub)),
            )
        });
        (engine, hub, game_id)
    }

    #[tokio::test]
    async fn broadcast_publishes_current_challenges() {
        let (engine, hub, game_id) = engine_with_hub();
        let mut rx = hub.subscribe();
        engine.start_game().await.unwrap();

        let notifier = SseCycleNotifier::new(game_id, Arc::downgrade(&engine), hub.clone());
        notifier.broadcast_challenges(0).await.unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_CHALLENGES));
        let body: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(body["cycle_id"], 0);
        assert_eq!(body["game_id"], game_id.to_string());
        assert_eq!(body["challenges"].as_array().unwrap().len(), 2);

        engine.end_game().await.unwrap();
    }

    #[tokio::test]
    async fn stale_or_inactive_broadcasts_are_skipped() {
        let (engine, hub, game_id) = engine_with_hub();
        let mut rx = hub.subscribe();
        let notifier = SseCycleNotifier::new(game_id, Arc::downgrade(&engine), hub.clone());

        // Not playing yet.
        notifier.broadcast_challenges(0).await.unwrap();
        assert!(rx.try_recv().is_err());

        engine.start_game().await.unwrap();
        notifier.broadcast_challenges(7).await.unwrap();
        assert!(rx.try_recv().is_err());

        engine.end_game().await.unwrap();
    }

    #[tokio::test]
    async fn warning_reports_configured_lead_time() {
        let (engine, hub, game_id) = engine_with_hub();
        let mut rx = hub.subscribe();
        let notifier = SseCycleNotifier::new(game_id, Arc::downgrade(&engine), hub.clone());

        notifier.warning_ping().await.unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_CYCLE_WARNING));
        let body: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(body["seconds_remaining"], 5);
    }

    #[tokio::test]
    async fn dropped_engine_is_reported() {
        let (engine, hub, game_id) = engine_with_hub();
        let notifier = SseCycleNotifier::new(game_id, Arc::downgrade(&engine), hub);
        drop(engine);

        assert!(matches!(
            notifier.warning_ping().await,
            Err(NotifyError::TargetGone(_))
        ));
    }
}

use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report how many games are hosted and how many have a running cycle timer.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let sessions: Vec<_> = state
        .games()
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    let mut active = 0;
    for session in &sessions {
        if session.engine().is_active().await {
            active += 1;
        }
    }

    debug!(games = sessions.len(), active, "health check");
    HealthResponse::ok(sessions.len(), active)
}

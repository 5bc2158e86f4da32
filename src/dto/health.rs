use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always "ok" while the server answers.
    pub status: String,
    /// Number of hosted games.
    pub games: usize,
    /// Number of games whose cycle timer is running.
    pub active_games: usize,
}

impl HealthResponse {
    pub fn ok(games: usize, active_games: usize) -> Self {
        Self {
            status: "ok".to_string(),
            games,
            active_games,
        }
    }
}

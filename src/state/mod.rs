pub mod session;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{config::AppConfig, error::ServiceError};

pub use self::session::GameSession;
pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

const PUBLIC_SSE_CAPACITY: usize = 64;

/// Central application state: configuration, hosted games and the public event hub.
pub struct AppState {
    config: AppConfig,
    games: DashMap<Uuid, Arc<GameSession>>,
    public_sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            games: DashMap::new(),
            public_sse: SseHub::new(PUBLIC_SSE_CAPACITY),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.public_sse
    }

    /// Registry of hosted games keyed by their identifier.
    pub fn games(&self) -> &DashMap<Uuid, Arc<GameSession>> {
        &self.games
    }

    /// Look up a hosted game.
    pub fn game(&self, id: Uuid) -> Result<Arc<GameSession>, ServiceError> {
        self.games
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
    }

    pub fn insert_game(&self, session: Arc<GameSession>) {
        self.games.insert(session.id, session);
    }

    pub fn remove_game(&self, id: Uuid) -> Option<Arc<GameSession>> {
        self.games.remove(&id).map(|(_, session)| session)
    }

    /// End every game that is still playing. Used on shutdown.
    pub async fn end_all_games(&self) {
        let sessions = self
            .games
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();

        for session in sessions {
            if !session.engine().is_active().await {
                continue;
            }
            match session.engine().end_game().await {
                Ok(()) => info!(game_id = %session.id, "game ended on shutdown"),
                Err(err) => warn!(game_id = %session.id, error = %err, "failed to end game on shutdown"),
            }
        }
    }
}

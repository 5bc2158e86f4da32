use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::GameState;

/// Publicly visible lifecycle state exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGameState {
    /// Players can join and settings can change.
    Lobby,
    /// Countdown before the first cycle.
    Starting,
    /// Cycles are running.
    Playing,
    /// Game over.
    Ended,
}

impl From<GameState> for VisibleGameState {
    fn from(value: GameState) -> Self {
        match value {
            GameState::Initial => VisibleGameState::Lobby,
            GameState::Starting => VisibleGameState::Starting,
            GameState::Playing => VisibleGameState::Playing,
            GameState::Ended => VisibleGameState::Ended,
        }
    }
}

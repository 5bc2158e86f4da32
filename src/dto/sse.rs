use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{challenge::ChallengeSummary, game::PlayerSummary, state::VisibleGameState},
    engine::CycleId,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a new cycle becomes current.
pub struct ChallengesEvent {
    pub game_id: Uuid,
    pub cycle_id: CycleId,
    pub challenges: Vec<ChallengeSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast shortly before the current cycle ends.
pub struct CycleWarningEvent {
    pub game_id: Uuid,
    pub seconds_remaining: u64,
}

#[derive(Debug, Serialize, ToSchema)]
/// One tick of the countdown before the first cycle.
pub struct CountdownEvent {
    pub game_id: Uuid,
    pub seconds_remaining: u64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a team wins the current cycle.
pub struct ChallengeCompletedEvent {
    pub game_id: Uuid,
    pub cycle_id: CycleId,
    pub team: u8,
    pub player: String,
    pub challenge: ChallengeSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent for each losing team, revealing the upcoming challenges.
pub struct TeamFrozenEvent {
    pub game_id: Uuid,
    pub cycle_id: CycleId,
    pub team: u8,
    pub next_challenges: Vec<ChallengeSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the game lifecycle state changes.
pub struct GameStateEvent {
    pub game_id: Uuid,
    pub state: VisibleGameState,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player joins a team.
pub struct PlayerJoinedEvent {
    pub game_id: Uuid,
    pub player: PlayerSummary,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        challenge::ChallengeSummary, format_system_time, settings::SettingsResponse,
        state::VisibleGameState, validation::validate_display_name,
    },
    engine::{Completion, CycleId},
    state::session::{Player, TeamId},
};

/// Payload used to host a brand-new game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    #[validate(custom(function = "validate_display_name"), length(max = 100))]
    pub name: String,
}

/// Payload used by a player to join one of the two teams.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    #[validate(custom(function = "validate_display_name"), length(max = 64))]
    pub name: String,
    /// Team number, 1 or 2.
    #[validate(range(min = 1, max = 2, message = "team must be 1 or 2"))]
    pub team: u8,
}

/// Claim of a challenge by a player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteChallengeRequest {
    pub player_id: Uuid,
    /// Index of the challenge within the cycle it was shown in.
    pub challenge_id: usize,
    /// Cycle the player saw the challenge in.
    pub cycle_id: CycleId,
}

/// Summary returned once a game has been created or queried.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    pub state: VisibleGameState,
    pub settings: SettingsResponse,
    pub players: Vec<PlayerSummary>,
    /// Current cycle, once the game has started.
    pub cycle_id: Option<CycleId>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public projection of a player exposed to REST/SSE clients.
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub team: u8,
    pub joined_at: String,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            team: player.team.number(),
            joined_at: format_system_time(player.joined_at),
        }
    }
}

/// Challenges of the current cycle. The next set is only revealed once the cycle is won.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengesResponse {
    pub cycle_id: CycleId,
    pub completed: bool,
    pub current: Vec<ChallengeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Vec<ChallengeSummary>>,
}

/// Returned when the game enters its first cycle.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    pub cycle_id: CycleId,
    pub challenges: Vec<ChallengeSummary>,
}

/// Outcome of a winning claim.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteChallengeResponse {
    pub cycle_id: CycleId,
    /// Winning team number.
    pub team: u8,
    pub challenge: ChallengeSummary,
    /// Upcoming challenges, shown to the frozen teams.
    pub next_challenges: Vec<ChallengeSummary>,
}

impl From<(TeamId, Completion)> for CompleteChallengeResponse {
    fn from((team, completion): (TeamId, Completion)) -> Self {
        Self {
            cycle_id: completion.cycle_id,
            team: team.number(),
            challenge: ChallengeSummary::new(completion.challenge_id, &completion.challenge),
            next_challenges: ChallengeSummary::list(&completion.next),
        }
    }
}

/// Generic acknowledgement for lifecycle actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        challenge::ChallengeSummary,
        game::PlayerSummary,
        sse::{
            ChallengeCompletedEvent, ChallengesEvent, CountdownEvent, CycleWarningEvent,
            GameStateEvent, PlayerJoinedEvent, ServerEvent, TeamFrozenEvent,
        },
        state::VisibleGameState,
    },
    engine::{ChallengeSet, Completion, CycleId, GameState},
    state::{SseHub, session::TeamId},
};

pub const EVENT_CHALLENGES: &str = "challenges";
pub const EVENT_CYCLE_WARNING: &str = "cycle.warning";
pub const EVENT_COUNTDOWN: &str = "countdown";
pub const EVENT_CHALLENGE_COMPLETED: &str = "challenge.completed";
pub const EVENT_TEAM_FROZEN: &str = "team.frozen";
pub const EVENT_GAME_STATE: &str = "game.state";
pub const EVENT_PLAYER_JOINED: &str = "player.joined";

/// Broadcast the challenges of the cycle that just became current.
pub fn broadcast_challenges(
    hub: &SseHub,
    game_id: Uuid,
    cycle_id: CycleId,
    challenges: &ChallengeSet,
) -> serde_json::Result<()> {
    let payload = ChallengesEvent {
        game_id,
        cycle_id,
        challenges: ChallengeSummary::list(challenges),
    };
    hub.broadcast(ServerEvent::json(EVENT_CHALLENGES.to_string(), &payload)?);
    Ok(())
}

/// Broadcast that the current cycle ends in `seconds_remaining` seconds.
pub fn broadcast_cycle_warning(
    hub: &SseHub,
    game_id: Uuid,
    seconds_remaining: u64,
) -> serde_json::Result<()> {
    let payload = CycleWarningEvent {
        game_id,
        seconds_remaining,
    };
    hub.broadcast(ServerEvent::json(EVENT_CYCLE_WARNING.to_string(), &payload)?);
    Ok(())
}

/// Broadcast one tick of the pre-game countdown.
pub fn broadcast_countdown(hub: &SseHub, game_id: Uuid, seconds_remaining: u64) {
    let payload = CountdownEvent {
        game_id,
        seconds_remaining,
    };
    send_event(hub, EVENT_COUNTDOWN, &payload);
}

/// Broadcast the winning claim, then freeze every losing team with a preview of the next set.
pub fn broadcast_completion(
    hub: &SseHub,
    game_id: Uuid,
    winner: TeamId,
    player: &str,
    completion: &Completion,
) {
    let payload = ChallengeCompletedEvent {
        game_id,
        cycle_id: completion.cycle_id,
        team: winner.number(),
        player: player.to_string(),
        challenge: ChallengeSummary::new(completion.challenge_id, &completion.challenge),
    };
    send_event(hub, EVENT_CHALLENGE_COMPLETED, &payload);

    let next_challenges = ChallengeSummary::list(&completion.next);
    for team in winner.opponents() {
        let payload = TeamFrozenEvent {
            game_id,
            cycle_id: completion.cycle_id,
            team: team.number(),
            next_challenges: next_challenges.clone(),
        };
        send_event(hub, EVENT_TEAM_FROZEN, &payload);
    }
}

/// Broadcast a lifecycle state change.
pub fn broadcast_game_state(hub: &SseHub, game_id: Uuid, state: GameState) {
    let payload = GameStateEvent {
        game_id,
        state: VisibleGameState::from(state),
    };
    send_event(hub, EVENT_GAME_STATE, &payload);
}

/// Broadcast that a player joined the roster.
pub fn broadcast_player_joined(hub: &SseHub, game_id: Uuid, player: PlayerSummary) {
    let payload = PlayerJoinedEvent { game_id, player };
    send_event(hub, EVENT_PLAYER_JOINED, &payload);
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

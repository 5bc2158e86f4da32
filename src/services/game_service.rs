use std::{sync::Arc, time::Duration};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        challenge::ChallengeSummary,
        format_system_time,
        game::{
            ChallengesResponse, CompleteChallengeRequest, CompleteChallengeResponse,
            CreateGameRequest, GameSummary, JoinGameRequest, PlayerSummary, StartGameResponse,
        },
        settings::{SettingsResponse, UpdateSettingsRequest},
        validation::validate_warning_window,
    },
    engine::GameState,
    error::ServiceError,
    services::sse_events,
    state::{GameSession, SharedState},
};

/// Host a new game in the lobby, using the configured defaults.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "game name must not be empty".into(),
        ));
    }

    let config = state.config();
    let session = GameSession::new(
        name,
        config.default_settings(),
        config.challenge_generator(),
        state.public_sse().clone(),
    );
    state.insert_game(session.clone());
    info!(game_id = %session.id, name = %session.name, "game created");

    sse_events::broadcast_game_state(state.public_sse(), session.id, GameState::Initial);
    Ok(summarize(&session).await)
}

/// Summaries of every hosted game.
pub async fn list_games(state: &SharedState) -> Vec<GameSummary> {
    let sessions: Vec<_> = state
        .games()
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    let mut summaries = Vec::with_capacity(sessions.len());
    for session in &sessions {
        summaries.push(summarize(session).await);
    }
    summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    summaries
}

pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let session = state.game(id)?;
    Ok(summarize(&session).await)
}

/// Register a player on one of the two teams. Closed once the game has started.
pub async fn join_game(
    state: &SharedState,
    id: Uuid,
    request: JoinGameRequest,
) -> Result<PlayerSummary, ServiceError> {
    let session = state.game(id)?;

    let player = {
        let mut roster = session.roster().lock().await;
        if session.engine().has_started().await {
            return Err(ServiceError::InvalidState(
                "players cannot join once the game has started".into(),
            ));
        }
        roster.join(&request.name, request.team)?
    };

    info!(game_id = %id, player_id = %player.id, team = %player.team, "player joined");
    let summary = PlayerSummary::from(&player);
    sse_events::broadcast_player_joined(state.public_sse(), id, summary.clone());
    Ok(summary)
}

pub async fn get_settings(state: &SharedState, id: Uuid) -> Result<SettingsResponse, ServiceError> {
    let session = state.game(id)?;
    Ok(session.engine().settings().await.into())
}

/// Apply a partial settings update while the game is still in the lobby.
pub async fn update_settings(
    state: &SharedState,
    id: Uuid,
    request: UpdateSettingsRequest,
) -> Result<SettingsResponse, ServiceError> {
    let session = state.game(id)?;
    let engine = session.engine();

    let settings = request.merge_into(engine.settings().await);
    validate_warning_window(settings.cycle_length, settings.warning_time)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    engine.update_settings(settings).await?;
    info!(game_id = %id, ?settings, "game settings updated");
    Ok(settings.into())
}

/// Run the countdown and enter the first cycle.
///
/// Requires at least one player. The game is abandoned when it is deleted
/// while the countdown runs.
pub async fn start_game(
    state: &SharedState,
    id: Uuid,
) -> Result<StartGameResponse, ServiceError> {
    let session = state.game(id)?;
    let engine = session.engine().clone();

    {
        let roster = session.roster().lock().await;
        if roster.is_empty() {
            return Err(ServiceError::InvalidInput(
                "a game requires at least one player to start".into(),
            ));
        }
        engine.enter_starting().await?;
    }
    sse_events::broadcast_game_state(state.public_sse(), id, GameState::Starting);

    for remaining in (1..=state.config().countdown_secs()).rev() {
        sse_events::broadcast_countdown(state.public_sse(), id, remaining);
        tokio::time::sleep(Duration::from_secs(1)).await;
        if !state.games().contains_key(&id) {
            warn!(game_id = %id, "game removed during countdown; abandoning start");
            return Err(ServiceError::NotFound(format!("game `{id}` not found")));
        }
    }

    let challenges = engine.start_game().await?;
    let cycle_id = engine.cycle_id().await?;
    info!(game_id = %id, cycle_id, "game started");

    let hub = state.public_sse();
    sse_events::broadcast_game_state(hub, id, GameState::Playing);
    if let Err(err) = sse_events::broadcast_challenges(hub, id, cycle_id, &challenges) {
        warn!(game_id = %id, error = %err, "failed to broadcast first challenges");
    }

    Ok(StartGameResponse {
        cycle_id,
        challenges: ChallengeSummary::list(&challenges),
    })
}

/// Stop the game if it is running and drop it from the registry.
pub async fn end_game(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let session = state.game(id)?;
    let engine = session.engine();

    if engine.is_playing().await {
        engine.end_game().await?;
    }
    state.remove_game(id);

    info!(game_id = %id, "game ended");
    sse_events::broadcast_game_state(state.public_sse(), id, GameState::Ended);
    Ok(())
}

/// Challenges of the current cycle; the next set is revealed once the cycle is won.
pub async fn challenges(state: &SharedState, id: Uuid) -> Result<ChallengesResponse, ServiceError> {
    let session = state.game(id)?;
    let snapshot = session.engine().cycle_snapshot().await?;

    Ok(ChallengesResponse {
        cycle_id: snapshot.cycle_id,
        completed: snapshot.completed,
        current: ChallengeSummary::list(&snapshot.current),
        next: snapshot
            .completed
            .then(|| ChallengeSummary::list(&snapshot.next)),
    })
}

/// Claim a challenge on behalf of a player's team.
pub async fn complete_challenge(
    state: &SharedState,
    id: Uuid,
    request: CompleteChallengeRequest,
) -> Result<CompleteChallengeResponse, ServiceError> {
    let session = state.game(id)?;
    let player = session.roster().lock().await.player(request.player_id)?.clone();

    let engine = session.engine();
    if !engine.is_playing().await {
        return Err(ServiceError::InvalidState(
            "challenges can only be completed while the game is playing".into(),
        ));
    }

    let completion = engine
        .complete_challenge(request.challenge_id, request.cycle_id)
        .await?;
    info!(
        game_id = %id,
        cycle_id = completion.cycle_id,
        challenge_id = completion.challenge_id,
        team = %player.team,
        player = %player.name,
        "challenge completed"
    );

    sse_events::broadcast_completion(state.public_sse(), id, player.team, &player.name, &completion);
    Ok((player.team, completion).into())
}

async fn summarize(session: &Arc<GameSession>) -> GameSummary {
    let engine = session.engine();
    let state = engine.state().await;
    let cycle_id = if engine.is_active().await {
        engine.cycle_id().await.ok()
    } else {
        None
    };
    let players = session
        .roster()
        .lock()
        .await
        .players()
        .map(PlayerSummary::from)
        .collect();

    GameSummary {
        id: session.id,
        name: session.name.clone(),
        created_at: format_system_time(session.created_at),
        state: state.into(),
        settings: engine.settings().await.into(),
        players,
        cycle_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dto::state::VisibleGameState, state::AppState};

    fn app_state() -> SharedState {
        AppState::new(AppConfig::default().with_countdown_secs(0))
    }

    async fn lobby(state: &SharedState) -> Uuid {
        create_game(
            state,
            CreateGameRequest {
                name: "friday night".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn join(state: &SharedState, id: Uuid, name: &str, team: u8) -> PlayerSummary {
        join_game(
            state,
            id,
            JoinGameRequest {
                name: name.into(),
                team,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_list_games() {
        let state = app_state();
        let id = lobby(&state).await;

        let games = list_games(&state).await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, id);
        assert_eq!(games[0].cycle_id, None);
        assert_eq!(games[0].settings, SettingsResponse::from(AppConfig::default().default_settings()));

        assert!(matches!(
            get_game(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn start_requires_a_player() {
        let state = app_state();
        let id = lobby(&state).await;

        assert!(matches!(
            start_game(&state, id).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert_eq!(
            get_game(&state, id).await.unwrap().state,
            VisibleGameState::Lobby
        );
    }

    #[tokio::test]
    async fn roster_and_settings_close_once_started() {
        let state = app_state();
        let id = lobby(&state).await;
        join(&state, id, "ada", 1).await;

        let started = start_game(&state, id).await.unwrap();
        assert_eq!(started.cycle_id, 0);
        assert_eq!(
            started.challenges.len(),
            AppConfig::default().default_settings().num_challenges
        );

        assert!(matches!(
            join_game(
                &state,
                id,
                JoinGameRequest {
                    name: "late".into(),
                    team: 2
                }
            )
            .await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            update_settings(&state, id, UpdateSettingsRequest::default()).await,
            Err(ServiceError::InvalidState(_))
        ));

        end_game(&state, id).await.unwrap();
    }

    #[tokio::test]
    async fn settings_reject_warning_outside_cycle() {
        let state = app_state();
        let id = lobby(&state).await;

        let request = UpdateSettingsRequest {
            cycle_length: Some(30),
            warning_time: Some(30),
            ..Default::default()
        };
        assert!(matches!(
            update_settings(&state, id, request).await,
            Err(ServiceError::InvalidInput(_))
        ));

        let request = UpdateSettingsRequest {
            cycle_length: Some(45),
            warning_time: Some(10),
            num_challenges: Some(2),
        };
        let updated = update_settings(&state, id, request).await.unwrap();
        assert_eq!(updated.cycle_length, 45);
        assert_eq!(get_settings(&state, id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn first_claim_wins_and_freezes_opponents() {
        let state = app_state();
        let id = lobby(&state).await;
        let ada = join(&state, id, "ada", 1).await;
        let bob = join(&state, id, "bob", 2).await;
        start_game(&state, id).await.unwrap();

        let mut events = state.public_sse().subscribe();
        let won = complete_challenge(
            &state,
            id,
            CompleteChallengeRequest {
                player_id: ada.id,
                challenge_id: 1,
                cycle_id: 0,
            },
        )
        .await
        .unwrap();
        assert_eq!(won.team, 1);
        assert_eq!(won.challenge.id, 1);

        let completed = events.try_recv().unwrap();
        assert_eq!(completed.event.as_deref(), Some(sse_events::EVENT_CHALLENGE_COMPLETED));
        let frozen = events.try_recv().unwrap();
        assert_eq!(frozen.event.as_deref(), Some(sse_events::EVENT_TEAM_FROZEN));
        let body: serde_json::Value = serde_json::from_str(&frozen.data).unwrap();
        assert_eq!(body["team"], 2);

        assert!(matches!(
            complete_challenge(
                &state,
                id,
                CompleteChallengeRequest {
                    player_id: bob.id,
                    challenge_id: 0,
                    cycle_id: 0,
                },
            )
            .await,
            Err(ServiceError::InvalidState(_))
        ));

        let view = challenges(&state, id).await.unwrap();
        assert!(view.completed);
        assert!(view.next.is_some());

        end_game(&state, id).await.unwrap();
    }

    #[tokio::test]
    async fn claims_are_checked_before_reaching_the_engine() {
        let state = app_state();
        let id = lobby(&state).await;
        let ada = join(&state, id, "ada", 1).await;

        let early = CompleteChallengeRequest {
            player_id: ada.id,
            challenge_id: 0,
            cycle_id: 0,
        };
        assert!(matches!(
            complete_challenge(&state, id, early).await,
            Err(ServiceError::InvalidState(_))
        ));

        start_game(&state, id).await.unwrap();
        let stranger = CompleteChallengeRequest {
            player_id: Uuid::new_v4(),
            challenge_id: 0,
            cycle_id: 0,
        };
        assert!(matches!(
            complete_challenge(&state, id, stranger).await,
            Err(ServiceError::NotFound(_))
        ));

        let out_of_range = CompleteChallengeRequest {
            player_id: ada.id,
            challenge_id: 99,
            cycle_id: 0,
        };
        assert!(matches!(
            complete_challenge(&state, id, out_of_range).await,
            Err(ServiceError::InvalidInput(_))
        ));

        end_game(&state, id).await.unwrap();
    }

    #[tokio::test]
    async fn ending_removes_the_game() {
        let state = app_state();
        let id = lobby(&state).await;
        join(&state, id, "ada", 1).await;
        start_game(&state, id).await.unwrap();

        end_game(&state, id).await.unwrap();
        assert!(state.games().is_empty());
        assert!(matches!(
            end_game(&state, id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_before_first_cycle() {
        let state = AppState::new(AppConfig::default().with_countdown_secs(3));
        let id = lobby(&state).await;
        join(&state, id, "ada", 2).await;

        let mut events = state.public_sse().subscribe();
        start_game(&state, id).await.unwrap();

        let mut ticks = Vec::new();
        while let Ok(event) = events.try_recv() {
            if event.event.as_deref() == Some(sse_events::EVENT_COUNTDOWN) {
                let body: serde_json::Value = serde_json::from_str(&event.data).unwrap();
                ticks.push(body["seconds_remaining"].as_u64().unwrap());
            }
        }
        assert_eq!(ticks, vec![3, 2, 1]);

        end_game(&state, id).await.unwrap();
    }
}

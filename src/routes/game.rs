use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        game::{
            ActionResponse, ChallengesResponse, CompleteChallengeRequest,
            CompleteChallengeResponse, CreateGameRequest, GameSummary, JoinGameRequest,
            PlayerSummary, StartGameResponse,
        },
        settings::{SettingsResponse, UpdateSettingsRequest},
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes hosting games and driving their lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{id}", get(get_game).delete(end_game))
        .route("/games/{id}/players", post(join_game))
        .route("/games/{id}/settings", get(get_settings).put(update_settings))
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/challenges", get(challenges))
        .route("/games/{id}/complete", post(complete_challenge))
}

/// Host a new game in the lobby.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameSummary),
        (status = 400, description = "Invalid game name")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameSummary>, AppError> {
    payload.validate()?;
    let summary = game_service::create_game(&state, payload).await?;
    Ok(Json(summary))
}

/// List every hosted game.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses((status = 200, description = "Hosted games", body = [GameSummary]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Json<Vec<GameSummary>> {
    Json(game_service::list_games(&state).await)
}

#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game summary", body = GameSummary),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Stop the game's cycles and remove it.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game ended", body = ActionResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn end_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    game_service::end_game(&state, id).await?;
    Ok(Json(ActionResponse {
        message: format!("game `{id}` ended"),
    }))
}

/// Join one of the two teams while the game is in the lobby.
#[utoipa::path(
    post,
    path = "/games/{id}/players",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Player registered", body = PlayerSummary),
        (status = 400, description = "Invalid or duplicate name, or unknown team"),
        (status = 409, description = "Game already started")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JoinGameRequest>,
) -> Result<Json<PlayerSummary>, AppError> {
    payload.validate()?;
    Ok(Json(game_service::join_game(&state, id, payload).await?))
}

#[utoipa::path(
    get,
    path = "/games/{id}/settings",
    tag = "settings",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses((status = 200, description = "Current settings", body = SettingsResponse))
)]
pub async fn get_settings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SettingsResponse>, AppError> {
    Ok(Json(game_service::get_settings(&state, id).await?))
}

/// Change cycle timing or size. Rejected once the game has started.
#[utoipa::path(
    put,
    path = "/games/{id}/settings",
    tag = "settings",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Settings out of range"),
        (status = 409, description = "Settings are frozen")
    )
)]
pub async fn update_settings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    payload.validate()?;
    Ok(Json(game_service::update_settings(&state, id, payload).await?))
}

/// Count down, then enter the first cycle.
#[utoipa::path(
    post,
    path = "/games/{id}/start",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game playing", body = StartGameResponse),
        (status = 400, description = "No players"),
        (status = 409, description = "Game already started")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StartGameResponse>, AppError> {
    Ok(Json(game_service::start_game(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/games/{id}/challenges",
    tag = "challenges",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Challenges of the current cycle", body = ChallengesResponse),
        (status = 409, description = "Game not started")
    )
)]
pub async fn challenges(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChallengesResponse>, AppError> {
    Ok(Json(game_service::challenges(&state, id).await?))
}

/// Claim a challenge of the current cycle for the player's team.
#[utoipa::path(
    post,
    path = "/games/{id}/complete",
    tag = "challenges",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = CompleteChallengeRequest,
    responses(
        (status = 200, description = "Cycle won", body = CompleteChallengeResponse),
        (status = 400, description = "Unknown challenge"),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "Cycle expired or already won")
    )
)]
pub async fn complete_challenge(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteChallengeRequest>,
) -> Result<Json<CompleteChallengeResponse>, AppError> {
    Ok(Json(
        game_service::complete_challenge(&state, id, payload).await?,
    ))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{config::AppConfig, routes, state::AppState};

    async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn app() -> axum::Router {
        routes::router(AppState::new(AppConfig::default().with_countdown_secs(0)))
    }

    #[tokio::test]
    async fn full_round_over_http() {
        let app = app();

        let (status, game) = send(&app, "POST", "/games", Some(json!({ "name": "snake night" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(game["state"], "lobby");
        let id = game["id"].as_str().unwrap().to_string();

        let (status, player) = send(
            &app,
            "POST",
            &format!("/games/{id}/players"),
            Some(json!({ "name": "ada", "team": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let player_id = player["id"].as_str().unwrap().to_string();

        let (status, started) = send(&app, "POST", &format!("/games/{id}/start"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["cycle_id"], 0);

        let (status, view) = send(&app, "GET", &format!("/games/{id}/challenges"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["completed"], false);
        assert!(view.get("next").is_none());

        let claim = json!({ "player_id": player_id, "challenge_id": 0, "cycle_id": 0 });
        let (status, won) =
            send(&app, "POST", &format!("/games/{id}/complete"), Some(claim.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(won["team"], 1);

        let (status, _) = send(&app, "POST", &format!("/games/{id}/complete"), Some(claim)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, "DELETE", &format!("/games/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/games/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_payloads_are_rejected() {
        let app = app();

        let (status, _) = send(&app, "POST", "/games", Some(json!({ "name": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, game) = send(&app, "POST", "/games", Some(json!({ "name": "lobby" }))).await;
        let id = game["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/games/{id}/players"),
            Some(json!({ "name": "ada", "team": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/games/{id}/settings"),
            Some(json!({ "num_challenges": 9 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, settings) = send(
            &app,
            "PUT",
            &format!("/games/{id}/settings"),
            Some(json!({ "cycle_length": 60 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["cycle_length"], 60);

        let (status, _) = send(&app, "POST", &format!("/games/{id}/start"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", &format!("/games/{id}/challenges"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn healthcheck_counts_games() {
        let app = app();
        send(&app, "POST", "/games", Some(json!({ "name": "one" }))).await;

        let (status, health) = send(&app, "GET", "/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["games"], 1);
        assert_eq!(health["active_games"], 0);
    }
}

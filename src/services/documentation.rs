use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Snake Race Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::game::create_game,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::end_game,
        crate::routes::game::join_game,
        crate::routes::game::get_settings,
        crate::routes::game::update_settings,
        crate::routes::game::start_game,
        crate::routes::game::challenges,
        crate::routes::game::complete_challenge,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::challenge::ChallengeSummary,
            crate::dto::state::VisibleGameState,
            crate::dto::settings::SettingsResponse,
            crate::dto::settings::UpdateSettingsRequest,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::CompleteChallengeRequest,
            crate::dto::game::GameSummary,
            crate::dto::game::PlayerSummary,
            crate::dto::game::ChallengesResponse,
            crate::dto::game::StartGameResponse,
            crate::dto::game::CompleteChallengeResponse,
            crate::dto::game::ActionResponse,
            crate::dto::sse::ChallengesEvent,
            crate::dto::sse::CycleWarningEvent,
            crate::dto::sse::CountdownEvent,
            crate::dto::sse::ChallengeCompletedEvent,
            crate::dto::sse::TeamFrozenEvent,
            crate::dto::sse::GameStateEvent,
            crate::dto::sse::PlayerJoinedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "game", description = "Game hosting, roster and lifecycle"),
        (name = "settings", description = "Cycle timing and size"),
        (name = "challenges", description = "Current cycle and claims"),
    )
)]
pub struct ApiDoc;

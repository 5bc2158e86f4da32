use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod game;
pub mod health;
pub mod sse;

/// Build the full HTTP surface: health, game REST routes, the public event
/// stream and the API documentation.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = Router::new()
        .merge(health::router())
        .merge(game::router())
        .merge(sse::router());

    api_router
        .merge(docs::router(state.clone()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = router(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri(docs::OPENAPI_JSON_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/games/{id}/complete"].is_object());
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let app = router(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

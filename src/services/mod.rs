/// OpenAPI documentation generation.
pub mod documentation;
/// Game hosting, roster, settings and gameplay operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// SSE-backed implementation of the engine's outward callbacks.
pub mod notifier;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    engine::{CycleError, GameError},
    state::session::RosterError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Unexpected engine bookkeeping failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InvalidTransition(invalid) => ServiceError::InvalidState(invalid.to_string()),
            GameError::TransitionPending => {
                ServiceError::InvalidState("state transition already pending".into())
            }
            GameError::Apply(apply) => ServiceError::Internal(apply.to_string()),
            GameError::Cycle(cycle) => cycle.into(),
            GameError::Settings(settings) => ServiceError::InvalidInput(settings.to_string()),
            err @ GameError::SettingsFrozen { .. } => ServiceError::InvalidState(err.to_string()),
        }
    }
}

impl From<CycleError> for ServiceError {
    fn from(err: CycleError) -> Self {
        match err {
            CycleError::InvalidChallengeId { .. } => ServiceError::InvalidInput(err.to_string()),
            CycleError::ExpiredCycle { .. }
            | CycleError::AlreadyCompleted { .. }
            | CycleError::NotInitialized
            | CycleError::AlreadyInitialized => ServiceError::InvalidState(err.to_string()),
        }
    }
}

impl From<RosterError> for ServiceError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::UnknownPlayer(_) => ServiceError::NotFound(err.to_string()),
            RosterError::UnknownTeam(_) | RosterError::EmptyName | RosterError::DuplicateName(_) => {
                ServiceError::InvalidInput(err.to_string())
            }
        }
    }
}

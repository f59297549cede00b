use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod bank;
mod items;
mod notifications;
mod requests;
mod server;
mod settings;
mod user;
mod views;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::IllegalTransition(_)
        | EngineError::AlreadySubmitted(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_)
        | EngineError::InvalidState(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: EngineError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn engine_forbidden_maps_to_403() {
        assert_eq!(
            status(EngineError::Forbidden("forbidden".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn engine_unauthorized_maps_to_401() {
        assert_eq!(
            status(EngineError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        assert_eq!(
            status(EngineError::KeyNotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn lifecycle_conflicts_map_to_409() {
        for err in [
            EngineError::ExistingKey("x".to_string()),
            EngineError::IllegalTransition("x".to_string()),
            EngineError::AlreadySubmitted("x".to_string()),
        ] {
            assert_eq!(status(err), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::Validation("x".to_string()),
            EngineError::InvalidState("x".to_string()),
            EngineError::InvalidCursor("x".to_string()),
        ] {
            assert_eq!(status(err), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_errors_hide_details() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "disk I/O error".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

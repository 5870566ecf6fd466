use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::reconcile::ReconcileError;
use crate::slug::SlugError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Save already in flight for '{0}'")]
    SaveInFlight(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotAuthorized => AppError::NotAuthorized,
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::SlugTaken(slug) => AppError::Conflict(format!("slug '{slug}' is taken")),
            StoreError::KindMismatch { kind, patch } => AppError::Validation(format!(
                "patch kind {patch} does not match addressed kind {kind}"
            )),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Transport(e) => AppError::Internal(e),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::SaveInFlight(slug) => AppError::SaveInFlight(slug),
            ReconcileError::Store(e) => e.into(),
        }
    }
}

impl From<SlugError> for AppError {
    fn from(e: SlugError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotAuthorized => (
                StatusCode::FORBIDDEN,
                "NOT_AUTHORIZED",
                "Access denied".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::SaveInFlight(slug) => (
                StatusCode::CONFLICT,
                "SAVE_IN_FLIGHT",
                format!("A save for '{slug}' is already running"),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

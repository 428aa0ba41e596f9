use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One failed field check, as reported by the schema validator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Failures are recovered here, at the transport boundary, never inside the
/// core: store and collaborator layers propagate these variants unchanged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed ({} violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Batch operation failed: {0}")]
    PartialBatch(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                json!({ "message": msg }),
            ),
            // Validation responses carry every violation, never just the first.
            AppError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                json!({
                    "message": "Validation failed",
                    "violations": violations,
                }),
            ),
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, "CONFLICT", json!({ "message": msg }))
            }
            AppError::PartialBatch(msg) => {
                tracing::error!("Batch operation failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BATCH_ERROR",
                    json!({ "message": "A batch storage operation failed" }),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream failure: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    json!({ "message": "An upstream service failed" }),
                )
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                json!({ "message": "Authentication required" }),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    json!({ "message": "A database error occurred" }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    json!({ "message": "An internal server error occurred" }),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "detail": detail,
            }
        }));

        (status, body).into_response()
    }
}

//! Edge error types and handling
//!
//! Most of the edge layer never surfaces errors to clients: routing misses
//! fall through and trust failures deny. `EdgeError` exists for the handful
//! of handlers (health, auth session) that can fail for real.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            EdgeError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            EdgeError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for EdgeError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        EdgeError::Database(err.to_string())
    }
}

/// Result type alias for edge handlers
pub type EdgeResult<T> = Result<T, EdgeError>;

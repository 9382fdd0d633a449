use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::readings::ReadingKind;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Sensors API error: {0}")]
    SensorsApi(String),

    #[error("Reading kind mismatch: expected {expected:?}, got {actual:?}")]
    KindMismatch {
        expected: ReadingKind,
        actual: ReadingKind,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::SensorsApi(msg) => {
                tracing::error!("Sensors API error: {msg}");
                (StatusCode::BAD_GATEWAY, format!("Sensors API error: {msg}"))
            }
            Self::KindMismatch { .. } => {
                tracing::error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

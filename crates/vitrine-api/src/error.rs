//! API error type rendered in the WordPress error shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned by handlers.
///
/// Every variant renders as `{"code", "message", "data": {"status"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("not logged in")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Generation(String),

    #[error(transparent)]
    Internal(vitrine_core::Error),
}

impl ApiError {
    pub fn post_not_found() -> Self {
        ApiError::NotFound {
            code: "rest_post_invalid_id",
            message: "ID de post inválido.".to_string(),
        }
    }

    pub fn media_not_found() -> Self {
        ApiError::NotFound {
            code: "rest_post_invalid_id",
            message: "ID de mídia inválido.".to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            code: "rest_not_found",
            message: message.into(),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound { code, .. } => (StatusCode::NOT_FOUND, code),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "rest_invalid_param"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "rest_not_logged_in"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "rest_conflict"),
            ApiError::Generation(_) => (StatusCode::BAD_GATEWAY, "vitrine_generation_failed"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "rest_internal_error"),
        }
    }
}

impl From<vitrine_core::Error> for ApiError {
    fn from(err: vitrine_core::Error) -> Self {
        use vitrine_core::Error;

        match err {
            Error::PostNotFound(_) => ApiError::post_not_found(),
            Error::NotFound(msg) => ApiError::not_found(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::LimitReached(msg) => ApiError::Conflict(msg),
            Error::Unauthorized(_) => ApiError::Unauthorized,
            Error::Inference(msg) => ApiError::Generation(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = match &self {
            ApiError::Unauthorized => "Você não tem permissão para fazer isso.".to_string(),
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                "Erro interno do servidor.".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "code": code,
            "message": message,
            "data": { "status": status.as_u16() },
        }));

        (status, body).into_response()
    }
}

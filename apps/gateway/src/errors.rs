use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::envelope::ApiResponse;
use crate::resume::validation::FieldError;
use crate::session::TokenError;
use crate::upstream::UpstreamError;

/// Gateway error type.
/// Implements `IntoResponse` so every handler failure renders as an `ApiResponse`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resume validation failed with {} error(s)", .0.len())]
    InvalidResume(Vec<FieldError>),

    #[error("Upstream returned {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    #[error("No token returned from backend")]
    MissingAccessToken,

    #[error("Upstream request failed: {0}")]
    Transport(#[from] UpstreamError),

    #[error("Malformed upstream payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    MultipartBody(#[from] MultipartRejection),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid(e) => {
                tracing::debug!("Rejected session token: {e}");
                AppError::InvalidToken
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, data) = match self {
            AppError::Unauthenticated | AppError::TokenExpired | AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, self.to_string(), None)
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidResume(errors) => (
                StatusCode::BAD_REQUEST,
                "Resume validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::Upstream {
                status,
                message,
                payload,
            } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
                payload,
            ),
            AppError::JsonBody(rejection) => (rejection.status(), rejection.body_text(), None),
            AppError::Query(rejection) => (rejection.status(), rejection.body_text(), None),
            AppError::MultipartBody(rejection) => {
                (rejection.status(), rejection.body_text(), None)
            }
            AppError::Multipart(e) => (e.status(), format!("Malformed multipart body: {e}"), None),
            AppError::MissingAccessToken => {
                tracing::error!("Login succeeded upstream but no access token was returned");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None)
            }
            AppError::Transport(ref e) => {
                tracing::error!("Upstream transport error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None)
            }
            AppError::Parse(ref e) => {
                tracing::error!("Upstream parse error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None)
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None)
            }
        };

        (status, Json(ApiResponse::error(message, data))).into_response()
    }
}

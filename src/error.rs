//! The error taxonomy every handler speaks.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete input. `empty_fields` names every missing
    /// field when the failure is a collection of blanks.
    #[error("{message}")]
    Validation {
        message: String,
        empty_fields: Vec<&'static str>,
    },

    /// Missing, invalid or expired credentials.
    #[error("{0}")]
    Auth(String),

    /// The referenced entity does not exist. Served as 400, not 404, to
    /// match the wire contract clients already rely on.
    #[error("{0}")]
    NotFound(String),

    /// The operation contradicts current state (duplicate email,
    /// duplicate watchlist entry, ...).
    #[error("{0}")]
    Conflict(String),

    /// Anything we did to ourselves. Details go to the log, not the wire.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation<S: Into<String>>(message: S) -> ApiError {
        ApiError::Validation {
            message: message.into(),
            empty_fields: Vec::new(),
        }
    }

    pub fn auth<S: Into<String>>(message: S) -> ApiError {
        ApiError::Auth(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> ApiError {
        ApiError::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> ApiError {
        ApiError::Conflict(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation {
                message,
                empty_fields,
            } => {
                let body = if empty_fields.is_empty() {
                    json!({ "error": message })
                } else {
                    json!({ "error": message, "emptyFields": empty_fields })
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Auth(message) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::NotFound(message) | ApiError::Conflict(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                tracing::error!("Internal error serving request: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

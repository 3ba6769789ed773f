//! API error taxonomy.
//!
//! Every failure a handler can produce maps onto exactly one of these
//! variants, and every variant maps onto exactly one HTTP status. Internal
//! failures are logged server-side; the client only ever sees a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Unknown user or wrong password. Deliberately a single variant with a
    /// single message so the two cases are indistinguishable to a client.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Missing, malformed, or expired token, or a token whose user no
    /// longer exists.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Authenticated, but not allowed to touch the addressed resource.
    #[error("You may only act on your own account")]
    PermissionDenied,

    #[error("{0}")]
    NotFound(String),

    /// Resource already exists (username taken).
    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => ApiError::Duplicate(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::PermissionDenied => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Duplicate(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Internal(err) => {
                error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

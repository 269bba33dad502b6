//! Error types and HTTP response mapping.
//!
//! Every handler returns `Result<_, ApiError>`. Storage and media failures convert into
//! `ApiError` through `#[from]`, and `IntoResponse` turns each variant into a status code
//! plus a `{"success": false, "message": ...}` body.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{repository::RepositoryError, storage::MediaError};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid or expired token, or bad credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted: wrong role or not the owner (403).
    #[error("{0}")]
    Forbidden(String),

    /// Entity absent or soft-deleted (404).
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (409).
    #[error("{0}")]
    Conflict(String),

    /// Byte range outside the resource (416). Carries the resource size for `Content-Range`.
    #[error("requested range not satisfiable")]
    RangeNotSatisfiable { size: u64 },

    /// Persistence failure. Duplicate keys surface as 409, everything else as 500.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Object storage failure (500).
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Any other server-side failure (500). The message is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => error_body(StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => error_body(StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => error_body(StatusCode::CONFLICT, msg),
            Self::RangeNotSatisfiable { size } => {
                let mut response =
                    error_body(StatusCode::RANGE_NOT_SATISFIABLE, "Requested range not satisfiable");
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                    response.headers_mut().insert(header::CONTENT_RANGE, value);
                }
                response
            }
            Self::Repository(RepositoryError::Duplicate(key)) => {
                tracing::debug!("unique constraint rejected write: {}", key);
                error_body(StatusCode::CONFLICT, "Resource already exists")
            }
            Self::Repository(err) => {
                tracing::error!("repository error: {}", err);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::Media(err) => {
                tracing::error!("media store error: {}", err);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// ApiJson
///
/// `axum::Json` whose rejection is an `ApiError`, so malformed bodies get the same
/// JSON error envelope (400) as every other failure.
#[derive(FromRequest, Debug)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

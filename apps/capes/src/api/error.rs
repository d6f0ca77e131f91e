//! # API Errors
//!
//! Maps catalogue and transport failures onto HTTP responses.
//!
//! - Validation failures: `400 {"errors": {field: [messages]}}`
//! - Everything else: `{"error": message, "code": CODE}`
//!
//! Storage faults are logged and replaced by a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use super::types::{ErrorResponse, ValidationErrorResponse};
use capes_core::CatalogueError;

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A catalogue error from `capes_core`.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// A body or parameter that could not be read at all.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A path that does not name a record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The global rate limit was exceeded.
    #[error("Too many requests")]
    RateLimited,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    let body = ErrorResponse {
        error: message,
        code: code.to_string(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Catalogue(CatalogueError::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, Json(ValidationErrorResponse { errors })).into_response()
            }
            AppError::Catalogue(CatalogueError::NotFound(id)) => error_body(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Character with id {} not found", id),
            ),
            AppError::Catalogue(
                err @ (CatalogueError::SerializationError(_) | CatalogueError::IoError(_)),
            ) => {
                tracing::error!(error = %err, "Storage error");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::RateLimited => {
                tracing::warn!("Rate limit exceeded");
                error_body(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "Too Many Requests".to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use capes_core::CharacterId;

    #[test]
    fn status_codes() {
        let cases = [
            (
                AppError::from(CatalogueError::invalid("name", "required")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(CatalogueError::NotFound(CharacterId(3))),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(CatalogueError::IoError("disk full".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::BadRequest("bad json".to_string()), StatusCode::BAD_REQUEST),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}

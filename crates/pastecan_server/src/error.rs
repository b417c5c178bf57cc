//! HTTP error mapping for API handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pastecan_core::AppError;

/// Wrapper mapping [`AppError`] onto the text-protocol HTTP surface.
///
/// Bodies are plain text so the API stays pleasant from curl; not-found never
/// distinguishes absent, expired, or unauthorized.
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found\n".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("{}\n", msg)),
            AppError::TooLarge(max) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Content too large. Maximum size is {} bytes.\n", max),
            ),
            AppError::SlugExhausted(attempts) => {
                tracing::error!("Slug allocation exhausted after {} attempts", attempts);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error\n".to_string(),
                )
            }
            // Label conflicts are answered in the create handler; a conflict
            // escaping to here is a server fault.
            AppError::SlugTaken(slug) => {
                tracing::error!("Unhandled slug conflict for '{}'", slug);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error\n".to_string(),
                )
            }
            other => {
                tracing::error!("Internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error\n".to_string(),
                )
            }
        };

        (status, body).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::session::SessionError;

/// Where visitors land when they ask for a passenger that does not exist.
pub const NOT_FOUND_FALLBACK: &str = "/interests";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown passenger. Answered with a redirect, never an error page.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(what) => {
                tracing::debug!("Not found: {what}; redirecting to {NOT_FOUND_FALLBACK}");
                return Redirect::to(NOT_FOUND_FALLBACK).into_response();
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SESSION_ERROR",
                    "Your session could not be loaded or saved".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_not_found_redirects_to_listing() {
        let response = AppError::NotFound("passenger 404".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], NOT_FOUND_FALLBACK);
    }

    #[test]
    fn test_session_error_is_500() {
        let err = SessionError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

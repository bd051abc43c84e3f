use axum::{
    response::{IntoResponse, Response, Redirect},
    http::StatusCode,
};
use crate::errors::AppError;

// Converts AppError into an HTTP response. Internal failures are logged here
// and only a short message reaches the browser.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Authentication errors redirect to login
            AppError::Auth(msg) => {
                Redirect::to(&format!("/?error={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg,
            ).into_response(),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                format!("Not found: {}", msg),
            ).into_response(),

            AppError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Storage error: {}", e),
                ).into_response()
            }

            AppError::File(e) => {
                tracing::error!("File failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error loading page".to_string(),
                ).into_response()
            }

            AppError::Session(msg) => {
                tracing::error!("Session failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                ).into_response()
            }

            AppError::Presentation(e) => {
                tracing::error!("Presentation failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Presentation error: {}", e),
                ).into_response()
            }
        }
    }
}

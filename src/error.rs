use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const MISSING_IMAGE_MESSAGE: &str = "No image provided";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate descriptions";
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to process request";

// Taken from https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: HttpErrorResponse,
}

#[derive(Debug, Serialize)]
pub struct HttpErrorResponse {
    error: String,
}

impl From<&str> for HttpErrorResponse {
    fn from(message: &str) -> Self {
        HttpErrorResponse {
            error: message.to_string(),
        }
    }
}

impl ApiError {
    pub fn missing_image() -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: HttpErrorResponse::from(MISSING_IMAGE_MESSAGE),
        }
    }

    pub fn generation_failed() -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: HttpErrorResponse::from(GENERATION_FAILED_MESSAGE),
        }
    }

    pub fn internal() -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: HttpErrorResponse::from(INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut res = Json(self.message).into_response();
        *res.status_mut() = self.status;
        res
    }
}

/// Anything unexpected becomes a generic 500; the cause only goes to the log.
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        tracing::error!(error = %format!("{err:#}"), "Error processing request");
        ApiError::internal()
    }
}

pub type ApiResult<T, E = ApiError> = Result<T, E>;

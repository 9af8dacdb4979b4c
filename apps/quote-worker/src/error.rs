//! Error types for the quote worker

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ocr_jobs::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::JobNotFound(key) => (
                StatusCode::NOT_FOUND,
                "JOB_NOT_FOUND",
                format!("Job '{}' not found", key),
            ),
            ServerError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Job store unavailable".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

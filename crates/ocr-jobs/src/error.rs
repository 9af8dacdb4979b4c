//! Error types for OCR jobs

use std::path::PathBuf;

use thiserror::Error;

/// Job store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// OCR collaborator failures
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to read object {path}: {source}")]
    ObjectRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid OCR response: {0}")]
    InvalidResponse(String),
}

/// Failures that end a job as FAILED
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Empty OCR text")]
    EmptyOcrText,

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl JobError {
    /// Name recorded next to the message on the failed job
    pub fn name(&self) -> &'static str {
        match self {
            JobError::EmptyOcrText => "EmptyOcrText",
            JobError::Ocr(OcrError::ObjectRead { .. }) => "ObjectReadError",
            JobError::Ocr(OcrError::Http(_)) => "OcrHttpError",
            JobError::Ocr(OcrError::Api { .. }) => "OcrApiError",
            JobError::Ocr(OcrError::InvalidResponse(_)) => "OcrResponseError",
            JobError::Store(_) => "StoreError",
        }
    }
}

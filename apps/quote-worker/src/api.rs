//! API handlers for the quote worker
//!
//! - Storage trigger intake
//! - Job record lookup

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use ocr_jobs::{JobStore, RunOutcome, StorageEvent};
use serde::Serialize;
use shared_types::{JobKey, JobRecord};
use tracing::info;

use crate::error::ServerError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "quote-worker",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/storage/finalized
///
/// Always 200: a failed run is recorded on the job, not on the response.
pub async fn handle_storage_finalized(
    State(state): State<Arc<AppState>>,
    Json(event): Json<StorageEvent>,
) -> Json<RunOutcome> {
    info!(bucket = %event.bucket, name = %event.name, "Storage trigger received");
    Json(state.pipeline.handle(&event).await)
}

/// Handler: GET /api/jobs/:date/:job_id
pub async fn handle_get_job(
    State(state): State<Arc<AppState>>,
    Path((date, job_id)): Path<(String, String)>,
) -> Result<Json<JobRecord>, ServerError> {
    let key = JobKey::new(date, job_id);
    state
        .store()
        .get(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::JobNotFound(key.to_string()))
}

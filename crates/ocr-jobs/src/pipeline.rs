//! Upload-to-estimate pipeline
//!
//! One storage trigger becomes at most one job run: filter the trigger,
//! derive the job id, take the lease, OCR the image, parse the text and
//! record the outcome on the job. Failures after the lease is taken are
//! written to the job as FAILED and never surface to the caller.

use std::sync::Arc;

use quote_parser::QuoteParser;
use serde::Serialize;
use shared_types::{JobFailure, JobKey, JobPatch, JobStatus};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::WorkerConfig;
use crate::error::JobError;
use crate::lease::{new_owner, AcquireOutcome, LeaseManager};
use crate::ocr::OcrClient;
use crate::store::JobStore;
use crate::upload::{StorageEvent, UploadPath};

/// What a single trigger amounted to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RunOutcome {
    /// Not a job upload
    Ignored,
    /// Lease refused; `reason` is ALREADY_FINISHED, LEASE_HELD or STORE_ERROR
    Skipped {
        #[serde(rename = "jobId")]
        job_id: String,
        reason: String,
    },
    Done {
        #[serde(rename = "jobId")]
        job_id: String,
    },
    Failed {
        #[serde(rename = "jobId")]
        job_id: String,
        message: String,
    },
}

impl RunOutcome {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            RunOutcome::Ignored => None,
            RunOutcome::Skipped { job_id, .. }
            | RunOutcome::Done { job_id }
            | RunOutcome::Failed { job_id, .. } => Some(job_id),
        }
    }
}

pub struct Pipeline {
    store: Arc<dyn JobStore>,
    ocr: Arc<dyn OcrClient>,
    clock: Arc<dyn Clock>,
    parser: QuoteParser,
    leases: LeaseManager,
    upload_prefix: String,
    owner_prefix: String,
}

impl Pipeline {
    pub fn new(
        config: &WorkerConfig,
        store: Arc<dyn JobStore>,
        ocr: Arc<dyn OcrClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let leases = LeaseManager::new(store.clone(), clock.clone(), config.lease_ms);
        Self {
            store,
            ocr,
            clock,
            parser: config.build_parser(),
            leases,
            upload_prefix: config.upload_prefix.clone(),
            owner_prefix: config.owner_prefix.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Run the job for one object-finalized trigger
    pub async fn handle(&self, event: &StorageEvent) -> RunOutcome {
        if !event.name.starts_with(&self.upload_prefix) || !event.is_image() {
            debug!(
                name = %event.name,
                content_type = ?event.content_type,
                "Ignoring non-upload object"
            );
            return RunOutcome::Ignored;
        }

        let Some(upload) = UploadPath::parse(&event.name, &self.upload_prefix) else {
            debug!(name = %event.name, "Ignoring upload with unexpected path shape");
            return RunOutcome::Ignored;
        };
        let key = upload.key();
        let owner = new_owner(&self.owner_prefix);

        match self.leases.acquire(&key, &owner, &event.name).await {
            Ok(AcquireOutcome::Acquired { .. }) => {}
            Ok(refused) => {
                let reason = refused.reason().unwrap_or_default();
                info!(key = %key, reason, "Skipping job");
                return RunOutcome::Skipped {
                    job_id: upload.job_id,
                    reason: reason.to_string(),
                };
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to acquire lease");
                return RunOutcome::Skipped {
                    job_id: upload.job_id,
                    reason: "STORE_ERROR".to_string(),
                };
            }
        }

        info!(key = %key, owner = %owner, "Job started");
        let outcome = match self.process(&key, &upload, event).await {
            Ok(()) => {
                info!(key = %key, "Job done");
                RunOutcome::Done {
                    job_id: upload.job_id.clone(),
                }
            }
            Err(e) => {
                error!(key = %key, error = %e, name = e.name(), "Job failed");
                self.record_failure(&key, &e).await;
                RunOutcome::Failed {
                    job_id: upload.job_id.clone(),
                    message: e.to_string(),
                }
            }
        };

        if let Err(e) = self.leases.release(&key, &owner).await {
            error!(key = %key, error = %e, "Failed to release lease");
        }
        outcome
    }

    async fn process(
        &self,
        key: &JobKey,
        upload: &UploadPath,
        event: &StorageEvent,
    ) -> Result<(), JobError> {
        self.store
            .merge(
                key,
                JobPatch::new()
                    .job_id(&upload.job_id)
                    .status(JobStatus::OcrRunning)
                    .storage_path(&event.name)
                    .updated_at(self.clock.now()),
            )
            .await?;

        let ocr = self.ocr.recognize(&event.bucket, &event.name).await?;
        debug!(key = %key, chars = ocr.text.len(), words = ocr.words.len(), "OCR finished");

        self.store
            .merge(
                key,
                JobPatch::new()
                    .status(JobStatus::Parsing)
                    .ocr_text(&ocr.text)
                    .updated_at(self.clock.now()),
            )
            .await?;

        if ocr.text.trim().is_empty() {
            return Err(JobError::EmptyOcrText);
        }

        let now = self.clock.now();
        let parsed = self.parser.parse(&ocr.text, now, &ocr.words);
        debug!(
            key = %key,
            venue = ?parsed.venue.v,
            estimates = parsed.estimates.len(),
            "Parsed quote"
        );

        let finished = self.clock.now();
        self.store
            .merge(
                key,
                JobPatch::new()
                    .status(JobStatus::Done)
                    .parsed(parsed)
                    .clear_error()
                    .updated_at(finished)
                    .finished_at(finished),
            )
            .await?;
        Ok(())
    }

    async fn record_failure(&self, key: &JobKey, err: &JobError) {
        let now = self.clock.now();
        let patch = JobPatch::new()
            .status(JobStatus::Failed)
            .error(JobFailure {
                message: err.to_string(),
                name: Some(err.name().to_string()),
            })
            .updated_at(now)
            .finished_at(now);

        if let Err(e) = self.store.merge(key, patch).await {
            warn!(key = %key, error = %e, "Could not record job failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outcome_json() {
        let done = RunOutcome::Done {
            job_id: "20260301_abc".to_string(),
        };
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["outcome"], "done");
        assert_eq!(json["jobId"], "20260301_abc");

        let ignored = serde_json::to_value(RunOutcome::Ignored).unwrap();
        assert_eq!(ignored, serde_json::json!({"outcome": "ignored"}));
        assert_eq!(RunOutcome::Ignored.job_id(), None);
    }

    #[test]
    fn test_skipped_carries_reason() {
        let skipped = RunOutcome::Skipped {
            job_id: "20260301_abc".to_string(),
            reason: "LEASE_HELD".to_string(),
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "LEASE_HELD");
        assert_eq!(skipped.job_id(), Some("20260301_abc"));
    }
}

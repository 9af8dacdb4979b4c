//! Persisted job record and the partial-merge writes applied to it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ParsedOutput;

/// Processing state of an uploaded document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    OcrRunning,
    Parsing,
    Done,
    Failed,
}

impl JobStatus {
    /// DONE and FAILED end the job; nothing moves out of them
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::OcrRunning => 0,
            JobStatus::Parsing => 1,
            JobStatus::Done | JobStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        next.rank() >= self.rank()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::OcrRunning => write!(f, "OCR_RUNNING"),
            JobStatus::Parsing => write!(f, "PARSING"),
            JobStatus::Done => write!(f, "DONE"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Time-bounded exclusive claim on a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub owner: String,
    /// Expiry as epoch milliseconds
    pub until: i64,
}

impl Lease {
    pub fn is_active_at(&self, now_ms: i64) -> bool {
        self.until > now_ms
    }
}

/// Failure details recorded on a FAILED job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub message: String,
    pub name: Option<String>,
}

/// Storage key of a job record: `{date}/{job_id}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub date: String,
    pub job_id: String,
}

impl JobKey {
    pub fn new(date: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            job_id: job_id.into(),
        }
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.date, self.job_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease: Option<Lease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Materialize a record that does not exist yet from its first write
    pub fn from_patch(patch: JobPatch) -> Self {
        let mut record = Self::default();
        record.apply(patch);
        record
    }

    /// Merge a partial write into the record.
    ///
    /// Fields the patch leaves untouched keep their value. A status that
    /// would regress, or leave a terminal state, is not applied; the rest of
    /// the patch still is. Returns false when the status was refused.
    pub fn apply(&mut self, patch: JobPatch) -> bool {
        let mut status_applied = true;
        if let Some(status) = patch.status {
            if self.status.can_transition_to(status) {
                self.status = status;
            } else {
                status_applied = false;
            }
        }

        if let Some(job_id) = patch.job_id {
            self.job_id = Some(job_id);
        }
        if let Some(path) = patch.storage_path {
            self.storage_path = Some(path);
        }
        if let Some(text) = patch.ocr_text {
            self.ocr_text = Some(text);
        }
        if let Some(parsed) = patch.parsed {
            self.parsed = Some(parsed);
        }
        patch.error.merge_into(&mut self.error);
        patch.lease.merge_into(&mut self.lease);
        if let Some(ts) = patch.created_at {
            self.created_at = Some(ts);
        }
        if let Some(ts) = patch.updated_at {
            self.updated_at = Some(ts);
        }
        if let Some(ts) = patch.finished_at {
            self.finished_at = Some(ts);
        }

        status_applied
    }
}

/// Update of an optional field in a merge write
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
    Delete,
}

impl<T> FieldUpdate<T> {
    fn merge_into(self, slot: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *slot = Some(value),
            FieldUpdate::Delete => *slot = None,
        }
    }
}

/// Partial write against a job record; unset fields are left as they are
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub job_id: Option<String>,
    pub status: Option<JobStatus>,
    pub storage_path: Option<String>,
    pub ocr_text: Option<String>,
    pub parsed: Option<ParsedOutput>,
    pub error: FieldUpdate<JobFailure>,
    pub lease: FieldUpdate<Lease>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn storage_path(mut self, path: impl Into<String>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn ocr_text(mut self, text: impl Into<String>) -> Self {
        self.ocr_text = Some(text.into());
        self
    }

    pub fn parsed(mut self, parsed: ParsedOutput) -> Self {
        self.parsed = Some(parsed);
        self
    }

    pub fn error(mut self, failure: JobFailure) -> Self {
        self.error = FieldUpdate::Set(failure);
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = FieldUpdate::Delete;
        self
    }

    pub fn lease(mut self, lease: Lease) -> Self {
        self.lease = FieldUpdate::Set(lease);
        self
    }

    pub fn clear_lease(mut self) -> Self {
        self.lease = FieldUpdate::Delete;
        self
    }

    pub fn created_at(mut self, ts: DateTime<Utc>) -> Self {
        self.created_at = Some(ts);
        self
    }

    pub fn updated_at(mut self, ts: DateTime<Utc>) -> Self {
        self.updated_at = Some(ts);
        self
    }

    pub fn finished_at(mut self, ts: DateTime<Utc>) -> Self {
        self.finished_at = Some(ts);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lease(owner: &str, until: i64) -> Lease {
        Lease {
            owner: owner.to_string(),
            until,
        }
    }

    #[test]
    fn test_status_moves_forward() {
        let mut record = JobRecord::default();
        assert!(record.apply(JobPatch::new().status(JobStatus::Parsing)));
        assert!(record.apply(JobPatch::new().status(JobStatus::Done)));
        assert_eq!(record.status, JobStatus::Done);
    }

    #[test]
    fn test_status_never_regresses() {
        let mut record = JobRecord::from_patch(JobPatch::new().status(JobStatus::Parsing));
        let applied = record.apply(
            JobPatch::new()
                .status(JobStatus::OcrRunning)
                .job_id("20260301_abc"),
        );

        assert!(!applied);
        assert_eq!(record.status, JobStatus::Parsing);
        // The rest of the patch still lands
        assert_eq!(record.job_id.as_deref(), Some("20260301_abc"));
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let mut record = JobRecord::from_patch(JobPatch::new().status(JobStatus::Failed));
        assert!(!record.apply(JobPatch::new().status(JobStatus::Done)));
        assert_eq!(record.status, JobStatus::Failed);
        assert!(record.apply(JobPatch::new().status(JobStatus::Failed)));
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut record = JobRecord::from_patch(
            JobPatch::new()
                .storage_path("uploads/20260301/abc_quote.jpg")
                .lease(lease("w-1", 1_000)),
        );
        record.apply(JobPatch::new().ocr_text("식대 70,000원"));

        assert_eq!(
            record.storage_path.as_deref(),
            Some("uploads/20260301/abc_quote.jpg")
        );
        assert_eq!(record.lease, Some(lease("w-1", 1_000)));
        assert_eq!(record.ocr_text.as_deref(), Some("식대 70,000원"));
    }

    #[test]
    fn test_delete_removes_field() {
        let mut record = JobRecord::from_patch(JobPatch::new().lease(lease("w-1", 1_000)).error(
            JobFailure {
                message: "boom".to_string(),
                name: None,
            },
        ));
        record.apply(JobPatch::new().clear_lease().clear_error());

        assert_eq!(record.lease, None);
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_lease_activity() {
        let l = lease("w-1", 5_000);
        assert!(l.is_active_at(4_999));
        assert!(!l.is_active_at(5_000));
    }

    #[test]
    fn test_record_json_shape() {
        let record = JobRecord::from_patch(
            JobPatch::new()
                .job_id("20260301_abc")
                .status(JobStatus::Parsing)
                .lease(lease("w-1", 42)),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["jobId"], "20260301_abc");
        assert_eq!(json["status"], "PARSING");
        assert_eq!(json["lease"]["until"], 42);
        assert!(json.get("error").is_none());

        let back: JobRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_job_key_display() {
        assert_eq!(
            JobKey::new("20260301", "20260301_abc").to_string(),
            "20260301/20260301_abc"
        );
    }
}

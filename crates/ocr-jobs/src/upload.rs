//! Storage trigger payload and upload path rules
//!
//! Uploads land at `{prefix}{YYYYMMDD}/{rawId}_{anything}`. The date and the
//! raw id form the job id, so every re-delivery of the same upload maps to
//! the same job record.

use serde::{Deserialize, Serialize};
use shared_types::JobKey;

pub const DEFAULT_UPLOAD_PREFIX: &str = "uploads/";

/// Object-finalized notification from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEvent {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl StorageEvent {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// Identity of a job derived from where its image was uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPath {
    pub date: String,
    pub raw_id: String,
    pub job_id: String,
}

impl UploadPath {
    /// Parse `{prefix}{date}/{fileName}`; anything else is not a job upload
    pub fn parse(path: &str, prefix: &str) -> Option<Self> {
        let rest = path.strip_prefix(prefix)?;
        let (date, file_name) = rest.split_once('/')?;

        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if file_name.is_empty() || file_name.contains('/') {
            return None;
        }

        let raw_id = file_name.split('_').next().unwrap_or_default();
        if raw_id.is_empty() {
            return None;
        }

        Some(Self {
            date: date.to_string(),
            raw_id: raw_id.to_string(),
            job_id: format!("{}_{}", date, raw_id),
        })
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(&self.date, &self.job_id)
    }
}

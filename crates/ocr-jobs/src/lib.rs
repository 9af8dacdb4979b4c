//! Upload-triggered OCR jobs
//!
//! Leases, the job record store, the OCR collaborator and the pipeline
//! that turns an uploaded quote image into parsed estimates.

pub mod clock;
pub mod config;
pub mod error;
pub mod lease;
pub mod ocr;
pub mod pipeline;
pub mod sqlite;
pub mod store;
pub mod upload;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::WorkerConfig;
pub use error::{JobError, OcrError, StoreError};
pub use lease::{AcquireOutcome, LeaseManager, DEFAULT_LEASE_MS};
pub use ocr::{OcrClient, VisionOcrClient, DEFAULT_VISION_ENDPOINT};
pub use pipeline::{Pipeline, RunOutcome};
pub use sqlite::SqliteJobStore;
pub use store::{JobStore, MemoryJobStore, Mutation};
pub use upload::{StorageEvent, UploadPath, DEFAULT_UPLOAD_PREFIX};

pub mod job;
pub mod types;

pub use job::{FieldUpdate, JobFailure, JobKey, JobPatch, JobRecord, JobStatus, Lease};
pub use types::{Estimate, OcrOutput, OcrWord, ParsedOutput, VenueField};

//! Application state for the quote worker

use std::sync::Arc;

use ocr_jobs::{Clock, JobStore, OcrClient, Pipeline, WorkerConfig};

pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(
        config: &WorkerConfig,
        store: Arc<dyn JobStore>,
        ocr: Arc<dyn OcrClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(config, store, ocr, clock),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        self.pipeline.store()
    }
}

//! Job record storage
//!
//! Records are only ever changed through merge writes. Anything that must
//! read before it writes goes through [`JobStore::transact`], which runs the
//! read, the decision and the write as one atomic step.

use std::collections::HashMap;

use async_trait::async_trait;
use shared_types::{JobKey, JobPatch, JobRecord};
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Decision taken against the current record inside a transaction; `None`
/// leaves the record untouched
pub type Mutation<'a> = Box<dyn FnOnce(Option<&JobRecord>) -> Option<JobPatch> + Send + 'a>;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, key: &JobKey) -> Result<Option<JobRecord>, StoreError>;

    /// Read, decide and write atomically. Returns whether a patch was written.
    async fn transact<'a>(
        &'a self,
        key: &'a JobKey,
        mutation: Mutation<'a>,
    ) -> Result<bool, StoreError>;

    /// Merge a patch into the record, creating it when absent
    async fn merge(&self, key: &JobKey, patch: JobPatch) -> Result<(), StoreError> {
        self.transact(key, Box::new(move |_| Some(patch))).await?;
        Ok(())
    }
}

/// Apply a patch to an optional record
pub(crate) fn merged(current: Option<&JobRecord>, patch: JobPatch) -> JobRecord {
    match current {
        Some(record) => {
            let mut record = record.clone();
            if !record.apply(patch) {
                tracing::warn!(status = %record.status, "refused status regression");
            }
            record
        }
        None => JobRecord::from_patch(patch),
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    records: Mutex<HashMap<JobKey, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, key: &JobKey) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn transact<'a>(
        &'a self,
        key: &'a JobKey,
        mutation: Mutation<'a>,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let current = records.get(key);
        let Some(patch) = mutation(current) else {
            return Ok(false);
        };
        let record = merged(current, patch);
        records.insert(key.clone(), record);
        Ok(true)
    }
}

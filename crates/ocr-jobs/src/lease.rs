//! Time-bounded exclusive claim on a job
//!
//! At most one run processes a job at a time. A run first acquires the
//! job's lease; a crashed run is superseded once its lease expires.

use std::sync::Arc;

use chrono::DateTime;
use shared_types::{JobKey, JobPatch, JobRecord, JobStatus, Lease};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::store::JobStore;

pub const DEFAULT_LEASE_MS: i64 = 60_000;

/// Result of trying to take a job's lease
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired { until: i64 },
    /// Job already reached DONE or FAILED
    AlreadyFinished,
    /// Another run holds an unexpired lease
    LeaseHeld { owner: String, until: i64 },
}

impl AcquireOutcome {
    pub fn is_acquired(&self) -> bool {
        matches!(self, AcquireOutcome::Acquired { .. })
    }

    /// Reason code for a refused acquire
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AcquireOutcome::Acquired { .. } => None,
            AcquireOutcome::AlreadyFinished => Some("ALREADY_FINISHED"),
            AcquireOutcome::LeaseHeld { .. } => Some("LEASE_HELD"),
        }
    }
}

/// Fresh lease owner id, unique per run
pub fn new_owner(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

pub struct LeaseManager {
    store: Arc<dyn JobStore>,
    clock: Arc<dyn Clock>,
    lease_ms: i64,
}

impl LeaseManager {
    pub fn new(store: Arc<dyn JobStore>, clock: Arc<dyn Clock>, lease_ms: i64) -> Self {
        Self {
            store,
            clock,
            lease_ms,
        }
    }

    pub fn lease_ms(&self) -> i64 {
        self.lease_ms
    }

    /// Take the lease unless the job is finished or leased to someone else.
    ///
    /// A record that does not exist yet is created in OCR_RUNNING.
    pub async fn acquire(
        &self,
        key: &JobKey,
        owner: &str,
        storage_path: &str,
    ) -> Result<AcquireOutcome, StoreError> {
        let now = self.clock.now();
        let now_ms = now.timestamp_millis();
        let until = now_ms + self.lease_ms;
        let mut outcome = AcquireOutcome::AlreadyFinished;

        self.store
            .transact(
                key,
                Box::new(|current: Option<&JobRecord>| {
                    if current.is_some_and(|r| r.status.is_terminal()) {
                        outcome = AcquireOutcome::AlreadyFinished;
                        return None;
                    }
                    if let Some(held) = current
                        .and_then(|r| r.lease.as_ref())
                        .filter(|lease| lease.is_active_at(now_ms))
                    {
                        outcome = AcquireOutcome::LeaseHeld {
                            owner: held.owner.clone(),
                            until: held.until,
                        };
                        return None;
                    }

                    outcome = AcquireOutcome::Acquired { until };
                    Some(claim_patch(current, owner, storage_path, until, now))
                }),
            )
            .await?;

        match &outcome {
            AcquireOutcome::Acquired { until } => {
                tracing::debug!(key = %key, owner, until, "lease acquired")
            }
            AcquireOutcome::LeaseHeld { owner: holder, until } => {
                tracing::warn!(key = %key, holder = %holder, until, "lease held by another run")
            }
            AcquireOutcome::AlreadyFinished => {
                tracing::info!(key = %key, "job already finished")
            }
        }
        Ok(outcome)
    }

    /// Drop the lease if `owner` still holds it. Returns whether it was removed.
    pub async fn release(&self, key: &JobKey, owner: &str) -> Result<bool, StoreError> {
        let released = self
            .store
            .transact(
                key,
                Box::new(|current: Option<&JobRecord>| {
                    let holder = current.and_then(|r| r.lease.as_ref()).map(|l| l.owner.as_str());
                    (holder == Some(owner)).then(|| JobPatch::new().clear_lease())
                }),
            )
            .await?;

        if !released {
            tracing::warn!(key = %key, owner, "lease not held by this owner");
        }
        Ok(released)
    }
}

fn claim_patch(
    current: Option<&JobRecord>,
    owner: &str,
    storage_path: &str,
    until: i64,
    now: DateTime<chrono::Utc>,
) -> JobPatch {
    let mut patch = JobPatch::new()
        .lease(Lease {
            owner: owner.to_string(),
            until,
        })
        .updated_at(now);

    match current {
        None => {
            patch = patch
                .status(JobStatus::OcrRunning)
                .storage_path(storage_path)
                .created_at(now);
        }
        Some(record) => {
            if record.storage_path.is_none() {
                patch = patch.storage_path(storage_path);
            }
            if record.created_at.is_none() {
                patch = patch.created_at(now);
            }
        }
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryJobStore;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: Arc<MemoryJobStore>,
        clock: Arc<ManualClock>,
        leases: LeaseManager,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryJobStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ));
        let leases = LeaseManager::new(store.clone(), clock.clone(), DEFAULT_LEASE_MS);
        Fixture {
            store,
            clock,
            leases,
        }
    }

    fn key() -> JobKey {
        JobKey::new("20260301", "20260301_abc")
    }

    const PATH: &str = "uploads/20260301/abc_quote.jpg";

    #[tokio::test]
    async fn test_first_acquire_creates_record() {
        let f = fixture();
        let outcome = f.leases.acquire(&key(), "w-1", PATH).await.unwrap();

        let expected_until = f.clock.now_ms() + DEFAULT_LEASE_MS;
        assert_eq!(outcome, AcquireOutcome::Acquired { until: expected_until });

        let record = f.store.get(&key()).await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::OcrRunning);
        assert_eq!(record.storage_path.as_deref(), Some(PATH));
        assert_eq!(record.created_at, Some(f.clock.now()));
        assert_eq!(record.lease.map(|l| l.owner), Some("w-1".to_string()));
    }

    #[tokio::test]
    async fn test_second_acquire_is_refused_until_expiry() {
        let f = fixture();
        assert!(f.leases.acquire(&key(), "w-1", PATH).await.unwrap().is_acquired());

        f.clock.advance(Duration::seconds(30));
        let outcome = f.leases.acquire(&key(), "w-2", PATH).await.unwrap();
        assert_eq!(outcome.reason(), Some("LEASE_HELD"));

        f.clock.advance(Duration::seconds(30));
        let outcome = f.leases.acquire(&key(), "w-2", PATH).await.unwrap();
        assert!(outcome.is_acquired());
    }

    #[tokio::test]
    async fn test_finished_job_is_never_leased() {
        let f = fixture();
        f.store
            .merge(&key(), JobPatch::new().status(JobStatus::Done))
            .await
            .unwrap();

        let outcome = f.leases.acquire(&key(), "w-1", PATH).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::AlreadyFinished);
        assert_eq!(outcome.reason(), Some("ALREADY_FINISHED"));
        assert_eq!(f.store.get(&key()).await.unwrap().unwrap().lease, None);
    }

    #[tokio::test]
    async fn test_release_requires_matching_owner() {
        let f = fixture();
        f.leases.acquire(&key(), "w-1", PATH).await.unwrap();

        assert!(!f.leases.release(&key(), "w-2").await.unwrap());
        assert!(f.store.get(&key()).await.unwrap().unwrap().lease.is_some());

        assert!(f.leases.release(&key(), "w-1").await.unwrap());
        assert!(f.store.get(&key()).await.unwrap().unwrap().lease.is_none());
    }

    #[tokio::test]
    async fn test_release_of_missing_record_is_noop() {
        let f = fixture();
        assert!(!f.leases.release(&key(), "w-1").await.unwrap());
        assert!(f.store.is_empty().await);
    }

    #[test]
    fn test_owner_ids_are_unique() {
        let a = new_owner("quote-worker");
        let b = new_owner("quote-worker");
        assert!(a.starts_with("quote-worker-"));
        assert_ne!(a, b);
    }
}

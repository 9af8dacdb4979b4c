//! SQLite-backed job store
//!
//! Each record is one JSON document keyed by `(date, job_id)`. A transaction
//! holds one pooled connection under `BEGIN IMMEDIATE`, which takes the write
//! lock up front so concurrent acquirers of the same job serialize. The
//! connection only goes back to the pool after COMMIT or ROLLBACK.

use async_trait::async_trait;
use chrono::Utc;
use shared_types::{JobKey, JobRecord};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::store::{merged, JobStore, Mutation};

#[derive(Debug, Clone)]
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database: {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database; a single connection keeps every query on it
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                date TEXT NOT NULL,
                job_id TEXT NOT NULL,
                record_json TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (date, job_id)
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn read(conn: &mut SqliteConnection, key: &JobKey) -> Result<Option<JobRecord>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT record_json FROM jobs WHERE date = ? AND job_id = ?")
                .bind(&key.date)
                .bind(&key.job_id)
                .fetch_optional(&mut *conn)
                .await?;

        match row {
            Some((json,)) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write(conn: &mut SqliteConnection, key: &JobKey, record: &JobRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let updated_at = record.updated_at.unwrap_or_else(Utc::now).to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO jobs (date, job_id, record_json, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (date, job_id) DO UPDATE SET
                record_json = excluded.record_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&key.date)
        .bind(&key.job_id)
        .bind(json)
        .bind(updated_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn read_modify_write(
        conn: &mut SqliteConnection,
        key: &JobKey,
        mutation: Mutation<'_>,
    ) -> Result<bool, StoreError> {
        let current = Self::read(conn, key).await?;
        let Some(patch) = mutation(current.as_ref()) else {
            return Ok(false);
        };
        let record = merged(current.as_ref(), patch);
        Self::write(conn, key, &record).await?;
        Ok(true)
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn get(&self, key: &JobKey) -> Result<Option<JobRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::read(&mut conn, key).await
    }

    async fn transact<'a>(
        &'a self,
        key: &'a JobKey,
        mutation: Mutation<'a>,
    ) -> Result<bool, StoreError> {
        // An unfinished transaction rolls back when dropped, including after
        // a failed COMMIT and when this future is cancelled
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        match Self::read_modify_write(&mut tx, key, mutation).await {
            Ok(wrote) => {
                tx.commit().await?;
                Ok(wrote)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(key = %key, error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

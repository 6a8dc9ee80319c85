//! Repository for the `job_locks` table.
//!
//! Mutual exclusion across orchestrator invocations. Acquisition is a
//! conditional insert against the `job_name` primary key: exactly one of
//! two concurrent acquirers can insert, the other observes the conflict
//! and backs off. Expiry is wall-clock (no lease renewal): a run must
//! finish within its TTL or a later acquirer may reclaim the lock.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::lock::JobLock;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "job_name, lock_id, acquired_at, expires_at";

/// Provides acquire/release operations for named job locks.
pub struct LockRepo;

impl LockRepo {
    /// Try to acquire the lock for `job_name` with the given TTL.
    ///
    /// Any expired row for the name is cleared first, then a single
    /// `INSERT ... ON CONFLICT DO NOTHING` attempts the acquisition.
    /// Returns `None` when another non-expired holder exists, which is expected
    /// contention, not an error.
    pub async fn acquire(
        pool: &PgPool,
        job_name: &str,
        lock_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<Option<JobLock>, sqlx::Error> {
        // Reclaim: anyone may delete an expired row and retry.
        let reclaimed =
            sqlx::query("DELETE FROM job_locks WHERE job_name = $1 AND expires_at < NOW()")
                .bind(job_name)
                .execute(pool)
                .await?;
        if reclaimed.rows_affected() > 0 {
            tracing::warn!(job_name, "Reclaimed an expired lock");
        }

        let query = format!(
            "INSERT INTO job_locks (job_name, lock_id, expires_at)
             VALUES ($1, $2, NOW() + make_interval(secs => $3::double precision))
             ON CONFLICT (job_name) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobLock>(&query)
            .bind(job_name)
            .bind(lock_id)
            .bind(ttl_seconds)
            .fetch_optional(pool)
            .await
    }

    /// Release the lock, but only if `lock_id` still matches.
    ///
    /// The identifier check defends against deleting a lock that a third
    /// party reclaimed after our TTL expired mid-run. Returns `true` if a
    /// row was deleted.
    pub async fn release(
        pool: &PgPool,
        job_name: &str,
        lock_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM job_locks WHERE job_name = $1 AND lock_id = $2")
            .bind(job_name)
            .bind(lock_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Look up the current lock row for a job name, if any.
    pub async fn find(pool: &PgPool, job_name: &str) -> Result<Option<JobLock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_locks WHERE job_name = $1");
        sqlx::query_as::<_, JobLock>(&query)
            .bind(job_name)
            .fetch_optional(pool)
            .await
    }

    /// Force a lock row's expiry into the past (test and ops tooling).
    pub async fn expire_now(pool: &PgPool, job_name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE job_locks SET expires_at = NOW() - INTERVAL '1 second' WHERE job_name = $1",
        )
        .bind(job_name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Distributed job lock model.

use reelforge_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `job_locks` table.
///
/// At most one row per `job_name` exists (primary key); a row whose
/// `expires_at` is in the past is reclaimable by any acquirer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobLock {
    pub job_name: String,
    /// Identifier proving ownership; release requires a matching value.
    pub lock_id: Uuid,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

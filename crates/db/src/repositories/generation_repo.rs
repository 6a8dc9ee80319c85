//! Repository for the `generation_requests` table.
//!
//! Rows are created when a request is dispatched to the provider and
//! updated only to record a terminal outcome once the orchestrator has
//! observed it via polling. The provider remains the source of truth for
//! in-flight status.

use reelforge_core::status::GenerationStatus;
use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::generation::GenerationRequest;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, provider_request_id, status_id, video_url, error_message, created_at, updated_at";

/// Provides operations for generation request bookkeeping.
pub struct GenerationRequestRepo;

impl GenerationRequestRepo {
    /// Record a freshly dispatched provider request.
    pub async fn create(
        pool: &PgPool,
        provider_request_id: &str,
    ) -> Result<GenerationRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_requests (provider_request_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationRequest>(&query)
            .bind(provider_request_id)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GenerationRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_requests WHERE id = $1");
        sqlx::query_as::<_, GenerationRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record an observed successful completion.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        video_url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generation_requests SET status_id = $2, video_url = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(GenerationStatus::Completed.id())
        .bind(video_url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record an observed failure.
    pub async fn mark_failed(pool: &PgPool, id: DbId, reason: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generation_requests SET status_id = $2, error_message = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(GenerationStatus::Failed.id())
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(())
    }
}

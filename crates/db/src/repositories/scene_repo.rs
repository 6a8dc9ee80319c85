//! Repository for the `scenes` table.
//!
//! Lifecycle mutations follow the same compare-and-swap discipline as
//! `ProjectRepo`: each UPDATE is guarded on the scene's expected current
//! status and a zero-row match is a silent guard rejection.

use reelforge_core::status::{SceneStatus, StatusId};
use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::scene::{CreateScene, Scene};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, project_id, scene_number, status_id, prompt, narration, \
    ai_generation_id, credit_cost, retry_count, \
    video_url, public_video_url, last_frame_url, duration_seconds, \
    error_message, completed_at, created_at, updated_at";

/// Provides operations for scenes.
pub struct SceneRepo;

impl SceneRepo {
    /// Insert a new scene in `pending`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateScene) -> Result<Scene, sqlx::Error> {
        let query = format!(
            "INSERT INTO scenes (project_id, scene_number, prompt, narration)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(input.project_id)
            .bind(input.scene_number)
            .bind(&input.prompt)
            .bind(&input.narration)
            .fetch_one(pool)
            .await
    }

    /// Find a scene by `(project, scene_number)`.
    pub async fn find_by_number(
        pool: &PgPool,
        project_id: DbId,
        scene_number: i32,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scenes WHERE project_id = $1 AND scene_number = $2"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(project_id)
            .bind(scene_number)
            .fetch_optional(pool)
            .await
    }

    /// List all scenes for a project in scene-number order.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Scene>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scenes WHERE project_id = $1 ORDER BY scene_number ASC"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Submit transition: `pending -> generating`.
    ///
    /// Records the dispatched generation request and the credit cost
    /// debited for it.
    pub async fn mark_generating(
        pool: &PgPool,
        id: DbId,
        ai_generation_id: DbId,
        credit_cost: i64,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes
             SET status_id = $3, ai_generation_id = $4, credit_cost = $5
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(SceneStatus::Pending.id())
            .bind(SceneStatus::Generating.id())
            .bind(ai_generation_id)
            .bind(credit_cost)
            .fetch_optional(pool)
            .await
    }

    /// Post-processing transition: `generating -> merging`.
    pub async fn begin_merging(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        Self::step(pool, id, SceneStatus::Generating, SceneStatus::Merging).await
    }

    /// Post-processing transition: `merging -> narrating`.
    pub async fn begin_narrating(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        Self::step(pool, id, SceneStatus::Merging, SceneStatus::Narrating).await
    }

    async fn step(
        pool: &PgPool,
        id: DbId,
        from: SceneStatus,
        to: SceneStatus,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes SET status_id = $3
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .fetch_optional(pool)
            .await
    }

    /// Finalize a scene with its generated outputs.
    ///
    /// Accepts any of the in-flight post-processing statuses as the source
    /// so an interrupted finalize can be resumed.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        video_url: &str,
        public_video_url: &str,
        last_frame_url: Option<&str>,
        duration_seconds: Option<f64>,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let sources: Vec<StatusId> = [
            SceneStatus::Generating,
            SceneStatus::Merging,
            SceneStatus::Narrating,
        ]
        .iter()
        .map(|s| s.id())
        .collect();
        let query = format!(
            "UPDATE scenes
             SET status_id = $3, video_url = $4, public_video_url = $5,
                 last_frame_url = $6, duration_seconds = $7,
                 error_message = NULL, completed_at = NOW()
             WHERE id = $1 AND status_id = ANY($2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(&sources)
            .bind(SceneStatus::Completed.id())
            .bind(video_url)
            .bind(public_video_url)
            .bind(last_frame_url)
            .bind(duration_seconds)
            .fetch_optional(pool)
            .await
    }

    /// Retry transition: `generating -> pending`.
    ///
    /// Increments `retry_count` and clears the request reference. The
    /// debited credit is deliberately not touched here; refunds are a
    /// distinct, explicit operation on the failure handler.
    pub async fn return_to_pending(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes
             SET status_id = $3, ai_generation_id = NULL,
                 retry_count = retry_count + 1
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(SceneStatus::Generating.id())
            .bind(SceneStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Record a failed submission attempt on a still-`pending` scene.
    ///
    /// The scene never left `pending`, but the attempt counts against the
    /// retry budget.
    pub async fn record_submit_failure(
        pool: &PgPool,
        id: DbId,
        message: &str,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes
             SET retry_count = retry_count + 1, error_message = $3
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(SceneStatus::Pending.id())
            .bind(message)
            .fetch_optional(pool)
            .await
    }

    /// Fail a scene terminally with an error message.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        message: &str,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let sources: Vec<StatusId> = [SceneStatus::Pending, SceneStatus::Generating]
            .iter()
            .map(|s| s.id())
            .collect();
        let query = format!(
            "UPDATE scenes SET status_id = $3, error_message = $4
             WHERE id = $1 AND status_id = ANY($2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(&sources)
            .bind(SceneStatus::Failed.id())
            .bind(message)
            .fetch_optional(pool)
            .await
    }

    /// Cancel sweep: every scene not yet `completed` becomes `skipped`.
    ///
    /// Returns the number of scenes swept.
    pub async fn skip_unfinished(pool: &PgPool, project_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scenes SET status_id = $3
             WHERE project_id = $1 AND status_id <> $2 AND status_id <> $3",
        )
        .bind(project_id)
        .bind(SceneStatus::Completed.id())
        .bind(SceneStatus::Skipped.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Count completed scenes for a project (invariant checks, assembly).
    pub async fn count_completed(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM scenes WHERE project_id = $1 AND status_id = $2",
        )
        .bind(project_id)
        .bind(SceneStatus::Completed.id())
        .fetch_one(pool)
        .await
    }
}

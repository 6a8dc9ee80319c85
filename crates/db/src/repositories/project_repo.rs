//! Repository for the `projects` table.
//!
//! Every lifecycle mutation here is a compare-and-swap on the current
//! status: the `WHERE status_id = ANY(...)` guard makes a stale caller's
//! update match zero rows instead of clobbering concurrent state. Callers
//! treat a `None`/`false` result as "guard rejected", not as an error.

use reelforge_core::status::{ProjectStatus, StatusId};
use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, owner_id, title, status_id, generation_model, \
    current_scene, total_scenes, completed_scenes, \
    spent_credits, estimated_credits, \
    final_video_url, error_message, \
    created_at, updated_at, completed_at";

/// Provides operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `draft`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (owner_id, title, generation_model, total_scenes, estimated_credits)
             VALUES ($1, $2, COALESCE($3, 'standard'), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(&input.generation_model)
            .bind(input.total_scenes)
            .bind(input.estimated_credits)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects currently in `generating`, longest-waiting first.
    ///
    /// `updated_at ASC` gives fairness: a project bumped by this run drops
    /// to the back of the queue for the next one.
    pub async fn list_in_generation(pool: &PgPool, limit: i64) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE status_id = $1
             ORDER BY updated_at ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(ProjectStatus::Generating.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count how many projects an owner currently has in `generating`.
    pub async fn count_generating_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects WHERE owner_id = $1 AND status_id = $2",
        )
        .bind(owner_id)
        .bind(ProjectStatus::Generating.id())
        .fetch_one(pool)
        .await
    }

    /// Compare-and-swap the project status.
    ///
    /// Matches only if the row's current status is in `from`; returns the
    /// updated row, or `None` when the guard rejected (row unchanged).
    pub async fn try_transition(
        pool: &PgPool,
        id: DbId,
        from: &[ProjectStatus],
        to: ProjectStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        let from_ids: Vec<StatusId> = from.iter().map(|s| s.id()).collect();
        let query = format!(
            "UPDATE projects SET status_id = $3
             WHERE id = $1 AND status_id = ANY($2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&from_ids)
            .bind(to.id())
            .fetch_optional(pool)
            .await
    }

    /// Pause a generating project with a user-facing message, preserving
    /// all progress fields.
    pub async fn pause_with_error(
        pool: &PgPool,
        id: DbId,
        message: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $3, error_message = $4
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Generating.id())
            .bind(ProjectStatus::Paused.id())
            .bind(message)
            .fetch_optional(pool)
            .await
    }

    /// Resume a paused project, clearing the pause reason.
    pub async fn resume(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $3, error_message = NULL
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Paused.id())
            .bind(ProjectStatus::Generating.id())
            .fetch_optional(pool)
            .await
    }

    /// Fail a generating project with a terminal error message.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        message: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $3, error_message = $4, completed_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Generating.id())
            .bind(ProjectStatus::Failed.id())
            .bind(message)
            .fetch_optional(pool)
            .await
    }

    /// Complete a generating project, recording the assembled movie URL.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        final_video_url: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET status_id = $3, final_video_url = $4, error_message = NULL,
                 completed_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Generating.id())
            .bind(ProjectStatus::Completed.id())
            .bind(final_video_url)
            .fetch_optional(pool)
            .await
    }

    /// Record one scene's completion on the project row.
    ///
    /// Advances the scene pointer (clamped at `total_scenes`), increments
    /// the completed count, and accumulates the scene's credit cost, all
    /// in one statement. The guard matches only while the pointer still
    /// sits on `scene_number` with progress remaining, so a racing stale
    /// run recording the same scene matches zero rows instead of
    /// double-counting it.
    pub async fn record_scene_completed(
        pool: &PgPool,
        id: DbId,
        scene_number: i32,
        credit_cost: i64,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET completed_scenes = completed_scenes + 1,
                 current_scene = LEAST(current_scene + 1, total_scenes),
                 spent_credits = spent_credits + $3
             WHERE id = $1 AND status_id = $2
               AND current_scene = $4
               AND completed_scenes < total_scenes
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Generating.id())
            .bind(credit_cost)
            .bind(scene_number)
            .fetch_optional(pool)
            .await
    }

    /// Bump `updated_at` so a serviced-but-still-waiting project yields its
    /// place in the fairness ordering.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

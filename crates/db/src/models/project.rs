//! Project entity model and DTOs.

use reelforge_core::status::StatusId;
use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub status_id: StatusId,
    pub generation_model: String,
    // -- Generation progress --
    /// 1-indexed pointer to the next scene to process.
    pub current_scene: i32,
    pub total_scenes: i32,
    pub completed_scenes: i32,
    // -- Credit accounting --
    pub spent_credits: i64,
    pub estimated_credits: i64,
    // -- Outcome --
    pub final_video_url: Option<String>,
    pub error_message: Option<String>,
    // -- Timestamps --
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for creating a new project (always starts in `draft`).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub owner_id: DbId,
    pub title: String,
    /// Defaults to `standard` if omitted.
    pub generation_model: Option<String>,
    pub total_scenes: i32,
    pub estimated_credits: i64,
}

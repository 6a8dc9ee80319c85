//! Scene entity model and DTOs.

use reelforge_core::status::StatusId;
use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `scenes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scene {
    pub id: DbId,
    pub project_id: DbId,
    /// 1-indexed, unique per project.
    pub scene_number: i32,
    pub status_id: StatusId,
    pub prompt: String,
    pub narration: Option<String>,
    // -- Generation state --
    /// FK into `generation_requests` while a request is in flight.
    pub ai_generation_id: Option<DbId>,
    pub credit_cost: i64,
    pub retry_count: i32,
    // -- Outputs --
    pub video_url: Option<String>,
    pub public_video_url: Option<String>,
    /// Continuity anchor for the next scene; null when extraction failed.
    pub last_frame_url: Option<String>,
    pub duration_seconds: Option<f64>,
    pub error_message: Option<String>,
    // -- Timestamps --
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new scene (always starts in `pending`).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScene {
    pub project_id: DbId,
    pub scene_number: i32,
    pub prompt: String,
    pub narration: Option<String>,
}

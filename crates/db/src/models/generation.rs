//! Generation request bookkeeping model.
//!
//! One row per dispatched provider request. The authoritative status of an
//! in-flight request always comes from polling the provider; the row keeps
//! the provider request ID and records the terminal outcome once observed.

use reelforge_core::status::StatusId;
use reelforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `generation_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationRequest {
    pub id: DbId,
    /// Opaque request ID issued by the generation provider.
    pub provider_request_id: String,
    pub status_id: StatusId,
    pub video_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

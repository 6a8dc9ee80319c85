use reelforge_core::error::CoreError;
use reelforge_provider::{ProviderError, StorageError};

/// Errors surfaced by the orchestrator and control operations.
///
/// Expected business conditions (lock contention, guard rejections,
/// insufficient credits) are *not* errors; they are modeled in
/// [`crate::RunSummary`] and [`crate::ControlOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Generation provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Project {project_id} has no scene {scene_number}")]
    MissingScene { project_id: i64, scene_number: i32 },

    #[error("Scene {scene_id} references no generation request")]
    MissingGeneration { scene_id: i64 },
}

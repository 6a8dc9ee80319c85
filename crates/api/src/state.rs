use std::sync::Arc;

use reelforge_pipeline::SceneProcessor;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: reelforge_db::DbPool,
    /// The orchestrator, shared with the scheduler loop.
    pub processor: Arc<SceneProcessor>,
}

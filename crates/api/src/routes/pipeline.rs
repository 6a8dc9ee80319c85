use axum::extract::State;
use axum::{routing::post, Json, Router};

use reelforge_pipeline::RunSummary;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /internal/pipeline/run -- trigger one orchestrator invocation.
///
/// This is the scheduler's entry point (and an operator's escape hatch);
/// it is not part of the public API. Returns the run's counters, or the
/// contended summary when another invocation holds the lock.
async fn run_pipeline(State(state): State<AppState>) -> AppResult<Json<RunSummary>> {
    let summary = state.processor.run_once().await?;
    Ok(Json(summary))
}

/// Mount the internal pipeline trigger routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/internal/pipeline/run", post(run_pipeline))
}

//! User-facing lifecycle operations on projects.
//!
//! Every operation is a guarded transition: the caller's intent is applied
//! only when the project is in a state that allows it, and a rejected
//! guard is reported as an outcome rather than an error.

use sqlx::PgPool;

use reelforge_core::credits::GenerationModel;
use reelforge_core::error::CoreError;
use reelforge_core::project_state::{
    CANCEL_SOURCES, MAX_ACTIVE_PROJECTS_PER_OWNER, MIN_CREDITS_TO_START, PAUSE_SOURCES,
    SCRIPT_SOURCES, START_SOURCES,
};
use reelforge_core::status::ProjectStatus;
use reelforge_core::types::DbId;
use reelforge_db::models::project::Project;
use reelforge_db::repositories::{CreditRepo, ProjectRepo, SceneRepo};

use crate::error::PipelineError;

/// Result of a control operation.
#[derive(Debug)]
pub enum ControlOutcome {
    /// The transition was applied; the updated project row is returned.
    Applied(Project),
    /// A guard rejected the request. The reason is user-presentable.
    Rejected(String),
}

impl ControlOutcome {
    fn rejected(reason: impl Into<String>) -> Self {
        ControlOutcome::Rejected(reason.into())
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ControlOutcome::Applied(_))
    }
}

/// Begin script generation for a draft project.
pub async fn begin_script_generation(
    pool: &PgPool,
    project_id: DbId,
) -> Result<ControlOutcome, PipelineError> {
    transition(pool, project_id, SCRIPT_SOURCES, ProjectStatus::ScriptGenerating).await
}

/// Record that the project's script and scene breakdown are ready.
pub async fn mark_script_ready(
    pool: &PgPool,
    project_id: DbId,
) -> Result<ControlOutcome, PipelineError> {
    transition(
        pool,
        project_id,
        &[ProjectStatus::ScriptGenerating],
        ProjectStatus::ScriptReady,
    )
    .await
}

/// Start movie generation.
///
/// Beyond the status guard, the owner must hold at least the minimum
/// balance and stay under the concurrent-project cap. Guards are checked
/// before the transition so a rejection leaves the project untouched.
pub async fn start_generation(
    pool: &PgPool,
    project_id: DbId,
) -> Result<ControlOutcome, PipelineError> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(PipelineError::Core(CoreError::NotFound {
            entity: "project",
            id: project_id,
        }))?;

    // Validate the stored model up front so a bad row is caught here and
    // not mid-pipeline.
    GenerationModel::parse(&project.generation_model)?;

    let balance = CreditRepo::balance(pool, project.owner_id).await?;
    if balance < MIN_CREDITS_TO_START {
        return Ok(ControlOutcome::rejected(format!(
            "At least {MIN_CREDITS_TO_START} credits are required to start \
             generation; current balance is {balance}",
        )));
    }

    let active = ProjectRepo::count_generating_for_owner(pool, project.owner_id).await?;
    if active >= MAX_ACTIVE_PROJECTS_PER_OWNER {
        return Ok(ControlOutcome::rejected(format!(
            "At most {MAX_ACTIVE_PROJECTS_PER_OWNER} projects can generate \
             at the same time",
        )));
    }

    transition(pool, project_id, START_SOURCES, ProjectStatus::Generating).await
}

/// Pause a generating project. Progress is preserved.
pub async fn pause(pool: &PgPool, project_id: DbId) -> Result<ControlOutcome, PipelineError> {
    transition(pool, project_id, PAUSE_SOURCES, ProjectStatus::Paused).await
}

/// Resume a paused project from its current scene.
///
/// Clears the pause reason; the next orchestrator run picks the project
/// up where it left off.
pub async fn resume(pool: &PgPool, project_id: DbId) -> Result<ControlOutcome, PipelineError> {
    match ProjectRepo::resume(pool, project_id).await? {
        Some(project) => {
            tracing::info!(
                project_id,
                current_scene = project.current_scene,
                "Project resumed",
            );
            Ok(ControlOutcome::Applied(project))
        }
        None => Ok(ControlOutcome::rejected("Only a paused project can be resumed")),
    }
}

/// Cancel a project and sweep its unfinished scenes to `skipped`.
///
/// The sweep runs only after the cancel transition is accepted, so a
/// concurrent completion wins cleanly over a late cancel.
pub async fn cancel(pool: &PgPool, project_id: DbId) -> Result<ControlOutcome, PipelineError> {
    match ProjectRepo::try_transition(pool, project_id, CANCEL_SOURCES, ProjectStatus::Cancelled)
        .await?
    {
        Some(project) => {
            let swept = SceneRepo::skip_unfinished(pool, project_id).await?;
            tracing::info!(project_id, swept, "Project cancelled");
            Ok(ControlOutcome::Applied(project))
        }
        None => Ok(ControlOutcome::rejected(
            "Project is not in a cancellable state",
        )),
    }
}

async fn transition(
    pool: &PgPool,
    project_id: DbId,
    from: &[ProjectStatus],
    to: ProjectStatus,
) -> Result<ControlOutcome, PipelineError> {
    match ProjectRepo::try_transition(pool, project_id, from, to).await? {
        Some(project) => {
            tracing::info!(project_id, status = to.name(), "Project transitioned");
            Ok(ControlOutcome::Applied(project))
        }
        None => Ok(ControlOutcome::rejected(format!(
            "Project cannot move to {} from its current state",
            to.name()
        ))),
    }
}

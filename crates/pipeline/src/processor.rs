//! The orchestrator loop.
//!
//! One invocation advances each `generating` project by exactly one scene
//! step: either a submission or a completion check, never both. The
//! provider's asynchrony is absorbed by the scheduler's periodicity, not
//! by waiting; a run holds the distributed lock for its whole duration
//! and releases it on every exit path.
//!
//! Credit accounting: a scene's model-dependent cost is debited at
//! submission. The debit is refunded only when the `submit` call itself
//! fails; once the provider has issued a request ID, its work may have
//! started and the credit stays spent even if the generation later fails
//! and the scene retries.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use reelforge_core::continuity::{self, PredecessorScene};
use reelforge_core::credits::GenerationModel;
use reelforge_core::scene_state::{retry_decision, RetryDecision, MAX_SCENE_RETRIES};
use reelforge_core::status::SceneStatus;
use reelforge_db::models::project::Project;
use reelforge_db::models::scene::Scene;
use reelforge_db::repositories::{
    CreditRepo, GenerationRequestRepo, LockRepo, ProjectRepo, SceneRepo,
};
use reelforge_provider::{GenerationPoll, GenerationProvider, MaterializedVideo, MediaStorage, SubmitScene};

use crate::error::PipelineError;
use crate::summary::RunSummary;

/// Lock name guarding the orchestrator against overlapping invocations.
pub const PROCESS_MOVIE_SCENES: &str = "process_movie_scenes";

/// Maximum projects serviced per invocation.
const DEFAULT_BATCH_SIZE: i64 = 10;

/// Lock TTL. A run must finish within this window; there is no lease
/// renewal, so a longer run can have its lock reclaimed and relies on the
/// CAS guards to stay correct.
const DEFAULT_LOCK_TTL_SECS: i64 = 300;

/// The periodically-invoked scene pipeline driver.
pub struct SceneProcessor {
    pool: PgPool,
    provider: Arc<dyn GenerationProvider>,
    storage: Arc<dyn MediaStorage>,
    batch_size: i64,
    lock_ttl_seconds: i64,
}

impl SceneProcessor {
    /// Create a processor with the default batch size and lock TTL.
    pub fn new(
        pool: PgPool,
        provider: Arc<dyn GenerationProvider>,
        storage: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            pool,
            provider,
            storage,
            batch_size: DEFAULT_BATCH_SIZE,
            lock_ttl_seconds: DEFAULT_LOCK_TTL_SECS,
        }
    }

    /// Override the batch size and lock TTL.
    pub fn with_limits(mut self, batch_size: i64, lock_ttl_seconds: i64) -> Self {
        self.batch_size = batch_size;
        self.lock_ttl_seconds = lock_ttl_seconds;
        self
    }

    /// Execute one orchestrator invocation.
    ///
    /// Exits cleanly (no error, nothing logged above debug) when another
    /// invocation holds the lock. The lock is released on every path out
    /// of the batch, including batch-level errors.
    pub async fn run_once(&self) -> Result<RunSummary, PipelineError> {
        let lock_id = Uuid::new_v4();
        let acquired = LockRepo::acquire(
            &self.pool,
            PROCESS_MOVIE_SCENES,
            lock_id,
            self.lock_ttl_seconds,
        )
        .await?;
        if acquired.is_none() {
            tracing::debug!("Another orchestrator run holds the lock; backing off");
            return Ok(RunSummary::contended());
        }

        let result = self.process_batch().await;

        if let Err(e) = LockRepo::release(&self.pool, PROCESS_MOVIE_SCENES, lock_id).await {
            tracing::error!(error = %e, "Failed to release orchestrator lock");
        }

        result
    }

    /// Service every project in the batch, isolating failures per project.
    async fn process_batch(&self) -> Result<RunSummary, PipelineError> {
        let projects = ProjectRepo::list_in_generation(&self.pool, self.batch_size).await?;
        let mut summary = RunSummary::default();

        for project in &projects {
            match self.process_project(project, &mut summary).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    // One project's failure never aborts the rest of the
                    // batch; the scene will be revisited next invocation.
                    tracing::warn!(
                        project_id = project.id,
                        scene_number = project.current_scene,
                        error = %e,
                        "Scene step failed; skipping project for this run",
                    );
                }
            }
        }

        if summary.processed > 0 {
            tracing::info!(
                processed = summary.processed,
                completed = summary.completed,
                failed = summary.failed,
                paused = summary.paused,
                "Orchestrator run finished",
            );
        }
        Ok(summary)
    }

    /// Advance one project by exactly one scene step.
    async fn process_project(
        &self,
        project: &Project,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        // A project whose scenes are all done but which is still
        // `generating` had its final assembly interrupted; retry it.
        if project.completed_scenes >= project.total_scenes {
            return self.finish_project(project, summary).await;
        }

        let scene = SceneRepo::find_by_number(&self.pool, project.id, project.current_scene)
            .await?
            .ok_or(PipelineError::MissingScene {
                project_id: project.id,
                scene_number: project.current_scene,
            })?;

        match SceneStatus::from_id(scene.status_id) {
            Some(SceneStatus::Pending) => self.submit_scene(project, &scene, summary).await,
            Some(SceneStatus::Generating) => self.poll_scene(project, &scene, summary).await,
            Some(SceneStatus::Merging) | Some(SceneStatus::Narrating) => {
                self.resume_finalize(project, &scene, summary).await
            }
            Some(SceneStatus::Completed) => {
                // Completed scene under the pointer means the project-side
                // bookkeeping of a previous run was interrupted; repair it.
                self.advance_after_completion(project, &scene, summary).await
            }
            other => {
                tracing::warn!(
                    project_id = project.id,
                    scene_id = scene.id,
                    status = ?other,
                    "Current scene in unexpected status; nothing to do",
                );
                ProjectRepo::touch(&self.pool, project.id).await?;
                Ok(())
            }
        }
    }

    /// Pending step: fail on an exhausted retry budget, otherwise debit
    /// and dispatch a generation request.
    async fn submit_scene(
        &self,
        project: &Project,
        scene: &Scene,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        if retry_decision(scene.retry_count) == RetryDecision::Exhausted {
            return self.fail_scene_and_project(project, scene, summary).await;
        }

        let reference_frame = self.resolve_continuity(project, scene).await?;

        let model = GenerationModel::parse(&project.generation_model)?;
        let cost = model.scene_cost();

        if !CreditRepo::debit(&self.pool, project.owner_id, cost).await? {
            let message = format!(
                "Insufficient credits for scene {} ({cost} needed). \
                 Top up your balance and resume to continue.",
                scene.scene_number
            );
            if ProjectRepo::pause_with_error(&self.pool, project.id, &message)
                .await?
                .is_some()
            {
                summary.paused += 1;
                tracing::info!(
                    project_id = project.id,
                    scene_number = scene.scene_number,
                    "Project paused: insufficient credits",
                );
            }
            return Ok(());
        }

        let submission = SubmitScene {
            prompt: &scene.prompt,
            reference_frame_url: reference_frame.as_deref(),
            model: model.as_str(),
        };
        match self.provider.submit(submission).await {
            Ok(request_id) => {
                let generation = GenerationRequestRepo::create(&self.pool, &request_id).await?;
                let marked =
                    SceneRepo::mark_generating(&self.pool, scene.id, generation.id, cost).await?;
                if marked.is_none() {
                    // A concurrent (stale-lock) run advanced this scene
                    // first; our debit has no submission to pay for.
                    CreditRepo::credit(&self.pool, project.owner_id, cost).await?;
                    tracing::warn!(
                        project_id = project.id,
                        scene_id = scene.id,
                        "Submit guard rejected; debit refunded",
                    );
                    return Ok(());
                }
                ProjectRepo::touch(&self.pool, project.id).await?;
                tracing::info!(
                    project_id = project.id,
                    scene_number = scene.scene_number,
                    request_id = %request_id,
                    image_to_video = reference_frame.is_some(),
                    "Scene submitted for generation",
                );
            }
            Err(e) => {
                // Pre-dispatch failure: no provider work started, so this
                // is the one refundable case. The attempt still counts
                // against the retry budget.
                CreditRepo::credit(&self.pool, project.owner_id, cost).await?;
                SceneRepo::record_submit_failure(&self.pool, scene.id, &e.to_string()).await?;
                ProjectRepo::touch(&self.pool, project.id).await?;
                tracing::warn!(
                    project_id = project.id,
                    scene_number = scene.scene_number,
                    error = %e,
                    "Generation submit failed; debit refunded, attempt recorded",
                );
            }
        }
        Ok(())
    }

    /// Look up the previous scene and resolve the continuity frame.
    async fn resolve_continuity(
        &self,
        project: &Project,
        scene: &Scene,
    ) -> Result<Option<String>, PipelineError> {
        let predecessor = if scene.scene_number > 1 {
            SceneRepo::find_by_number(&self.pool, project.id, scene.scene_number - 1)
                .await?
                .map(|prev| PredecessorScene {
                    status_id: prev.status_id,
                    last_frame_url: prev.last_frame_url,
                })
        } else {
            None
        };
        Ok(
            continuity::resolve_reference_frame(scene.scene_number, predecessor.as_ref())
                .map(String::from),
        )
    }

    /// Generating step: one non-blocking status check.
    async fn poll_scene(
        &self,
        project: &Project,
        scene: &Scene,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let generation_id = scene
            .ai_generation_id
            .ok_or(PipelineError::MissingGeneration { scene_id: scene.id })?;
        let generation = GenerationRequestRepo::find_by_id(&self.pool, generation_id)
            .await?
            .ok_or(PipelineError::MissingGeneration { scene_id: scene.id })?;

        match self.provider.poll(&generation.provider_request_id).await? {
            GenerationPoll::Pending => {
                ProjectRepo::touch(&self.pool, project.id).await?;
            }
            GenerationPoll::Completed { video_url } => {
                GenerationRequestRepo::mark_completed(&self.pool, generation.id, &video_url)
                    .await?;
                self.finalize_scene(project, scene, &video_url, summary).await?;
            }
            GenerationPoll::Failed { reason } => {
                GenerationRequestRepo::mark_failed(&self.pool, generation.id, &reason).await?;
                // Provider-side work had started: no refund. Back to
                // pending with the retry budget decremented.
                SceneRepo::return_to_pending(&self.pool, scene.id).await?;
                ProjectRepo::touch(&self.pool, project.id).await?;
                tracing::info!(
                    project_id = project.id,
                    scene_number = scene.scene_number,
                    retry_count = scene.retry_count + 1,
                    reason = %reason,
                    "Scene generation failed; queued for retry",
                );
            }
        }
        Ok(())
    }

    /// Completion path: materialize outputs, walk the post-processing
    /// stages, complete the scene, and advance the project.
    async fn finalize_scene(
        &self,
        project: &Project,
        scene: &Scene,
        video_url: &str,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let materialized = match self.storage.materialize(video_url).await {
            Ok(m) => m,
            Err(e) => {
                // Partial-pipeline failure: keep the raw URL, drop the
                // frame. The next scene degrades to text-to-video.
                tracing::warn!(
                    project_id = project.id,
                    scene_id = scene.id,
                    error = %e,
                    "Materialization failed; completing scene without frame",
                );
                MaterializedVideo {
                    public_video_url: video_url.to_string(),
                    last_frame_url: None,
                    duration_seconds: None,
                }
            }
        };

        // Narrated scenes pass through merging/narrating as recorded row
        // states so an interrupted finalize can resume; the narration mix
        // itself happens outside this system.
        if scene.narration.is_some() {
            let status = SceneStatus::from_id(scene.status_id);
            if status == Some(SceneStatus::Generating) {
                SceneRepo::begin_merging(&self.pool, scene.id).await?;
                SceneRepo::begin_narrating(&self.pool, scene.id).await?;
            } else if status == Some(SceneStatus::Merging) {
                SceneRepo::begin_narrating(&self.pool, scene.id).await?;
            }
        }

        let completed = SceneRepo::complete(
            &self.pool,
            scene.id,
            video_url,
            &materialized.public_video_url,
            materialized.last_frame_url.as_deref(),
            materialized.duration_seconds,
        )
        .await?;

        match completed {
            Some(completed) => {
                tracing::info!(
                    project_id = project.id,
                    scene_number = completed.scene_number,
                    has_frame = completed.last_frame_url.is_some(),
                    "Scene completed",
                );
                self.advance_after_completion(project, &completed, summary).await
            }
            // Guard rejected: the project was cancelled mid-flight and the
            // sweep already skipped this scene.
            None => Ok(()),
        }
    }

    /// Resume a finalize that was interrupted between post-processing
    /// stages. The generation row already holds the video URL.
    async fn resume_finalize(
        &self,
        project: &Project,
        scene: &Scene,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let generation_id = scene
            .ai_generation_id
            .ok_or(PipelineError::MissingGeneration { scene_id: scene.id })?;
        let generation = GenerationRequestRepo::find_by_id(&self.pool, generation_id)
            .await?
            .ok_or(PipelineError::MissingGeneration { scene_id: scene.id })?;
        let video_url = generation
            .video_url
            .ok_or(PipelineError::MissingGeneration { scene_id: scene.id })?;

        self.finalize_scene(project, scene, &video_url, summary).await
    }

    /// Record the scene's completion on the project row and, when it was
    /// the last one, assemble the movie.
    ///
    /// The record is a compare-and-swap on the scene pointer: when a
    /// racing stale run already recorded this scene, the guard matches
    /// zero rows and nothing is counted twice.
    async fn advance_after_completion(
        &self,
        project: &Project,
        scene: &Scene,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let updated = ProjectRepo::record_scene_completed(
            &self.pool,
            project.id,
            scene.scene_number,
            scene.credit_cost,
        )
        .await?;

        if let Some(updated) = updated {
            if updated.completed_scenes >= updated.total_scenes {
                self.finish_project(&updated, summary).await?;
            }
        }
        Ok(())
    }

    /// All scenes done: compose the final movie and complete the project.
    async fn finish_project(
        &self,
        project: &Project,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let scenes = SceneRepo::list_by_project(&self.pool, project.id).await?;
        let scene_urls: Vec<String> = scenes
            .iter()
            .filter(|s| s.status_id == SceneStatus::Completed.id())
            .filter_map(|s| s.public_video_url.clone())
            .collect();

        let final_video_url = self.storage.compose_final(project.id, &scene_urls).await?;

        if ProjectRepo::mark_completed(&self.pool, project.id, &final_video_url)
            .await?
            .is_some()
        {
            summary.completed += 1;
            tracing::info!(
                project_id = project.id,
                scenes = scene_urls.len(),
                final_video_url = %final_video_url,
                "Movie completed",
            );
        }
        Ok(())
    }

    /// Terminal failure: the scene exhausted its retries, which fails the
    /// owning project in the same logical step.
    async fn fail_scene_and_project(
        &self,
        project: &Project,
        scene: &Scene,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let message = format!(
            "Scene {} failed after {MAX_SCENE_RETRIES} retries",
            scene.scene_number
        );
        SceneRepo::mark_failed(&self.pool, scene.id, &message).await?;
        if ProjectRepo::mark_failed(&self.pool, project.id, &message)
            .await?
            .is_some()
        {
            summary.failed += 1;
            tracing::warn!(
                project_id = project.id,
                scene_number = scene.scene_number,
                "Project failed: scene retry budget exhausted",
            );
        }
        Ok(())
    }
}

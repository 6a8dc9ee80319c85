//! Shared fixtures for orchestrator integration tests.
//!
//! The provider and storage collaborators are scripted fakes: tests queue
//! the outcomes they want and the fakes record every call, so assertions
//! can cover both the database state and the outbound traffic.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;

use reelforge_db::models::project::{CreateProject, Project};
use reelforge_db::models::scene::CreateScene;
use reelforge_db::models::user::User;
use reelforge_db::repositories::{CreditRepo, ProjectRepo, SceneRepo, UserRepo};
use reelforge_pipeline::control;
use reelforge_provider::{
    GenerationPoll, GenerationProvider, MaterializedVideo, MediaStorage, ProviderError,
    StorageError, SubmitScene,
};

/// One recorded `submit` call.
#[derive(Debug, Clone)]
pub struct RecordedSubmit {
    pub prompt: String,
    pub reference_frame_url: Option<String>,
    pub model: String,
}

/// Scripted generation provider.
///
/// `submit` hands out sequential request IDs (`req-1`, `req-2`, ...)
/// unless a failure was queued; `poll` pops scripted outcomes in order
/// and falls back to `Pending` when the script runs out.
#[derive(Default)]
pub struct MockProvider {
    next_id: AtomicU64,
    submit_failures: Mutex<VecDeque<String>>,
    polls: Mutex<VecDeque<GenerationPoll>>,
    submits: Mutex<Vec<RecordedSubmit>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_submit(&self, reason: &str) {
        self.submit_failures.lock().unwrap().push_back(reason.to_string());
    }

    pub fn push_poll(&self, outcome: GenerationPoll) {
        self.polls.lock().unwrap().push_back(outcome);
    }

    pub fn push_completed(&self, video_url: &str) {
        self.push_poll(GenerationPoll::Completed {
            video_url: video_url.to_string(),
        });
    }

    pub fn push_failed(&self, reason: &str) {
        self.push_poll(GenerationPoll::Failed {
            reason: reason.to_string(),
        });
    }

    pub fn submissions(&self) -> Vec<RecordedSubmit> {
        self.submits.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn submit(&self, scene: SubmitScene<'_>) -> Result<String, ProviderError> {
        if let Some(reason) = self.submit_failures.lock().unwrap().pop_front() {
            return Err(ProviderError::Rejected(reason));
        }
        self.submits.lock().unwrap().push(RecordedSubmit {
            prompt: scene.prompt.to_string(),
            reference_frame_url: scene.reference_frame_url.map(str::to_string),
            model: scene.model.to_string(),
        });
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("req-{n}"))
    }

    async fn poll(&self, _request_id: &str) -> Result<GenerationPoll, ProviderError> {
        Ok(self
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GenerationPoll::Pending))
    }
}

/// Scripted media storage.
///
/// Materialization derives deterministic public and frame URLs from the
/// input; queued failures make the next `materialize` calls fail.
#[derive(Default)]
pub struct MockStorage {
    materialize_failures: Mutex<VecDeque<String>>,
    compose_calls: Mutex<Vec<(i64, Vec<String>)>>,
}

impl MockStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_materialize(&self, reason: &str) {
        self.materialize_failures
            .lock()
            .unwrap()
            .push_back(reason.to_string());
    }

    pub fn compose_calls(&self) -> Vec<(i64, Vec<String>)> {
        self.compose_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStorage for MockStorage {
    async fn materialize(&self, video_url: &str) -> Result<MaterializedVideo, StorageError> {
        if let Some(reason) = self.materialize_failures.lock().unwrap().pop_front() {
            return Err(StorageError::Failed(reason));
        }
        Ok(MaterializedVideo {
            public_video_url: format!("{video_url}?public=1"),
            last_frame_url: Some(format!("{video_url}#last-frame")),
            duration_seconds: Some(8.0),
        })
    }

    async fn compose_final(
        &self,
        project_id: i64,
        scene_urls: &[String],
    ) -> Result<String, StorageError> {
        self.compose_calls
            .lock()
            .unwrap()
            .push((project_id, scene_urls.to_vec()));
        Ok(format!("https://cdn.test/movies/{project_id}.mp4"))
    }
}

/// Create a user with the given starting balance.
pub async fn seed_user(pool: &PgPool, email: &str, credits: i64) -> User {
    let user = UserRepo::create(pool, email).await.unwrap();
    if credits > 0 {
        CreditRepo::credit(pool, user.id, credits).await.unwrap();
    }
    user
}

/// Create a project with `total_scenes` scripted scenes, every odd scene
/// carrying narration, and walk it through the script phase into
/// `generating`.
pub async fn seed_generating_project(
    pool: &PgPool,
    owner_id: i64,
    title: &str,
    model: &str,
    total_scenes: i32,
) -> Project {
    let project = seed_ready_project(pool, owner_id, title, model, total_scenes).await;
    let outcome = control::start_generation(pool, project.id).await.unwrap();
    assert!(outcome.is_applied(), "seed project failed to start");
    ProjectRepo::find_by_id(pool, project.id)
        .await
        .unwrap()
        .unwrap()
}

/// Create a project with its scenes and walk it to `script_ready`.
pub async fn seed_ready_project(
    pool: &PgPool,
    owner_id: i64,
    title: &str,
    model: &str,
    total_scenes: i32,
) -> Project {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            owner_id,
            title: title.to_string(),
            generation_model: Some(model.to_string()),
            total_scenes,
            estimated_credits: 0,
        },
    )
    .await
    .unwrap();

    control::begin_script_generation(pool, project.id).await.unwrap();
    control::mark_script_ready(pool, project.id).await.unwrap();

    for n in 1..=total_scenes {
        SceneRepo::create(
            pool,
            &CreateScene {
                project_id: project.id,
                scene_number: n,
                prompt: format!("{title} scene {n}"),
                narration: (n % 2 == 1).then(|| format!("narration {n}")),
            },
        )
        .await
        .unwrap();
    }

    project
}

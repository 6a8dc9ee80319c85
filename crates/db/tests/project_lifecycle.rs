//! Integration tests for project/scene compare-and-swap transitions and
//! progress bookkeeping.

use reelforge_core::project_state;
use reelforge_core::status::{ProjectStatus, SceneStatus};
use sqlx::PgPool;

use reelforge_db::models::project::CreateProject;
use reelforge_db::models::scene::CreateScene;
use reelforge_db::repositories::{ProjectRepo, SceneRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_project(pool: &PgPool, total_scenes: i32) -> reelforge_db::models::project::Project {
    let owner = UserRepo::create(pool, "director@example.com").await.unwrap();
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            owner_id: owner.id,
            title: "Desert chase".to_string(),
            generation_model: None,
            total_scenes,
            estimated_credits: 5 * i64::from(total_scenes),
        },
    )
    .await
    .unwrap();

    for n in 1..=total_scenes {
        SceneRepo::create(
            pool,
            &CreateScene {
                project_id: project.id,
                scene_number: n,
                prompt: format!("Scene {n}"),
                narration: None,
            },
        )
        .await
        .unwrap();
    }
    project
}

/// Walk a fresh project to `generating` through the legal transitions.
async fn into_generating(pool: &PgPool, id: i64) {
    ProjectRepo::try_transition(pool, id, project_state::SCRIPT_SOURCES, ProjectStatus::ScriptGenerating)
        .await
        .unwrap()
        .unwrap();
    ProjectRepo::try_transition(pool, id, &[ProjectStatus::ScriptGenerating], ProjectStatus::ScriptReady)
        .await
        .unwrap()
        .unwrap();
    ProjectRepo::try_transition(pool, id, project_state::START_SOURCES, ProjectStatus::Generating)
        .await
        .unwrap()
        .unwrap();
}

// ---------------------------------------------------------------------------
// CAS guard behaviour
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn transition_from_wrong_source_is_a_silent_no_op(pool: PgPool) {
    let project = new_project(&pool, 2).await;

    // A draft project cannot be paused; the row must be unchanged.
    let rejected = ProjectRepo::try_transition(
        &pool,
        project.id,
        project_state::PAUSE_SOURCES,
        ProjectStatus::Paused,
    )
    .await
    .unwrap();
    assert!(rejected.is_none());

    let row = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(row.status_id, ProjectStatus::Draft.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn double_cancel_matches_only_once(pool: PgPool) {
    let project = new_project(&pool, 2).await;
    into_generating(&pool, project.id).await;

    let first = ProjectRepo::try_transition(
        &pool,
        project.id,
        project_state::CANCEL_SOURCES,
        ProjectStatus::Cancelled,
    )
    .await
    .unwrap();
    let second = ProjectRepo::try_transition(
        &pool,
        project.id,
        project_state::CANCEL_SOURCES,
        ProjectStatus::Cancelled,
    )
    .await
    .unwrap();

    assert!(first.is_some());
    assert!(second.is_none(), "a stale second cancel must guard-reject");
}

// ---------------------------------------------------------------------------
// Progress bookkeeping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn record_scene_completed_advances_all_progress_fields_together(pool: PgPool) {
    let project = new_project(&pool, 3).await;
    into_generating(&pool, project.id).await;

    let after_one = ProjectRepo::record_scene_completed(&pool, project.id, 1, 5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_one.completed_scenes, 1);
    assert_eq!(after_one.current_scene, 2);
    assert_eq!(after_one.spent_credits, 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn record_scene_completed_rejects_a_duplicate_record(pool: PgPool) {
    let project = new_project(&pool, 2).await;
    into_generating(&pool, project.id).await;

    let first = ProjectRepo::record_scene_completed(&pool, project.id, 1, 5)
        .await
        .unwrap();
    assert!(first.is_some());

    // A stale overlapping run re-recording scene 1 must match zero rows:
    // the pointer has moved on.
    let duplicate = ProjectRepo::record_scene_completed(&pool, project.id, 1, 5)
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let row = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(row.completed_scenes, 1);
    assert_eq!(row.spent_credits, 5);

    // The same protection holds at the final scene, where the pointer
    // clamps in place and only the remaining-progress guard can reject.
    ProjectRepo::record_scene_completed(&pool, project.id, 2, 5).await.unwrap().unwrap();
    let past_the_end = ProjectRepo::record_scene_completed(&pool, project.id, 2, 5)
        .await
        .unwrap();
    assert!(past_the_end.is_none());

    let row = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(row.completed_scenes, 2);
    assert_eq!(row.spent_credits, 10);
}

#[sqlx::test(migrations = "./migrations")]
async fn current_scene_clamps_at_total_scenes(pool: PgPool) {
    let project = new_project(&pool, 2).await;
    into_generating(&pool, project.id).await;

    ProjectRepo::record_scene_completed(&pool, project.id, 1, 5).await.unwrap();
    let done = ProjectRepo::record_scene_completed(&pool, project.id, 2, 5)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(done.completed_scenes, 2);
    assert_eq!(done.current_scene, 2, "pointer never exceeds total_scenes");
    assert_eq!(done.spent_credits, 10);
}

#[sqlx::test(migrations = "./migrations")]
async fn record_scene_completed_guards_on_generating(pool: PgPool) {
    let project = new_project(&pool, 2).await;

    // Still in draft: the bookkeeping update must reject.
    let rejected = ProjectRepo::record_scene_completed(&pool, project.id, 1, 5)
        .await
        .unwrap();
    assert!(rejected.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn pause_preserves_progress(pool: PgPool) {
    let project = new_project(&pool, 4).await;
    into_generating(&pool, project.id).await;
    ProjectRepo::record_scene_completed(&pool, project.id, 1, 5).await.unwrap();
    ProjectRepo::record_scene_completed(&pool, project.id, 2, 5).await.unwrap();
    ProjectRepo::record_scene_completed(&pool, project.id, 3, 5).await.unwrap();

    let paused = ProjectRepo::pause_with_error(&pool, project.id, "Insufficient credits")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paused.status_id, ProjectStatus::Paused.id());
    assert_eq!(paused.current_scene, 4);
    assert_eq!(paused.completed_scenes, 3);

    // Resume continues from the same pointer.
    let resumed = ProjectRepo::try_transition(
        &pool,
        project.id,
        project_state::RESUME_SOURCES,
        ProjectStatus::Generating,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(resumed.current_scene, 4);
    assert_eq!(resumed.completed_scenes, 3);
}

// ---------------------------------------------------------------------------
// Scene transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn retry_increments_count_and_clears_request(pool: PgPool) {
    let project = new_project(&pool, 1).await;
    let scene = SceneRepo::find_by_number(&pool, project.id, 1)
        .await
        .unwrap()
        .unwrap();

    let generation =
        reelforge_db::repositories::GenerationRequestRepo::create(&pool, "req-123")
            .await
            .unwrap();
    SceneRepo::mark_generating(&pool, scene.id, generation.id, 5)
        .await
        .unwrap()
        .unwrap();

    let retried = SceneRepo::return_to_pending(&pool, scene.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retried.status_id, SceneStatus::Pending.id());
    assert_eq!(retried.retry_count, 1);
    assert_eq!(retried.ai_generation_id, None);
    // The debit is not implicitly refunded on retry.
    assert_eq!(retried.credit_cost, 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn cancel_sweep_skips_everything_not_completed(pool: PgPool) {
    let project = new_project(&pool, 5).await;

    // Scene 1 completed, scene 2 in-flight, 3..5 pending.
    let s1 = SceneRepo::find_by_number(&pool, project.id, 1).await.unwrap().unwrap();
    let s2 = SceneRepo::find_by_number(&pool, project.id, 2).await.unwrap().unwrap();
    let g1 = reelforge_db::repositories::GenerationRequestRepo::create(&pool, "req-1")
        .await
        .unwrap();
    let g2 = reelforge_db::repositories::GenerationRequestRepo::create(&pool, "req-2")
        .await
        .unwrap();
    SceneRepo::mark_generating(&pool, s1.id, g1.id, 5).await.unwrap();
    SceneRepo::complete(&pool, s1.id, "v1.mp4", "https://cdn/v1.mp4", None, Some(5.0))
        .await
        .unwrap()
        .unwrap();
    SceneRepo::mark_generating(&pool, s2.id, g2.id, 5).await.unwrap();

    let swept = SceneRepo::skip_unfinished(&pool, project.id).await.unwrap();
    assert_eq!(swept, 4);

    let scenes = SceneRepo::list_by_project(&pool, project.id).await.unwrap();
    assert_eq!(scenes[0].status_id, SceneStatus::Completed.id());
    for scene in &scenes[1..] {
        assert_eq!(scene.status_id, SceneStatus::Skipped.id());
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_scene_number_is_rejected(pool: PgPool) {
    let project = new_project(&pool, 1).await;

    let duplicate = SceneRepo::create(
        &pool,
        &CreateScene {
            project_id: project.id,
            scene_number: 1,
            prompt: "Duplicate".to_string(),
            narration: None,
        },
    )
    .await;
    assert!(duplicate.is_err(), "uq_scenes_project_number must reject");
}

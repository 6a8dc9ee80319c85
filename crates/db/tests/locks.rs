//! Integration tests for the distributed job lock.
//!
//! Exercises mutual exclusion, wall-clock expiry reclaim, and the
//! identifier check on release against a real database.

use sqlx::PgPool;
use uuid::Uuid;

use reelforge_db::repositories::LockRepo;

const JOB: &str = "process_movie_scenes";

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn second_acquire_observes_busy(pool: PgPool) {
    let first = LockRepo::acquire(&pool, JOB, Uuid::new_v4(), 60)
        .await
        .unwrap();
    assert!(first.is_some());

    let second = LockRepo::acquire(&pool, JOB, Uuid::new_v4(), 60)
        .await
        .unwrap();
    assert!(second.is_none(), "a held lock must reject a second acquirer");
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_acquires_admit_exactly_one(pool: PgPool) {
    let (a, b) = tokio::join!(
        LockRepo::acquire(&pool, JOB, Uuid::new_v4(), 60),
        LockRepo::acquire(&pool, JOB, Uuid::new_v4(), 60),
    );
    let winners = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|r| r.is_some())
        .count();
    assert_eq!(winners, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn locks_for_different_jobs_are_independent(pool: PgPool) {
    let a = LockRepo::acquire(&pool, "job_a", Uuid::new_v4(), 60)
        .await
        .unwrap();
    let b = LockRepo::acquire(&pool, "job_b", Uuid::new_v4(), 60)
        .await
        .unwrap();
    assert!(a.is_some());
    assert!(b.is_some());
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn release_with_matching_id_frees_the_lock(pool: PgPool) {
    let lock_id = Uuid::new_v4();
    LockRepo::acquire(&pool, JOB, lock_id, 60).await.unwrap();

    assert!(LockRepo::release(&pool, JOB, lock_id).await.unwrap());

    let reacquired = LockRepo::acquire(&pool, JOB, Uuid::new_v4(), 60)
        .await
        .unwrap();
    assert!(reacquired.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn release_with_mismatched_id_is_a_no_op(pool: PgPool) {
    let lock_id = Uuid::new_v4();
    LockRepo::acquire(&pool, JOB, lock_id, 60).await.unwrap();

    // A stale holder whose lock was reclaimed must not delete the new
    // holder's row.
    assert!(!LockRepo::release(&pool, JOB, Uuid::new_v4()).await.unwrap());
    assert!(LockRepo::find(&pool, JOB).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Expiry reclaim
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn expired_lock_is_reclaimable(pool: PgPool) {
    let stale = Uuid::new_v4();
    LockRepo::acquire(&pool, JOB, stale, 60).await.unwrap();
    LockRepo::expire_now(&pool, JOB).await.unwrap();

    let taken = LockRepo::acquire(&pool, JOB, Uuid::new_v4(), 60)
        .await
        .unwrap();
    assert!(taken.is_some(), "an expired lock must be reclaimable");
    assert_ne!(taken.unwrap().lock_id, stale);
}

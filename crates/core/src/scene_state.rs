//! Scene lifecycle state machine.
//!
//! A scene normally walks pending -> generating -> (merging -> narrating ->)
//! completed. A generation failure sends it back to pending with an
//! incremented retry count; a scene that arrives at its processing step
//! already holding [`MAX_SCENE_RETRIES`] retries is failed instead of being
//! attempted a fourth time. Cancelling the owning project sweeps every
//! non-completed scene to skipped.

use crate::status::{SceneStatus, StatusId};

/// A scene is retried at most this many times before it is failed.
pub const MAX_SCENE_RETRIES: i32 = 3;

/// Statuses a scene may hold when the completion path finalizes it.
pub const COMPLETE_SOURCES: &[SceneStatus] = &[
    SceneStatus::Generating,
    SceneStatus::Merging,
    SceneStatus::Narrating,
];

/// Returns the set of valid target statuses reachable from `from`.
pub fn valid_transitions(from: SceneStatus) -> &'static [SceneStatus] {
    match from {
        SceneStatus::Pending => &[
            SceneStatus::Generating,
            SceneStatus::Failed,
            SceneStatus::Skipped,
        ],
        SceneStatus::Generating => &[
            SceneStatus::Merging,
            SceneStatus::Completed,
            // Retry: back to pending with retry_count incremented.
            SceneStatus::Pending,
            SceneStatus::Skipped,
        ],
        SceneStatus::Merging => &[
            SceneStatus::Narrating,
            SceneStatus::Completed,
            SceneStatus::Skipped,
        ],
        SceneStatus::Narrating => &[SceneStatus::Completed, SceneStatus::Skipped],
        SceneStatus::Completed | SceneStatus::Failed | SceneStatus::Skipped => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: SceneStatus, to: SceneStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// True when no further transitions are possible from `status`.
pub fn is_terminal(status: SceneStatus) -> bool {
    valid_transitions(status).is_empty()
}

/// Decision for a scene entering its processing step in `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Budget remains: submit another generation attempt.
    Attempt,
    /// Retries exhausted: fail the scene (and with it, the project).
    Exhausted,
}

/// Decide whether a pending scene may be attempted again.
///
/// A scene whose `retry_count` has reached [`MAX_SCENE_RETRIES`] is never
/// re-submitted; the fourth encounter marks it failed.
pub fn retry_decision(retry_count: i32) -> RetryDecision {
    if retry_count >= MAX_SCENE_RETRIES {
        RetryDecision::Exhausted
    } else {
        RetryDecision::Attempt
    }
}

/// Convert a source set to the raw IDs bound into CAS queries.
pub fn source_ids(sources: &[SceneStatus]) -> Vec<StatusId> {
    sources.iter().map(|s| s.id()).collect()
}

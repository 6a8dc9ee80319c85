//! Project lifecycle state machine.
//!
//! Every transition in the pipeline is implemented as a compare-and-swap
//! on the project row's current status, never an unconditional write. The
//! source sets below are the CAS guards the repository layer binds into
//! `WHERE status_id = ANY(...)` clauses; a zero-row match means another
//! invocation got there first and the caller treats it as a silent no-op.

use crate::status::{ProjectStatus, StatusId};

/// Minimum credit balance required to start generating a project.
pub const MIN_CREDITS_TO_START: i64 = 2;

/// Maximum number of projects one owner may have in `generating` at once.
pub const MAX_ACTIVE_PROJECTS_PER_OWNER: i64 = 2;

/// Script (re)generation may begin from a fresh draft or a finished script.
pub const SCRIPT_SOURCES: &[ProjectStatus] = &[ProjectStatus::Draft, ProjectStatus::ScriptReady];

/// Scene generation starts only from a ready script.
pub const START_SOURCES: &[ProjectStatus] = &[ProjectStatus::ScriptReady];

/// Pausing applies only to an actively generating project.
pub const PAUSE_SOURCES: &[ProjectStatus] = &[ProjectStatus::Generating];

/// Resuming applies only to a paused project.
pub const RESUME_SOURCES: &[ProjectStatus] = &[ProjectStatus::Paused];

/// Cancellation is allowed mid-generation or while paused.
pub const CANCEL_SOURCES: &[ProjectStatus] = &[ProjectStatus::Generating, ProjectStatus::Paused];

/// Completion and failure are reached only from `generating`.
pub const COMPLETE_SOURCES: &[ProjectStatus] = &[ProjectStatus::Generating];
pub const FAIL_SOURCES: &[ProjectStatus] = &[ProjectStatus::Generating];

/// Returns the set of valid target statuses reachable from `from`.
///
/// Terminal states (Completed, Failed, Cancelled) return an empty slice
/// because no further transitions are allowed.
pub fn valid_transitions(from: ProjectStatus) -> &'static [ProjectStatus] {
    match from {
        ProjectStatus::Draft => &[ProjectStatus::ScriptGenerating],
        ProjectStatus::ScriptGenerating => &[ProjectStatus::ScriptReady],
        ProjectStatus::ScriptReady => {
            &[ProjectStatus::ScriptGenerating, ProjectStatus::Generating]
        }
        ProjectStatus::Generating => &[
            ProjectStatus::Paused,
            ProjectStatus::Cancelled,
            ProjectStatus::Completed,
            ProjectStatus::Failed,
        ],
        ProjectStatus::Paused => &[ProjectStatus::Generating, ProjectStatus::Cancelled],
        ProjectStatus::Completed | ProjectStatus::Failed | ProjectStatus::Cancelled => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, returning an error message for invalid ones.
pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!(
            "Invalid project transition: {} ({}) -> {} ({})",
            from.name(),
            from.id(),
            to.name(),
            to.id()
        ))
    }
}

/// True when no further transitions are possible from `status`.
pub fn is_terminal(status: ProjectStatus) -> bool {
    valid_transitions(status).is_empty()
}

/// Convert a source set to the raw IDs bound into CAS queries.
pub fn source_ids(sources: &[ProjectStatus]) -> Vec<StatusId> {
    sources.iter().map(|s| s.id()).collect()
}

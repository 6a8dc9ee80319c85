//! Reference-frame resolution for frame-to-frame visual continuity.
//!
//! Scene N is generated from the last frame of scene N-1 when that frame
//! exists, so consecutive clips cut together without a visual jump. When
//! the predecessor completed but frame extraction failed upstream, the
//! scene degrades to text-to-video rather than erroring.

use crate::status::SceneStatus;

/// The slice of the previous scene the resolver needs.
#[derive(Debug, Clone)]
pub struct PredecessorScene {
    pub status_id: i16,
    pub last_frame_url: Option<String>,
}

/// Resolve the reference frame URL for `(scene_number, predecessor)`.
///
/// - Scene 1 has no predecessor: always `None` (text-to-video).
/// - Predecessor completed with a frame: that frame (image-to-video).
/// - Predecessor completed without a frame: `None` (graceful degrade).
/// - Predecessor in any other state: `None`. The orchestrator's strict
///   in-order processing means this only happens for skipped scenes.
pub fn resolve_reference_frame<'a>(
    scene_number: i32,
    predecessor: Option<&'a PredecessorScene>,
) -> Option<&'a str> {
    if scene_number <= 1 {
        return None;
    }
    let prev = predecessor?;
    if prev.status_id != SceneStatus::Completed.id() {
        return None;
    }
    prev.last_frame_url.as_deref()
}

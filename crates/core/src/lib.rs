//! Domain logic for the movie generation pipeline.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the orchestrator, and any CLI tooling alike.
//! Everything here is pure: state machines, the continuity resolver,
//! and credit pricing are all plain functions over value types.

pub mod continuity;
pub mod credits;
pub mod error;
pub mod project_state;
pub mod scene_state;
pub mod status;
pub mod types;

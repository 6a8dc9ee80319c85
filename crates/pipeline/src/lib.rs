//! The movie generation orchestrator.
//!
//! [`SceneProcessor`] is the periodically-invoked driver that advances
//! every `generating` project by exactly one scene step per invocation,
//! under a database-backed distributed lock. [`control`] holds the
//! user-facing lifecycle operations (start, pause, resume, cancel), all
//! implemented as compare-and-swap transitions.

pub mod control;
pub mod error;
pub mod processor;
pub mod summary;

pub use control::ControlOutcome;
pub use error::PipelineError;
pub use processor::SceneProcessor;
pub use summary::RunSummary;

//! Clients for the external collaborators of the scene pipeline: the
//! video generation provider and the media storage service.
//!
//! Both are exposed as `async_trait` traits so the orchestrator can be
//! exercised in tests with scripted implementations; the HTTP clients
//! here are the production implementations.

pub mod config;
pub mod generation;
pub mod storage;

pub use config::ProviderConfig;
pub use generation::{GenerationPoll, GenerationProvider, HttpGenerationProvider, ProviderError, SubmitScene};
pub use storage::{HttpMediaStorage, MaterializedVideo, MediaStorage, StorageError};

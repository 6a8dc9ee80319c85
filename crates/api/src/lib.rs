//! HTTP surface for the orchestrator.
//!
//! Exposes health and the internal pipeline trigger endpoint. The router
//! builder is shared between the production binary and integration tests
//! so both run the exact same middleware stack.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use router::build_app_router;
pub use state::AppState;

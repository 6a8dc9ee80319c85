mod credit_repo;
mod generation_repo;
mod lock_repo;
mod project_repo;
mod scene_repo;
mod user_repo;

pub use credit_repo::CreditRepo;
pub use generation_repo::GenerationRequestRepo;
pub use lock_repo::LockRepo;
pub use project_repo::ProjectRepo;
pub use scene_repo::SceneRepo;
pub use user_repo::UserRepo;

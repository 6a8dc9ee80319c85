pub mod credit;
pub mod generation;
pub mod lock;
pub mod project;
pub mod scene;
pub mod user;

pub mod health;
pub mod pipeline;

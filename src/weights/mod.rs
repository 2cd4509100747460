pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::WeightStore;
pub use repo_types::{NewWeightEntry, WeightEntry};

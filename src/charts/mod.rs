pub mod dto;
pub mod handlers;
pub mod stats;

pub use stats::WeightStats;

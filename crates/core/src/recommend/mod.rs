pub mod criteria;
pub mod engine;
pub mod scoring;

pub use engine::{EngineOptions, RecommendationEngine};

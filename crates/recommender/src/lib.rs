//! Recommender crate: the similarity-based plan recommendation engine and
//! its feedback evaluation.
//!
//! ```ignore
//! use recommender::{EngineConfig, FeedbackEvaluator, RecommendationEngine};
//!
//! let engine = RecommendationEngine::new(catalog, stats, EngineConfig::default())?;
//! let set = engine.recommend(&profile, &mut rng)?;
//! let mrr = FeedbackEvaluator::score(&set, &[true, false, false])?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;

pub use config::EngineConfig;
pub use engine::{MAX_VARIATIONS, RecommendationEngine, RecommendationSet};
pub use error::{EngineError, Result};
pub use feedback::{FeedbackEvaluator, mean_reciprocal_rank};

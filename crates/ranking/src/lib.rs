//! # Ranking Crate
//!
//! Nearest-neighbor search over the reference catalog and consensus voting
//! over the neighbors' plans.
//!
//! ## Components
//!
//! ### SimilarityRanker
//! Cosine similarity between a standardized query and every catalog row:
//! - Returns the top k rows (5 for the recommendation engine)
//! - Descending score, ties broken by ascending row index
//! - Zero vectors score 0 instead of dividing by zero
//!
//! ### PlanAggregator
//! Per-field majority vote over the neighbors' plans, first occurrence
//! winning ties.
//!
//! ## Example Usage
//!
//! ```ignore
//! use ranking::{PlanAggregator, SimilarityRanker};
//!
//! let neighbors = SimilarityRanker::default().rank(&query, catalog.feature_matrix());
//! let plan = PlanAggregator::aggregate(
//!     neighbors.iter().filter_map(|n| catalog.plan_at(n.index)),
//! )?;
//! ```

pub mod error;
pub mod similarity;
pub mod aggregator;

// Re-export commonly used types
pub use error::{RankingError, Result};
pub use similarity::{cosine_similarity, ScoredRow, SimilarityRanker, SimilarityResult};
pub use aggregator::PlanAggregator;

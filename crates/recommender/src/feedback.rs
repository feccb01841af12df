//! Relevance evaluation from user feedback.
//!
//! Feedback is one flag per returned plan, in the order the plans were
//! presented (position 0 is the exact match). The score is the mean of
//! 1/rank over the relevant positions, or 0.0 when nothing was relevant.

use crate::engine::RecommendationSet;
use crate::error::{EngineError, Result};

/// Mean reciprocal rank over the relevant positions of `feedback`
pub fn mean_reciprocal_rank(feedback: &[bool]) -> f64 {
    let reciprocal_ranks: Vec<f64> = feedback
        .iter()
        .enumerate()
        .filter(|(_, relevant)| **relevant)
        .map(|(pos, _)| 1.0 / (pos + 1) as f64)
        .collect();

    if reciprocal_ranks.is_empty() {
        0.0
    } else {
        reciprocal_ranks.iter().sum::<f64>() / reciprocal_ranks.len() as f64
    }
}

pub struct FeedbackEvaluator;

impl FeedbackEvaluator {
    /// Score feedback collected for `recommendations`.
    ///
    /// # Errors
    /// `SizeMismatch` unless there is exactly one flag per plan.
    pub fn score(recommendations: &RecommendationSet, feedback: &[bool]) -> Result<f64> {
        Self::score_for(recommendations.plan_count(), feedback)
    }

    /// Score feedback collected for `expected` recommendations
    pub fn score_for(expected: usize, feedback: &[bool]) -> Result<f64> {
        if feedback.len() != expected {
            return Err(EngineError::SizeMismatch {
                expected,
                found: feedback.len(),
            });
        }
        Ok(mean_reciprocal_rank(feedback))
    }
}

//! Nearest-neighbor search by cosine similarity.
//!
//! ## Algorithm
//! 1. Score every catalog row against the query: dot(a, b) / (|a| |b|)
//! 2. Sort by score DESC, ties by row index ASC
//! 3. Keep the top k rows
//!
//! Scoring runs on the rayon pool; the collected scores keep row order, so
//! the result does not depend on scheduling.

use crate::error::{RankingError, Result};
use data_loader::FeatureVector;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

/// Norms below this are treated as the zero vector
const ZERO_NORM_EPSILON: f64 = 1e-12;

/// A catalog row and its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredRow {
    pub index: usize,
    pub score: f64,
}

/// Top-k rows, best first
pub type SimilarityResult = Vec<ScoredRow>;

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity in [-1, 1].
///
/// Returns 0.0 when either vector is (numerically) zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    cosine_with_norm(a, norm(a), b)
}

fn cosine_with_norm(a: &[f64], a_norm: f64, b: &[f64]) -> f64 {
    let b_norm = norm(b);
    if a_norm < ZERO_NORM_EPSILON || b_norm < ZERO_NORM_EPSILON {
        return 0.0;
    }
    (dot(a, b) / (a_norm * b_norm)).clamp(-1.0, 1.0)
}

/// Ranks catalog rows by similarity to a query vector
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker {
    /// Size of the neighbor pool
    k: usize,
}

impl SimilarityRanker {
    /// Neighbor pool used by the recommendation engine
    pub const DEFAULT_NEIGHBORS: usize = 5;

    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(RankingError::InvalidNeighborCount(k));
        }
        Ok(Self { k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Return the k rows most similar to `query`.
    ///
    /// Fewer than k rows come back only when the matrix itself is smaller.
    #[instrument(skip_all, fields(k = self.k, rows = matrix.len()))]
    pub fn rank(&self, query: &FeatureVector, matrix: &[FeatureVector]) -> SimilarityResult {
        let query_norm = norm(query);

        let mut scored: Vec<ScoredRow> = matrix
            .par_iter()
            .enumerate()
            .map(|(index, row)| ScoredRow {
                index,
                score: cosine_with_norm(query, query_norm, row),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.index.cmp(&b.index))
        });
        scored.truncate(self.k);

        debug!(
            best = ?scored.first().map(|s| s.score),
            "Ranked {} neighbors",
            scored.len()
        );
        scored
    }
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self {
            k: Self::DEFAULT_NEIGHBORS,
        }
    }
}

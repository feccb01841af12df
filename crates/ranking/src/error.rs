//! Error types for the ranking crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    /// Majority vote over no plans at all
    #[error("Cannot aggregate an empty set of plans")]
    EmptyInput,

    /// The neighbor pool must hold at least one row
    #[error("Neighbor count must be at least 1, got {0}")]
    InvalidNeighborCount(usize),
}

pub type Result<T> = std::result::Result<T, RankingError>;

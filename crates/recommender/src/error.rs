//! Error types for the recommendation engine.
//!
//! Calls are all-or-nothing: any of these aborts the request and no partial
//! recommendation set is returned.

use data_loader::DataLoadError;
use ranking::RankingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A profile field is malformed or outside its domain
    #[error("Invalid profile: {field} = {value}")]
    InvalidProfile { field: String, value: String },

    /// Degenerate statistics, missing features, bad engine settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Majority vote over an empty neighbor set
    #[error("Cannot aggregate an empty set of plans")]
    EmptyInput,

    /// Feedback doesn't line up with the recommendations it rates
    #[error("Expected {expected} feedback values but found {found}")]
    SizeMismatch { expected: usize, found: usize },

    /// Any other data-loading failure
    #[error(transparent)]
    Data(DataLoadError),
}

impl From<DataLoadError> for EngineError {
    fn from(err: DataLoadError) -> Self {
        match err {
            DataLoadError::InvalidProfile { field, value } => {
                EngineError::InvalidProfile { field, value }
            }
            DataLoadError::ZeroVariance { .. }
            | DataLoadError::MissingFeature { .. }
            | DataLoadError::EmptyCatalog => EngineError::Configuration(err.to_string()),
            other => EngineError::Data(other),
        }
    }
}

impl From<RankingError> for EngineError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::EmptyInput => EngineError::EmptyInput,
            RankingError::InvalidNeighborCount(_) => EngineError::Configuration(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

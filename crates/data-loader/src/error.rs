//! Error types for the data-loader crate.
//!
//! Everything that can go wrong between the raw reference table and a
//! ready-to-query catalog lives here: reading the file, decoding records,
//! validating profiles and fitting normalization statistics.

use thiserror::Error;

/// Errors that can occur while loading the catalog or preparing profiles
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A CSV record couldn't be decoded
    #[error("CSV error at line {line}: {reason}")]
    Csv { line: u64, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A profile field is outside its documented domain
    #[error("Invalid profile field {field}: {value}")]
    InvalidProfile { field: String, value: String },

    /// A numeric feature has zero (or non-finite) spread across the catalog
    #[error("Feature {feature} has zero variance; cannot standardize")]
    ZeroVariance { feature: String },

    /// Normalization statistics don't cover a required feature
    #[error("Normalization statistics are missing feature {feature}")]
    MissingFeature { feature: String },

    /// No rows to fit statistics over or to search
    #[error("Reference catalog is empty")]
    EmptyCatalog,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

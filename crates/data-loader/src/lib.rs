//! # Data Loader Crate
//!
//! Everything needed to turn the reference table of prior users into a
//! catalog that can be searched by similarity.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (UserProfile, Plan, FeatureVector, categorical enums)
//! - **parser**: Parse the CSV reference table into records
//! - **normalizer**: Fit and apply z-score standardization
//! - **catalog**: The immutable, standardized ReferenceCatalog
//! - **error**: Error types for data loading and profile validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{FeatureNormalizer, ReferenceCatalog};
//! use std::path::Path;
//!
//! let (catalog, stats) = ReferenceCatalog::load_from_file(Path::new("data/gym_recommendation.csv"))?;
//! let query = FeatureNormalizer::transform(&stats, &profile)?;
//! println!("{} rows, first plan: {:?}", catalog.len(), catalog.plan_at(0));
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod normalizer;
pub mod catalog;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Feature layout
    FEATURE_COUNT,
    FEATURE_NAMES,
    FeatureVector,
    NumericFeature,
    // Core types
    UserProfile,
    ProfileRequest,
    Plan,
    CatalogRecord,
    // Enums
    Sex,
    Level,
    FitnessGoal,
    FitnessType,
    compute_bmi,
};
pub use normalizer::{FeatureNormalizer, FeatureStats, NormalizationStats};
pub use catalog::{CatalogRow, ReferenceCatalog};

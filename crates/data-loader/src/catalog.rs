//! The reference catalog: prior users as standardized feature vectors, each
//! paired with the plan that user followed.
//!
//! Rows are addressed by their position (0..N-1). The catalog is built once
//! and never mutated afterwards, so it can be shared behind an `Arc` by any
//! number of concurrent queries.

use crate::error::{DataLoadError, Result};
use crate::normalizer::{FeatureNormalizer, NormalizationStats};
use crate::parser;
use crate::types::{CatalogRecord, FeatureVector, Plan, UserProfile};
use std::path::Path;
use tracing::info;

/// A pre-standardized catalog row
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub features: FeatureVector,
    pub plan: Plan,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    features: Vec<FeatureVector>,
    plans: Vec<Plan>,
}

impl ReferenceCatalog {
    /// Load rows whose numeric fields are already standardized
    pub fn load(rows: Vec<CatalogRow>) -> Self {
        let (features, plans) = rows.into_iter().map(|r| (r.features, r.plan)).unzip();
        Self { features, plans }
    }

    /// Fit statistics over raw records, standardize them, and load the result.
    pub fn build(records: &[CatalogRecord]) -> Result<(Self, NormalizationStats)> {
        if records.is_empty() {
            return Err(DataLoadError::EmptyCatalog);
        }

        let profiles: Vec<UserProfile> = records.iter().map(|r| r.profile).collect();
        let stats = FeatureNormalizer::fit(&profiles)?;

        let rows = records
            .iter()
            .map(|record| {
                Ok(CatalogRow {
                    features: FeatureNormalizer::transform(&stats, &record.profile)?,
                    plan: record.plan.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((Self::load(rows), stats))
    }

    /// Read a reference table from disk and build the catalog from it
    pub fn load_from_file(path: &Path) -> Result<(Self, NormalizationStats)> {
        info!("Loading reference table from {:?}", path);
        let records = parser::parse_catalog_file(path)?;
        let (catalog, stats) = Self::build(&records)?;
        info!("Built reference catalog with {} rows", catalog.len());
        Ok((catalog, stats))
    }

    /// All rows' feature vectors, in row order
    pub fn feature_matrix(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn plan_at(&self, index: usize) -> Option<&Plan> {
        self.plans.get(index)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

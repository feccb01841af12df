//! Z-score standardization of the numeric profile attributes.
//!
//! Statistics are fitted once over the catalog's raw values and then applied,
//! unchanged, to every catalog row and every incoming query. Standard
//! deviation uses the population convention (divide by N).

use crate::error::{DataLoadError, Result};
use crate::types::{FeatureVector, NumericFeature, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Mean and standard deviation of one numeric feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl FeatureStats {
    pub fn standardize(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

/// Fitted statistics for every numeric feature.
///
/// Keyed by feature so a table supplied from outside (e.g. deserialized from
/// JSON) can be checked for completeness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    features: BTreeMap<NumericFeature, FeatureStats>,
}

impl NormalizationStats {
    /// Build from explicit entries, rejecting degenerate spreads
    pub fn from_entries(
        entries: impl IntoIterator<Item = (NumericFeature, FeatureStats)>,
    ) -> Result<Self> {
        let stats = Self {
            features: entries.into_iter().collect(),
        };
        for (feature, s) in &stats.features {
            check_spread(*feature, s)?;
        }
        Ok(stats)
    }

    /// Look up one feature
    pub fn get(&self, feature: NumericFeature) -> Result<&FeatureStats> {
        self.features
            .get(&feature)
            .ok_or_else(|| DataLoadError::MissingFeature {
                feature: feature.name().to_string(),
            })
    }

    /// Check that every numeric feature is present with a positive spread
    pub fn validate(&self) -> Result<()> {
        for feature in NumericFeature::ALL {
            check_spread(feature, self.get(feature)?)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NumericFeature, &FeatureStats)> {
        self.features.iter().map(|(f, s)| (*f, s))
    }
}

fn check_spread(feature: NumericFeature, stats: &FeatureStats) -> Result<()> {
    if stats.std_dev > 0.0 && stats.std_dev.is_finite() && stats.mean.is_finite() {
        Ok(())
    } else {
        Err(DataLoadError::ZeroVariance {
            feature: feature.name().to_string(),
        })
    }
}

/// Fits and applies standardization
pub struct FeatureNormalizer;

impl FeatureNormalizer {
    /// Fit mean and population standard deviation per numeric feature.
    pub fn fit(profiles: &[UserProfile]) -> Result<NormalizationStats> {
        if profiles.is_empty() {
            return Err(DataLoadError::EmptyCatalog);
        }
        let n = profiles.len() as f64;

        let mut features = BTreeMap::new();
        for feature in NumericFeature::ALL {
            let mean = profiles.iter().map(|p| p.numeric(feature)).sum::<f64>() / n;
            let variance = profiles
                .iter()
                .map(|p| (p.numeric(feature) - mean).powi(2))
                .sum::<f64>()
                / n;
            let stats = FeatureStats {
                mean,
                std_dev: variance.sqrt(),
            };
            check_spread(feature, &stats)?;
            debug!(%feature, mean, std_dev = stats.std_dev, "fitted feature");
            features.insert(feature, stats);
        }

        Ok(NormalizationStats { features })
    }

    /// Encode a raw profile, standardizing the numeric positions.
    pub fn transform(stats: &NormalizationStats, profile: &UserProfile) -> Result<FeatureVector> {
        let mut vector = profile.raw_vector();
        for feature in NumericFeature::ALL {
            let s = stats.get(feature)?;
            vector[feature.position()] = s.standardize(profile.numeric(feature));
        }
        Ok(vector)
    }
}

//! # Recommendation Engine
//!
//! Coordinates a single recommendation request:
//! 1. Standardize the raw profile with the catalog's fitted statistics
//! 2. Rank every catalog row by cosine similarity, keep the top k
//! 3. Majority-vote the neighbors' plans into the exact plan
//! 4. Re-run 1-3 on randomly perturbed copies of the profile to find up to
//!    two alternative plans
//!
//! The engine only reads its catalog and statistics, so one instance (or
//! clones of it) can serve concurrent requests without locking.

use std::sync::Arc;

use data_loader::{
    FeatureNormalizer, NormalizationStats, NumericFeature, Plan, ProfileRequest,
    ReferenceCatalog, UserProfile,
};
use rand::Rng;
use ranking::{PlanAggregator, SimilarityRanker, SimilarityResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Alternative plans returned alongside the exact match, at most
pub const MAX_VARIATIONS: usize = 2;

/// The exact-match plan plus distinct alternatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub exact: Plan,
    pub variations: Vec<Plan>,
}

impl RecommendationSet {
    /// Total number of plans, exact match included
    pub fn plan_count(&self) -> usize {
        1 + self.variations.len()
    }

    /// All plans in rank order; the exact match comes first
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        std::iter::once(&self.exact).chain(self.variations.iter())
    }

    fn contains(&self, plan: &Plan) -> bool {
        self.plans().any(|p| p == plan)
    }
}

/// Similarity-based plan recommender
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<ReferenceCatalog>,
    stats: Arc<NormalizationStats>,
    ranker: SimilarityRanker,
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine over a catalog and the statistics it was built with.
    ///
    /// Fails with `Configuration` if the settings are invalid, the catalog is
    /// empty, or the statistics are incomplete or degenerate.
    pub fn new(
        catalog: Arc<ReferenceCatalog>,
        stats: Arc<NormalizationStats>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        stats.validate()?;
        if catalog.is_empty() {
            return Err(EngineError::Configuration(
                "reference catalog has no rows".to_string(),
            ));
        }
        let ranker = SimilarityRanker::new(config.neighbor_count)?;

        info!(
            rows = catalog.len(),
            neighbors = config.neighbor_count,
            "Recommendation engine ready"
        );
        Ok(Self {
            catalog,
            stats,
            ranker,
            config,
        })
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a boundary request, then recommend for it
    pub fn recommend_request<R: Rng>(
        &self,
        request: &ProfileRequest,
        rng: &mut R,
    ) -> Result<RecommendationSet> {
        let profile = UserProfile::try_from(*request)?;
        self.recommend(&profile, rng)
    }

    /// Recommend an exact plan and up to two distinct variations.
    ///
    /// `profile` must carry raw units; it is never modified. `rng` drives the
    /// perturbations and is the only state touched.
    #[instrument(skip_all, fields(attempts = self.config.variation_attempts))]
    pub fn recommend<R: Rng>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<RecommendationSet> {
        check_numeric(profile)?;

        let exact = self.consensus_plan(profile)?;
        let mut set = RecommendationSet {
            exact,
            variations: Vec::with_capacity(MAX_VARIATIONS),
        };

        for attempt in 0..self.config.variation_attempts {
            if set.variations.len() == MAX_VARIATIONS {
                break;
            }
            let perturbed = self.perturb(profile, rng);
            let candidate = self.consensus_plan(&perturbed)?;

            if set.contains(&candidate) {
                debug!(attempt, "Discarded duplicate variation");
            } else {
                debug!(attempt, "Accepted variation");
                set.variations.push(candidate);
            }
        }

        info!(
            "Recommended {} plan(s) ({} variation(s))",
            set.plan_count(),
            set.variations.len()
        );
        Ok(set)
    }

    /// Top-k catalog rows for a raw profile
    pub fn neighbors(&self, profile: &UserProfile) -> Result<SimilarityResult> {
        let query = FeatureNormalizer::transform(&self.stats, profile)?;
        Ok(self.ranker.rank(&query, self.catalog.feature_matrix()))
    }

    /// Majority plan of the profile's nearest neighbors
    fn consensus_plan(&self, profile: &UserProfile) -> Result<Plan> {
        let neighbors = self.neighbors(profile)?;
        let plan = PlanAggregator::aggregate(
            neighbors
                .iter()
                .filter_map(|n| self.catalog.plan_at(n.index)),
        )?;
        Ok(plan)
    }

    /// A shifted copy of the raw profile: whole years of age, real-valued
    /// weight and BMI.
    fn perturb<R: Rng>(&self, profile: &UserProfile, rng: &mut R) -> UserProfile {
        let mut perturbed = *profile;
        let age = i64::from(self.config.age_jitter);
        let weight = self.config.weight_jitter;
        let bmi = self.config.bmi_jitter;

        perturbed.age += rng.random_range(-age..=age) as f64;
        perturbed.weight_kg += rng.random_range(-weight..=weight);
        perturbed.bmi += rng.random_range(-bmi..=bmi);
        perturbed
    }
}

fn check_numeric(profile: &UserProfile) -> Result<()> {
    for feature in NumericFeature::ALL {
        let value = profile.numeric(feature);
        if !value.is_finite() {
            return Err(EngineError::InvalidProfile {
                field: feature.name().to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CatalogRecord, FitnessGoal, FitnessType, Level, Sex};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn profile(age: f64, weight_kg: f64, level: Level) -> UserProfile {
        let height_m = 1.70 + (age - 30.0) / 500.0;
        UserProfile {
            sex: Sex::Female,
            age,
            height_m,
            weight_kg,
            hypertension: false,
            diabetes: false,
            bmi: weight_kg / (height_m * height_m),
            level,
            fitness_goal: FitnessGoal::WeightLoss,
            fitness_type: FitnessType::CardioFitness,
        }
    }

    /// Twelve users spread over age and weight, each with their own plan
    fn build_test_engine(config: EngineConfig) -> RecommendationEngine {
        let records: Vec<CatalogRecord> = (0..12)
            .map(|i| {
                let age = 18.0 + 4.0 * i as f64;
                let weight = 50.0 + 5.0 * ((i * 7) % 12) as f64;
                let level = Level::from_code((i % 4) as u8).unwrap();
                CatalogRecord {
                    profile: profile(age, weight, level),
                    plan: Plan::new(
                        format!("Exercises {}", i % 6),
                        format!("Diet {}", i % 4),
                        format!("Equipment {}", i % 3),
                    ),
                }
            })
            .collect();
        let (catalog, stats) = ReferenceCatalog::build(&records).unwrap();
        RecommendationEngine::new(Arc::new(catalog), Arc::new(stats), config).unwrap()
    }

    #[test]
    fn test_recommend_returns_distinct_plans() {
        let engine = build_test_engine(EngineConfig::default());
        let mut rng = StdRng::seed_from_u64(7);

        for seed_age in [20.0, 35.0, 50.0, 61.0] {
            let query = profile(seed_age, 72.0, Level::Overweight);
            let set = engine.recommend(&query, &mut rng).unwrap();

            assert!(set.plan_count() <= 1 + MAX_VARIATIONS);
            let plans: Vec<&Plan> = set.plans().collect();
            for (i, later) in plans.iter().enumerate().skip(1) {
                for earlier in &plans[..i] {
                    assert_ne!(later, earlier);
                }
            }
        }
    }

    #[test]
    fn test_recommend_does_not_mutate_profile() {
        let engine = build_test_engine(EngineConfig::default());
        let query = profile(33.0, 68.0, Level::Normal);
        let before = query;
        let mut rng = StdRng::seed_from_u64(1);

        engine.recommend(&query, &mut rng).unwrap();
        assert_eq!(query, before);
    }

    #[test]
    fn test_same_seed_same_recommendations() {
        let engine = build_test_engine(EngineConfig::default());
        let query = profile(41.0, 80.0, Level::Obese);

        let a = engine.recommend(&query, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = engine.recommend(&query, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_jitter_yields_no_variations() {
        // Every perturbed run reproduces the exact plan and is discarded
        let engine = build_test_engine(EngineConfig::default().with_jitter(0, 0.0, 0.0));
        let query = profile(29.0, 64.0, Level::Normal);

        let set = engine.recommend(&query, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(set.variations.is_empty());
        assert_eq!(set.plan_count(), 1);
    }

    #[test]
    fn test_more_attempts_never_exceed_two_variations() {
        let engine = build_test_engine(
            EngineConfig::default()
                .with_variation_attempts(25)
                .with_jitter(30, 40.0, 10.0),
        );
        let query = profile(38.0, 75.0, Level::Overweight);

        let set = engine.recommend(&query, &mut StdRng::seed_from_u64(11)).unwrap();
        assert!(set.variations.len() <= MAX_VARIATIONS);
    }

    /// Five young, light users on one plan and five older, heavier users on
    /// another. Categorical codes are all zero and height averages out, so a
    /// standardized query points towards whichever cluster its age, weight
    /// and BMI lean to.
    fn build_two_cluster_engine(config: EngineConfig) -> RecommendationEngine {
        let young_plan = Plan::new("Yoga", "Oats", "Mat");
        let older_plan = Plan::new("Swimming", "Fish", "Pool");
        let records: Vec<CatalogRecord> = (0..10)
            .map(|i| {
                let older = i >= 5;
                let mut p = profile(0.0, 0.0, Level::Normal);
                p.fitness_goal = FitnessGoal::WeightGain;
                p.fitness_type = FitnessType::CardioFitness;
                p.height_m = if i % 2 == 0 { 1.60 } else { 1.80 };
                p.age = if older { 60.0 } else { 20.0 };
                p.weight_kg = if older { 100.0 } else { 50.0 };
                p.bmi = if older { 35.0 } else { 18.0 };
                CatalogRecord {
                    profile: p,
                    plan: if older { older_plan.clone() } else { young_plan.clone() },
                }
            })
            .collect();
        let (catalog, stats) = ReferenceCatalog::build(&records).unwrap();
        RecommendationEngine::new(Arc::new(catalog), Arc::new(stats), config).unwrap()
    }

    #[test]
    fn test_perturbed_profile_can_reach_another_plan() {
        // Jitter spans one standard deviation of each perturbed feature
        let engine = build_two_cluster_engine(
            EngineConfig::default()
                .with_variation_attempts(40)
                .with_jitter(20, 25.0, 8.5),
        );
        let mut query = profile(0.0, 0.0, Level::Normal);
        query.fitness_goal = FitnessGoal::WeightGain;
        query.height_m = 1.70;
        query.age = 38.0;
        query.weight_kg = 75.0;
        query.bmi = 26.5;

        let set = engine.recommend(&query, &mut StdRng::seed_from_u64(17)).unwrap();

        assert_eq!(set.exact, Plan::new("Yoga", "Oats", "Mat"));
        assert_eq!(set.variations, vec![Plan::new("Swimming", "Fish", "Pool")]);
        assert_eq!(set.plan_count(), 2);
    }

    #[test]
    fn test_perturb_stays_within_jitter() {
        let engine = build_test_engine(EngineConfig::default());
        let query = profile(40.0, 70.0, Level::Normal);
        let mut rng = StdRng::seed_from_u64(23);
        let mut age_moved = false;
        let mut weight_moved = false;

        for _ in 0..200 {
            let shifted = engine.perturb(&query, &mut rng);

            let age_shift = shifted.age - query.age;
            assert_eq!(age_shift, age_shift.round());
            assert!(age_shift.abs() <= 5.0);
            assert!((shifted.weight_kg - query.weight_kg).abs() <= 5.0);
            assert!((shifted.bmi - query.bmi).abs() <= 1.0);
            age_moved |= age_shift != 0.0;
            weight_moved |= shifted.weight_kg != query.weight_kg;

            // Only age, weight and BMI are perturbed
            assert_eq!(shifted.height_m, query.height_m);
            assert_eq!(shifted.sex, query.sex);
            assert_eq!(shifted.level, query.level);
            assert_eq!(shifted.fitness_goal, query.fitness_goal);
        }

        assert!(age_moved);
        assert!(weight_moved);
    }

    #[test]
    fn test_recommend_request_validates_codes() {
        let engine = build_test_engine(EngineConfig::default());
        let mut request = ProfileRequest::from(profile(30.0, 70.0, Level::Normal));
        request.sex = 3;

        let err = engine
            .recommend_request(&request, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile { ref field, .. } if field == "sex"));
    }

    #[test]
    fn test_non_finite_profile_is_rejected() {
        let engine = build_test_engine(EngineConfig::default());
        let mut query = profile(30.0, 70.0, Level::Normal);
        query.bmi = f64::INFINITY;

        let err = engine
            .recommend(&query, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile { ref field, .. } if field == "BMI"));
    }

    #[test]
    fn test_incomplete_stats_are_a_configuration_error() {
        let engine = build_test_engine(EngineConfig::default());
        let partial = NormalizationStats::from_entries(
            engine
                .stats()
                .iter()
                .filter(|(f, _)| *f != NumericFeature::Bmi)
                .map(|(f, s)| (f, *s)),
        )
        .unwrap();
        let catalog = Arc::new(engine.catalog().clone());

        let err = RecommendationEngine::new(catalog, Arc::new(partial), EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_empty_catalog_is_a_configuration_error() {
        let engine = build_test_engine(EngineConfig::default());
        let err = RecommendationEngine::new(
            Arc::new(ReferenceCatalog::default()),
            Arc::new(engine.stats().clone()),
            EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}

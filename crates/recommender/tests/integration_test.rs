//! Integration tests for the recommender.
//!
//! These tests load a small reference table through the CSV parser and
//! drive the engine end to end, the way the CLI does.

use data_loader::{ReferenceCatalog, UserProfile, parser::parse_catalog};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ranking::PlanAggregator;
use recommender::{
    EngineConfig, EngineError, FeedbackEvaluator, MAX_VARIATIONS, RecommendationEngine,
};
use std::sync::Arc;

const TABLE: &str = "\
ID,Sex,Age,Height,Weight,Hypertension,Diabetes,BMI,Level,Fitness Goal,Fitness Type,Exercises,Diet,Equipment
1,Male,18,1.68,47.5,No,No,16.8,Underweight,Weight Gain,Muscular Fitness,\"Squats, deadlifts, bench presses\",\"Vegetables: (Carrots, Spinach); Protein: (Chicken, Eggs)\",\"Dumbbells, barbells\"
2,Female,22,1.60,50.0,No,No,19.5,Normal,Weight Gain,Muscular Fitness,\"Squats, yoga\",\"Vegetables: (Broccoli); Protein: (Tofu)\",\"Light athletic gear\"
3,Male,27,1.82,104.0,Yes,No,31.4,Obese,Weight Loss,Cardio Fitness,\"Brisk walking, cycling, swimming\",\"Vegetables: (Garlic, Lettuce); Protein: (Fish)\",\"Ellipticals, treadmills\"
4,Female,34,1.65,82.0,No,Yes,30.1,Obese,Weight Loss,Cardio Fitness,\"Brisk walking, cycling, swimming\",\"Vegetables: (Garlic, Lettuce); Protein: (Fish)\",\"Ellipticals, treadmills\"
5,Male,41,1.77,88.5,Yes,Yes,28.2,Overweight,Weight Loss,Cardio Fitness,\"Walking, yoga\",\"Vegetables: (Garlic, Lettuce); Protein: (Fish)\",\"Kettlebell, treadmills\"
6,Female,47,1.58,68.0,Yes,No,27.2,Overweight,Weight Loss,Cardio Fitness,\"Brisk walking, cycling, swimming\",\"Vegetables: (Tomatoes); Protein: (Beans)\",\"Ellipticals, treadmills\"
7,Male,53,1.74,60.0,No,No,19.8,Normal,Weight Gain,Muscular Fitness,\"Squats, yoga\",\"Vegetables: (Broccoli); Protein: (Tofu)\",\"Light athletic gear\"
8,Female,59,1.55,44.0,No,Yes,18.3,Underweight,Weight Gain,Muscular Fitness,\"Squats, deadlifts, bench presses\",\"Vegetables: (Carrots, Spinach); Protein: (Chicken, Eggs)\",\"Dumbbells, barbells\"
9,Male,62,1.90,120.0,Yes,Yes,33.2,Obese,Weight Loss,Cardio Fitness,\"Walking, yoga\",\"Vegetables: (Tomatoes); Protein: (Beans)\",\"Kettlebell, treadmills\"
10,Female,30,1.70,65.0,No,No,22.5,Normal,Weight Loss,Cardio Fitness,\"Brisk walking, cycling, swimming\",\"Vegetables: (Broccoli); Protein: (Tofu)\",\"Ellipticals, treadmills\"
";

fn create_test_setup() -> (RecommendationEngine, Vec<UserProfile>) {
    let records = parse_catalog(TABLE.as_bytes()).unwrap();
    let profiles = records.iter().map(|r| r.profile).collect();
    let (catalog, stats) = ReferenceCatalog::build(&records).unwrap();
    let engine =
        RecommendationEngine::new(Arc::new(catalog), Arc::new(stats), EngineConfig::default())
            .unwrap();
    (engine, profiles)
}

#[test]
fn test_known_profile_ranks_its_own_row_first() {
    let (engine, profiles) = create_test_setup();

    let neighbors = engine.neighbors(&profiles[3]).unwrap();

    assert_eq!(neighbors.len(), 5);
    assert_eq!(neighbors[0].index, 3);
    assert!((neighbors[0].score - 1.0).abs() < 1e-9);
    for pair in neighbors.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_exact_plan_is_neighbor_consensus() {
    let (engine, profiles) = create_test_setup();
    let mut rng = StdRng::seed_from_u64(42);

    for profile in &profiles {
        let neighbors = engine.neighbors(profile).unwrap();
        let expected = PlanAggregator::aggregate(
            neighbors
                .iter()
                .map(|n| engine.catalog().plan_at(n.index).unwrap()),
        )
        .unwrap();

        let set = engine.recommend(profile, &mut rng).unwrap();
        assert_eq!(set.exact, expected);
        assert!(set.variations.len() <= MAX_VARIATIONS);
        assert!(!set.variations.contains(&set.exact));
    }
}

#[test]
fn test_shared_engine_serves_concurrent_requests() {
    let (engine, profiles) = create_test_setup();

    let sequential: Vec<_> = profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            engine
                .recommend(p, &mut StdRng::seed_from_u64(i as u64))
                .unwrap()
        })
        .collect();

    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let engine = engine.clone();
                scope.spawn(move || {
                    engine
                        .recommend(p, &mut StdRng::seed_from_u64(i as u64))
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

#[test]
fn test_feedback_round_trip() {
    let (engine, profiles) = create_test_setup();
    let set = engine
        .recommend(&profiles[0], &mut StdRng::seed_from_u64(5))
        .unwrap();

    let mut feedback = vec![false; set.plan_count()];
    feedback[0] = true;
    assert_eq!(FeedbackEvaluator::score(&set, &feedback).unwrap(), 1.0);

    feedback.push(true);
    let err = FeedbackEvaluator::score(&set, &feedback).unwrap_err();
    assert!(matches!(err, EngineError::SizeMismatch { found, .. } if found == set.plan_count() + 1));
}

#[test]
fn test_recommendations_serialize_to_json() {
    let (engine, profiles) = create_test_setup();
    let set = engine
        .recommend(&profiles[6], &mut StdRng::seed_from_u64(8))
        .unwrap();

    let json = serde_json::to_value(&set).unwrap();
    assert_eq!(json["exact"]["exercises"], set.exact.exercises.as_str());
    assert_eq!(
        json["variations"].as_array().unwrap().len(),
        set.variations.len()
    );
}

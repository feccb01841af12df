//! Majority vote over the plans of the nearest neighbors.
//!
//! Each plan field is voted on independently, so the consensus plan may pair
//! an exercise routine from one neighbor with the diet of another. When two
//! values are equally frequent, the one seen first wins, which makes the
//! outcome depend only on neighbor rank order.

use crate::error::{RankingError, Result};
use data_loader::Plan;
use std::collections::HashMap;

/// Reduces a neighbor set to a single plan
pub struct PlanAggregator;

impl PlanAggregator {
    /// Per-field stable mode of `plans`.
    ///
    /// # Errors
    /// `RankingError::EmptyInput` if there are no plans.
    pub fn aggregate<'a, I>(plans: I) -> Result<Plan>
    where
        I: IntoIterator<Item = &'a Plan>,
    {
        let plans: Vec<&Plan> = plans.into_iter().collect();
        if plans.is_empty() {
            return Err(RankingError::EmptyInput);
        }

        Ok(Plan {
            exercises: stable_mode(plans.iter().map(|p| p.exercises.as_str())),
            diet: stable_mode(plans.iter().map(|p| p.diet.as_str())),
            equipment: stable_mode(plans.iter().map(|p| p.equipment.as_str())),
        })
    }
}

/// Most frequent value; ties go to the earliest first occurrence.
///
/// Callers guarantee at least one value.
fn stable_mode<'a>(values: impl Iterator<Item = &'a str>) -> String {
    // value -> (first position, count)
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, value) in values.enumerate() {
        tally.entry(value).or_insert((pos, 0)).1 += 1;
    }

    tally
        .into_iter()
        .max_by(|(_, (first_a, count_a)), (_, (first_b, count_b))| {
            count_a.cmp(count_b).then_with(|| first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string())
        .unwrap_or_default()
}

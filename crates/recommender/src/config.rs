//! Engine settings.
//!
//! Defaults: five neighbors, two variation attempts, and perturbations of
//! ±5 years, ±5 kg and ±1 BMI point.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Neighbors voted on per query
    pub neighbor_count: usize,
    /// Perturbed re-runs attempted for alternative plans
    pub variation_attempts: usize,
    /// Age is shifted by a whole number of years in [-age_jitter, age_jitter]
    pub age_jitter: u32,
    /// Weight is shifted by a real number of kg in [-weight_jitter, weight_jitter]
    pub weight_jitter: f64,
    /// BMI is shifted by a real number in [-bmi_jitter, bmi_jitter]
    pub bmi_jitter: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbor_count: 5,
            variation_attempts: 2,
            age_jitter: 5,
            weight_jitter: 5.0,
            bmi_jitter: 1.0,
        }
    }
}

impl EngineConfig {
    /// Configure the neighbor pool size (default: 5)
    pub fn with_neighbor_count(mut self, count: usize) -> Self {
        self.neighbor_count = count;
        self
    }

    /// Configure how many variation attempts are made (default: 2)
    pub fn with_variation_attempts(mut self, attempts: usize) -> Self {
        self.variation_attempts = attempts;
        self
    }

    /// Configure perturbation ranges (defaults: 5 years, 5.0 kg, 1.0 BMI)
    pub fn with_jitter(mut self, age_years: u32, weight_kg: f64, bmi: f64) -> Self {
        self.age_jitter = age_years;
        self.weight_jitter = weight_kg;
        self.bmi_jitter = bmi;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.neighbor_count == 0 {
            return Err(EngineError::Configuration(
                "neighbor_count must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("weight_jitter", self.weight_jitter),
            ("bmi_jitter", self.bmi_jitter),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

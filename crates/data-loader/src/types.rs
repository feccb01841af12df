//! Core domain types for the gym recommendation dataset.
//!
//! Categorical attributes are enums with a fixed integer encoding (the
//! label-encoder order used when the reference table was prepared). Numeric
//! attributes are carried in raw units on `UserProfile`; the standardized form
//! only ever exists as a `FeatureVector`, so a profile cannot be normalized
//! twice.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Feature layout
// =============================================================================

/// Number of attributes compared during similarity search
pub const FEATURE_COUNT: usize = 10;

/// Column names in the fixed order used by every feature vector
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Sex",
    "Age",
    "Height",
    "Weight",
    "Hypertension",
    "Diabetes",
    "BMI",
    "Level",
    "Fitness Goal",
    "Fitness Type",
];

/// A profile encoded as numbers, in `FEATURE_NAMES` order.
///
/// Numeric positions hold standardized values once produced by the
/// normalizer.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// The numeric attributes subject to z-score standardization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumericFeature {
    Age,
    Height,
    Weight,
    Bmi,
}

impl NumericFeature {
    /// All numeric features, in feature-vector order
    pub const ALL: [NumericFeature; 4] = [
        NumericFeature::Age,
        NumericFeature::Height,
        NumericFeature::Weight,
        NumericFeature::Bmi,
    ];

    /// Position of this feature inside a `FeatureVector`
    pub fn position(self) -> usize {
        match self {
            NumericFeature::Age => 1,
            NumericFeature::Height => 2,
            NumericFeature::Weight => 3,
            NumericFeature::Bmi => 6,
        }
    }

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.position()]
    }
}

impl fmt::Display for NumericFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Categorical attributes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn code(self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Sex::Female),
            1 => Some(Sex::Male),
            _ => None,
        }
    }
}

/// Weight category of the user
///
/// Codes follow alphabetical label order: Normal, Obese, Overweight,
/// Underweight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Normal,
    Obese,
    Overweight,
    Underweight,
}

impl Level {
    pub fn code(self) -> u8 {
        match self {
            Level::Normal => 0,
            Level::Obese => 1,
            Level::Overweight => 2,
            Level::Underweight => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Level::Normal),
            1 => Some(Level::Obese),
            2 => Some(Level::Overweight),
            3 => Some(Level::Underweight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitnessGoal {
    WeightGain,
    WeightLoss,
}

impl FitnessGoal {
    pub fn code(self) -> u8 {
        match self {
            FitnessGoal::WeightGain => 0,
            FitnessGoal::WeightLoss => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FitnessGoal::WeightGain),
            1 => Some(FitnessGoal::WeightLoss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitnessType {
    CardioFitness,
    MuscularFitness,
}

impl FitnessType {
    pub fn code(self) -> u8 {
        match self {
            FitnessType::CardioFitness => 0,
            FitnessType::MuscularFitness => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FitnessType::CardioFitness),
            1 => Some(FitnessType::MuscularFitness),
            _ => None,
        }
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// A user's attributes in raw units (years, meters, kilograms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sex: Sex,
    pub age: f64,
    pub height_m: f64,
    pub weight_kg: f64,
    pub hypertension: bool,
    pub diabetes: bool,
    pub bmi: f64,
    pub level: Level,
    pub fitness_goal: FitnessGoal,
    pub fitness_type: FitnessType,
}

impl UserProfile {
    /// Raw value of one numeric attribute
    pub fn numeric(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::Age => self.age,
            NumericFeature::Height => self.height_m,
            NumericFeature::Weight => self.weight_kg,
            NumericFeature::Bmi => self.bmi,
        }
    }

    /// Encode the profile without any scaling.
    ///
    /// The normalizer overwrites the numeric positions of this vector.
    pub fn raw_vector(&self) -> FeatureVector {
        [
            f64::from(self.sex.code()),
            self.age,
            self.height_m,
            self.weight_kg,
            f64::from(u8::from(self.hypertension)),
            f64::from(u8::from(self.diabetes)),
            self.bmi,
            f64::from(self.level.code()),
            f64::from(self.fitness_goal.code()),
            f64::from(self.fitness_type.code()),
        ]
    }
}

/// BMI from weight and height: kg / m²
pub fn compute_bmi(weight_kg: f64, height_m: f64) -> Option<f64> {
    if height_m > 0.0 && weight_kg.is_finite() && height_m.is_finite() {
        Some(weight_kg / (height_m * height_m))
    } else {
        None
    }
}

/// Profile as it arrives at the input boundary, before validation.
///
/// Categorical attributes are integer codes; see the enums above for the
/// mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub sex: u8,
    pub age: f64,
    pub height_m: f64,
    pub weight_kg: f64,
    pub hypertension: u8,
    pub diabetes: u8,
    pub bmi: f64,
    pub level: u8,
    pub fitness_goal: u8,
    pub fitness_type: u8,
}

fn invalid(field: &str, value: impl fmt::Display) -> DataLoadError {
    DataLoadError::InvalidProfile {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn flag(field: &str, code: u8) -> Result<bool> {
    match code {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(invalid(field, code)),
    }
}

fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(field, value))
    }
}

impl TryFrom<ProfileRequest> for UserProfile {
    type Error = DataLoadError;

    fn try_from(req: ProfileRequest) -> Result<Self> {
        Ok(UserProfile {
            sex: Sex::from_code(req.sex).ok_or_else(|| invalid("sex", req.sex))?,
            age: finite("age", req.age)?,
            height_m: finite("height_m", req.height_m)?,
            weight_kg: finite("weight_kg", req.weight_kg)?,
            hypertension: flag("hypertension", req.hypertension)?,
            diabetes: flag("diabetes", req.diabetes)?,
            bmi: finite("bmi", req.bmi)?,
            level: Level::from_code(req.level).ok_or_else(|| invalid("level", req.level))?,
            fitness_goal: FitnessGoal::from_code(req.fitness_goal)
                .ok_or_else(|| invalid("fitness_goal", req.fitness_goal))?,
            fitness_type: FitnessType::from_code(req.fitness_type)
                .ok_or_else(|| invalid("fitness_type", req.fitness_type))?,
        })
    }
}

impl From<UserProfile> for ProfileRequest {
    fn from(profile: UserProfile) -> Self {
        ProfileRequest {
            sex: profile.sex.code(),
            age: profile.age,
            height_m: profile.height_m,
            weight_kg: profile.weight_kg,
            hypertension: u8::from(profile.hypertension),
            diabetes: u8::from(profile.diabetes),
            bmi: profile.bmi,
            level: profile.level.code(),
            fitness_goal: profile.fitness_goal.code(),
            fitness_type: profile.fitness_type.code(),
        }
    }
}

// =============================================================================
// Plans and catalog records
// =============================================================================

/// A workout/diet/equipment recommendation.
///
/// Two plans are the same recommendation when all three fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plan {
    pub exercises: String,
    pub diet: String,
    pub equipment: String,
}

impl Plan {
    pub fn new(
        exercises: impl Into<String>,
        diet: impl Into<String>,
        equipment: impl Into<String>,
    ) -> Self {
        Self {
            exercises: exercises.into(),
            diet: diet.into(),
            equipment: equipment.into(),
        }
    }
}

/// One row of the reference table in raw units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub profile: UserProfile,
    pub plan: Plan,
}

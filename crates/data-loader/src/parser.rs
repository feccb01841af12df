//! Parser for the reference table.
//!
//! The table is a CSV file with a header row naming at least these columns:
//! `Sex, Age, Height, Weight, Hypertension, Diabetes, BMI, Level,
//! Fitness Goal, Fitness Type, Exercises, Diet, Equipment`. Other columns
//! (an `ID`, say) are ignored. Plan columns routinely contain commas, so they
//! must be quoted.
//!
//! Categorical columns normally hold the integer codes; the textual labels of
//! the source spreadsheet ("Male", "Yes", "Overweight", ...) are accepted too
//! and mapped onto the same codes.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One CSV record before categorical decoding
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age")]
    age: f64,
    #[serde(rename = "Height")]
    height: f64,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Hypertension")]
    hypertension: String,
    #[serde(rename = "Diabetes")]
    diabetes: String,
    #[serde(rename = "BMI")]
    bmi: f64,
    #[serde(rename = "Level")]
    level: String,
    #[serde(rename = "Fitness Goal")]
    fitness_goal: String,
    #[serde(rename = "Fitness Type")]
    fitness_type: String,
    #[serde(rename = "Exercises")]
    exercises: String,
    #[serde(rename = "Diet")]
    diet: String,
    #[serde(rename = "Equipment")]
    equipment: String,
}

fn invalid_value(field: &str, value: &str) -> DataLoadError {
    DataLoadError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Decode a categorical cell: either an integer code or one of `labels`,
/// where a label's position in the slice is its code.
fn decode(field: &str, value: &str, labels: &[&str]) -> Result<u8> {
    let trimmed = value.trim();
    if let Ok(code) = trimmed.parse::<u8>() {
        if usize::from(code) < labels.len() {
            return Ok(code);
        }
        return Err(invalid_value(field, value));
    }
    labels
        .iter()
        .position(|label| label.eq_ignore_ascii_case(trimmed))
        .map(|pos| pos as u8)
        .ok_or_else(|| invalid_value(field, value))
}

/// Numeric cells must be finite; "NaN" and "inf" otherwise parse as f64
fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_value(field, &value.to_string()))
    }
}

fn parse_sex(s: &str) -> Result<Sex> {
    let code = decode("Sex", s, &["Female", "Male"])?;
    Sex::from_code(code).ok_or_else(|| invalid_value("Sex", s))
}

fn parse_flag(field: &str, s: &str) -> Result<bool> {
    Ok(decode(field, s, &["No", "Yes"])? == 1)
}

fn parse_level(s: &str) -> Result<Level> {
    let code = decode("Level", s, &["Normal", "Obese", "Overweight", "Underweight"])?;
    Level::from_code(code).ok_or_else(|| invalid_value("Level", s))
}

fn parse_fitness_goal(s: &str) -> Result<FitnessGoal> {
    let code = decode("Fitness Goal", s, &["Weight Gain", "Weight Loss"])?;
    FitnessGoal::from_code(code).ok_or_else(|| invalid_value("Fitness Goal", s))
}

fn parse_fitness_type(s: &str) -> Result<FitnessType> {
    let code = decode("Fitness Type", s, &["Cardio Fitness", "Muscular Fitness"])?;
    FitnessType::from_code(code).ok_or_else(|| invalid_value("Fitness Type", s))
}

impl TryFrom<RawRow> for CatalogRecord {
    type Error = DataLoadError;

    fn try_from(row: RawRow) -> Result<Self> {
        let profile = UserProfile {
            sex: parse_sex(&row.sex)?,
            age: finite("Age", row.age)?,
            height_m: finite("Height", row.height)?,
            weight_kg: finite("Weight", row.weight)?,
            hypertension: parse_flag("Hypertension", &row.hypertension)?,
            diabetes: parse_flag("Diabetes", &row.diabetes)?,
            bmi: finite("BMI", row.bmi)?,
            level: parse_level(&row.level)?,
            fitness_goal: parse_fitness_goal(&row.fitness_goal)?,
            fitness_type: parse_fitness_type(&row.fitness_type)?,
        };

        Ok(CatalogRecord {
            profile,
            plan: Plan {
                exercises: row.exercises,
                diet: row.diet,
                equipment: row.equipment,
            },
        })
    }
}

/// Parse reference records from any reader producing CSV text
pub fn parse_catalog<R: Read>(input: R) -> Result<Vec<CatalogRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut records = Vec::new();

    for (idx, result) in reader.deserialize::<RawRow>().enumerate() {
        // Header occupies line 1
        let line_no = idx as u64 + 2;
        let row = result.map_err(|e| DataLoadError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or(line_no),
            reason: e.to_string(),
        })?;
        records.push(CatalogRecord::try_from(row)?);
    }

    debug!("Parsed {} reference records", records.len());
    Ok(records)
}

/// Parse the reference table at `path`
pub fn parse_catalog_file(path: &Path) -> Result<Vec<CatalogRecord>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path)?;
    parse_catalog(file)
}

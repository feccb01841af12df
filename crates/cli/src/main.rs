use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{NormalizationStats, ProfileRequest, ReferenceCatalog, UserProfile, compute_bmi};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ranking::ScoredRow;
use recommender::{
    EngineConfig, FeedbackEvaluator, RecommendationEngine, RecommendationSet,
    mean_reciprocal_rank,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// GymRecs - workout, diet and equipment recommendations
#[derive(Parser)]
#[command(name = "gym-recs")]
#[command(about = "Recommends fitness plans from similar users in a reference table", long_about = None)]
struct Cli {
    /// Path to the reference table (CSV)
    #[arg(short, long, global = true, default_value = "data/gym_recommendation.csv")]
    data_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend plans for a profile
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Neighbors voted on per query
        #[arg(long, default_value_t = 5)]
        neighbors: usize,

        /// Perturbed re-runs attempted for alternative plans
        #[arg(long, default_value_t = 2)]
        variation_attempts: usize,

        /// Seed for reproducible variations
        #[arg(long)]
        seed: Option<u64>,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,

        /// Show the nearest reference rows and their similarity
        #[arg(long)]
        explain: bool,

        /// Relevance of each returned plan, e.g. "1,0,1"
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Print the fitted normalization statistics as JSON
    Stats,

    /// Score a feedback vector without running a recommendation
    Evaluate {
        /// Relevance of each plan in presentation order, e.g. "0,1,0"
        #[arg(long)]
        feedback: String,

        /// Number of plans the feedback must cover
        #[arg(long)]
        expected: Option<usize>,
    },
}

/// Profile flags; categorical attributes take their integer codes
#[derive(clap::Args)]
struct ProfileArgs {
    /// 0 = Female, 1 = Male
    #[arg(long)]
    sex: u8,

    /// Age in years
    #[arg(long)]
    age: f64,

    /// Height in meters
    #[arg(long)]
    height: f64,

    /// Weight in kilograms
    #[arg(long)]
    weight: f64,

    /// 0 = No, 1 = Yes
    #[arg(long)]
    hypertension: u8,

    /// 0 = No, 1 = Yes
    #[arg(long)]
    diabetes: u8,

    /// Body mass index; computed from weight and height when omitted
    #[arg(long)]
    bmi: Option<f64>,

    /// 0 = Normal, 1 = Obese, 2 = Overweight, 3 = Underweight
    #[arg(long)]
    level: u8,

    /// 0 = Weight Gain, 1 = Weight Loss
    #[arg(long)]
    fitness_goal: u8,

    /// 0 = Cardio Fitness, 1 = Muscular Fitness
    #[arg(long)]
    fitness_type: u8,
}

impl ProfileArgs {
    fn to_request(&self) -> Result<ProfileRequest> {
        let bmi = match self.bmi {
            Some(bmi) => bmi,
            None => compute_bmi(self.weight, self.height).ok_or_else(|| {
                anyhow!(
                    "cannot compute BMI from weight {} and height {}",
                    self.weight,
                    self.height
                )
            })?,
        };

        Ok(ProfileRequest {
            sex: self.sex,
            age: self.age,
            height_m: self.height,
            weight_kg: self.weight,
            hypertension: self.hypertension,
            diabetes: self.diabetes,
            bmi,
            level: self.level,
            fitness_goal: self.fitness_goal,
            fitness_type: self.fitness_type,
        })
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            profile,
            neighbors,
            variation_attempts,
            seed,
            json,
            explain,
            feedback,
        } => {
            let config = EngineConfig::default()
                .with_neighbor_count(neighbors)
                .with_variation_attempts(variation_attempts);
            let engine = load_engine(&cli.data_path, config)?;
            handle_recommend(&engine, &profile, seed, json, explain, feedback.as_deref())?
        }
        Commands::Stats => handle_stats(&cli.data_path)?,
        Commands::Evaluate { feedback, expected } => handle_evaluate(&feedback, expected)?,
    }

    Ok(())
}

fn load_catalog(path: &Path) -> Result<(ReferenceCatalog, NormalizationStats)> {
    let start = Instant::now();
    let (catalog, stats) = ReferenceCatalog::load_from_file(path)
        .with_context(|| format!("Failed to load reference table {}", path.display()))?;
    info!(
        rows = catalog.len(),
        "Loaded reference table in {:?}",
        start.elapsed()
    );
    Ok((catalog, stats))
}

fn load_engine(path: &Path, config: EngineConfig) -> Result<RecommendationEngine> {
    let (catalog, stats) = load_catalog(path)?;
    RecommendationEngine::new(Arc::new(catalog), Arc::new(stats), config)
        .context("Failed to configure recommendation engine")
}

/// `recommend --json` output: the plans, plus neighbors and MRR when asked for
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    recommendations: &'a RecommendationSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    neighbors: Option<&'a [ScoredRow]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_reciprocal_rank: Option<f64>,
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    profile: &ProfileArgs,
    seed: Option<u64>,
    json: bool,
    explain: bool,
    feedback: Option<&str>,
) -> Result<()> {
    let request = profile.to_request()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let set = engine
        .recommend_request(&request, &mut rng)
        .context("Failed to produce recommendations")?;

    let neighbors = if explain {
        Some(engine.neighbors(&UserProfile::try_from(request)?)?)
    } else {
        None
    };
    let mrr = match feedback {
        Some(raw) => {
            let flags = parse_feedback(raw)?;
            Some(
                FeedbackEvaluator::score(&set, &flags)
                    .context("Feedback must rate every returned plan")?,
            )
        }
        None => None,
    };

    if json {
        let report = JsonReport {
            recommendations: &set,
            neighbors: neighbors.as_deref(),
            mean_reciprocal_rank: mrr,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_recommendations(&set);
    if let Some(neighbors) = &neighbors {
        println!("{}", "Nearest reference rows:".bold().blue());
        for (rank, row) in neighbors.iter().enumerate() {
            println!(
                "  {}. row {} - similarity {:.4}",
                (rank + 1).to_string().green(),
                row.index,
                row.score
            );
        }
    }
    if let Some(mrr) = mrr {
        println!("{} {:.4}", "Mean reciprocal rank:".bold(), mrr);
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(path: &Path) -> Result<()> {
    let (_catalog, stats) = load_catalog(path)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Handle the 'evaluate' command
fn handle_evaluate(raw: &str, expected: Option<usize>) -> Result<()> {
    let flags = parse_feedback(raw)?;
    let mrr = match expected {
        Some(expected) => FeedbackEvaluator::score_for(expected, &flags)?,
        None => mean_reciprocal_rank(&flags),
    };
    println!("{} {:.4}", "Mean reciprocal rank:".bold(), mrr);
    Ok(())
}

/// Parse "1,0,1" into relevance flags; only 0 and 1 are accepted
fn parse_feedback(raw: &str) -> Result<Vec<bool>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "1" => Ok(true),
            "0" => Ok(false),
            other => bail!("feedback values must be 0 or 1, got {other:?}"),
        })
        .collect()
}

fn print_recommendations(set: &RecommendationSet) {
    for (idx, plan) in set.plans().enumerate() {
        let label = if idx == 0 {
            "Exact match"
        } else {
            "Slight variation"
        };
        println!(
            "{}",
            format!("Recommendation {} ({label})", idx + 1).bold().blue()
        );
        println!("{} {}", "EXERCISES:".green(), plan.exercises);
        println!("{} {}", "EQUIPMENT:".green(), plan.equipment);
        println!("{} {}", "DIET:".green(), plan.diet);
        println!();
    }
}

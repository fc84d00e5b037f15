//! Train the dropout risk model
//!
//! Usage: cargo run --bin train_model -- --data data/students.csv
//!        cargo run --bin train_model -- --samples 1000

use anyhow::{Context, Result};
use clap::Parser;
use dropout_risk::data::{generate_sample_data, RecordLoader, StudentRecord};
use dropout_risk::{Config, RiskEngine};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the dropout risk Random Forest")]
struct Args {
    /// Training records (.csv or .json); synthetic data is generated when omitted
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Number of synthetic records when no data file is given
    #[arg(short = 'n', long, default_value = "1000")]
    samples: usize,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model directory (overrides config)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Model name (overrides config)
    #[arg(short, long)]
    model_name: Option<String>,

    /// Number of trees (overrides config)
    #[arg(short, long)]
    trees: Option<usize>,
}

fn load_records(path: &Path) -> Result<Vec<StudentRecord>> {
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let records = if is_json {
        RecordLoader::load_json(path)
    } else {
        RecordLoader::load_csv(path)
    };
    records.with_context(|| format!("Failed to load records from {:?}", path))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load configuration")?,
        None => Config::default(),
    };
    if let Some(dir) = args.model_dir {
        config.engine.model_dir = dir;
    }
    if let Some(name) = args.model_name {
        config.engine.model_name = name;
    }
    if let Some(trees) = args.trees {
        config.engine.forest.n_trees = trees;
    }
    config.engine.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.logging.directive().parse()?),
        )
        .init();

    println!("===========================================");
    println!("  Dropout Risk Model Training");
    println!("===========================================\n");

    let records = match &args.data {
        Some(path) => load_records(path)?,
        None => {
            info!("Generating {} synthetic records", args.samples);
            generate_sample_data(args.samples, 42)?
        }
    };
    println!("Loaded {} records\n", records.len());

    let engine = RiskEngine::new(config.engine);
    let report = engine.train(&records)?;

    println!("Train set: {} samples", report.n_train);
    println!("Test set:  {} samples", report.n_test);
    println!(
        "Labels:    {} stayed, {} dropped out\n",
        report.class_counts.0, report.class_counts.1
    );

    println!("=== Classification Report ===\n");
    match &report.evaluation {
        Some(evaluation) => println!("{}\n", evaluation),
        None => println!("(no held-out samples)\n"),
    }

    println!("=== Feature Importance Ranking ===\n");
    let importance = engine.feature_importance()?;
    for (i, (name, imp)) in importance.ranked().iter().enumerate() {
        let bar = "█".repeat((imp * 40.0) as usize);
        println!("{:2}. {:28} {:.4} {}", i + 1, name, imp, bar);
    }

    println!("\nModel saved to {:?}", report.artifact_path);
    println!("Trained at {}", report.trained_at.to_rfc3339());

    Ok(())
}

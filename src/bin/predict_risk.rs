//! Score one student's dropout risk
//!
//! Usage: cargo run --bin predict_risk -- --attendance 65 --cgpa 2.8 --backlogs 3 \
//!            --assignments 5 --fee-ratio 0.4

use anyhow::{Context, Result};
use clap::Parser;
use dropout_risk::{Config, RiskEngine, StudentRecord};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Predict a student's dropout risk")]
struct Args {
    /// Attendance percentage (0-100)
    #[arg(long)]
    attendance: f64,

    /// CGPA (0-10)
    #[arg(long)]
    cgpa: f64,

    /// Number of backlogs
    #[arg(long)]
    backlogs: f64,

    /// Number of assignments submitted
    #[arg(long)]
    assignments: f64,

    /// Share of fees pending (0.0-1.0)
    #[arg(long)]
    fee_ratio: f64,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model name (overrides config)
    #[arg(short, long)]
    model_name: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).context("Failed to load configuration")?,
        None => Config::default(),
    };
    if let Some(name) = args.model_name {
        config.engine.model_name = name;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.logging.directive().parse()?),
        )
        .init();

    let record = StudentRecord::new(
        args.attendance,
        args.cgpa,
        args.backlogs,
        args.assignments,
        args.fee_ratio,
    );

    let engine = RiskEngine::new(config.engine);
    let result = engine
        .predict(&record)
        .context("Prediction failed; train a model first with `train_model`")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Risk Score: {:.2}", result.risk_score);
    println!("Risk Level: {}", result.risk_level);
    println!("Top Reasons:");
    for (i, reason) in result.top_reasons.iter().enumerate() {
        println!(
            "  {}. {} [{}]: {}",
            i + 1,
            reason.factor,
            reason.impact,
            reason.description
        );
    }

    Ok(())
}

//! Print the current model's feature importance
//!
//! Usage: cargo run --bin feature_importance -- --model-name dropout_model

use anyhow::{Context, Result};
use clap::Parser;
use dropout_risk::{Config, RiskEngine};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show global feature importance")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model name (overrides config)
    #[arg(short, long)]
    model_name: Option<String>,

    /// Sort by importance instead of feature order
    #[arg(short, long)]
    ranked: bool,
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

    let engine = RiskEngine::new(config.engine);
    let importance = engine
        .feature_importance()
        .context("No trained model available")?;
    let info = engine.model_info()?;

    println!(
        "Model '{}' ({} trees, trained {})\n",
        info.model_name,
        info.n_trees,
        info.trained_at.to_rfc3339()
    );

    let entries: Vec<(&str, f64)> = if args.ranked {
        importance.ranked()
    } else {
        importance.iter().collect()
    };

    for (name, imp) in entries {
        let bar = "█".repeat((imp * 40.0) as usize);
        println!("{:28} {:.4} {}", name, imp, bar);
    }

    Ok(())
}

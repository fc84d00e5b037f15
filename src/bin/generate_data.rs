//! Generate synthetic labelled student records
//!
//! Usage: cargo run --bin generate_data -- --samples 1000 --output data/students.csv

use anyhow::{Context, Result};
use clap::Parser;
use dropout_risk::data::{generate_sample_data, RecordLoader};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate synthetic student records")]
struct Args {
    /// Number of records
    #[arg(short = 'n', long, default_value = "1000")]
    samples: usize,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output file (.csv or .json)
    #[arg(short, long, default_value = "data/students.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dropout_risk=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("Generating {} records with seed {}", args.samples, args.seed);
    let records = generate_sample_data(args.samples, args.seed)?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let is_json = args
        .output
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        RecordLoader::save_json(&records, &args.output)?;
    } else {
        RecordLoader::save_csv(&records, &args.output)?;
    }

    let dropouts = records.iter().filter(|r| r.dropout == Some(1)).count();
    println!("Saved {} records to {:?}", records.len(), args.output);
    println!(
        "Dropout rate: {:.2}%",
        dropouts as f64 / records.len().max(1) as f64 * 100.0
    );

    Ok(())
}

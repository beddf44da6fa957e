//! Offline trainer: load historical sales, compare candidates, persist the
//! winner.

use anyhow::{Context, Result};
use clap::Parser;
use housecast::dataset::read_csv;
use housecast::preprocess::{prepare, ColumnTransformer};
use housecast::store::{ModelStore, DEFAULT_MODEL_PATH};
use housecast::train::Trainer;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "train", about = "Train and persist the house price model")]
struct Args {
    /// CSV of historical sales.
    #[arg(long)]
    data: PathBuf,

    /// Where to write the model artifact.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Seed for the train/test split and the ensembles.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Held-out fraction.
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let args = Args::parse();
    info!(data = %args.data.display(), "loading historical sales");

    let raw = read_csv(&args.data)
        .with_context(|| format!("loading {}", args.data.display()))?;
    info!(rows = raw.n_rows(), columns = raw.n_columns(), "loaded dataset");

    let (features, target) = prepare(raw).context("preparing training data")?;

    let outcome = Trainer::new()
        .with_seed(args.seed)
        .with_test_size(args.test_size)
        .train(&features, &target, &ColumnTransformer::new())
        .context("training")?;

    for report in &outcome.reports {
        println!(
            "{:<20} rmse={:>12.2}  mae={:>12.2}  r2={:>7.4}",
            report.name, report.evaluation.rmse, report.evaluation.mae, report.evaluation.r2
        );
    }
    println!("winner: {}", outcome.winner);

    let store = ModelStore::new(&args.output);
    store
        .save(&outcome.pipeline)
        .with_context(|| format!("saving {}", args.output.display()))?;
    println!("saved model to {}", args.output.display());

    Ok(())
}

//! Online prediction server: load the persisted pipeline once, answer
//! `POST /predict`.

use anyhow::{Context, Result};
use clap::Parser;
use housecast::serve::{handle_rejection, routes, PredictionService};
use housecast::store::{ModelStore, DEFAULT_MODEL_PATH};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warp::Filter;

#[derive(Parser, Debug)]
#[command(name = "serve", about = "Serve house price predictions over HTTP")]
struct Args {
    /// Model artifact to serve.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let args = Args::parse();

    // Fail fast: a missing or corrupt artifact stops startup, never a
    // request.
    let pipeline = ModelStore::new(&args.model)
        .load()
        .with_context(|| format!("loading model from {}", args.model.display()))?;
    let service = PredictionService::new(Arc::new(pipeline));
    info!(model = %args.model.display(), port = args.port, "serving predictions");

    let api = routes(service).recover(handle_rejection);
    warp::serve(api).run(([0, 0, 0, 0], args.port)).await;

    Ok(())
}

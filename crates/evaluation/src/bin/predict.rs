//! Top-1 predictions for the unlabelled test queries

use anyhow::Context;
use skillmatch_common::config::AppConfig;
use skillmatch_evaluation::{dataset, init_tracing, predictions};
use skillmatch_search::RecommendationEngine;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.observability);

    info!("Running prediction pipeline");

    let engine = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || RecommendationEngine::from_config(&config)).await??
    };
    let samples = dataset::load_samples(&config.evaluation.test_path)?;

    let generated = predictions::generate(&engine, &samples).await;
    let path = &config.evaluation.predictions_path;
    predictions::write_predictions(path, &generated)?;
    let rows = predictions::validate_predictions(path)?;

    info!(predictions = rows, output = %path, "Prediction complete");
    Ok(())
}

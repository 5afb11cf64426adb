//! Mean Recall@K evaluation against the labelled training queries

use anyhow::Context;
use skillmatch_common::config::AppConfig;
use skillmatch_evaluation::{dataset, init_tracing, recall};
use skillmatch_search::RecommendationEngine;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.observability);

    info!("Running full evaluation pipeline");

    let engine = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || RecommendationEngine::from_config(&config)).await??
    };
    let samples = dataset::load_samples(&config.evaluation.train_path)?;

    let report = recall::evaluate(&engine, &samples).await;
    recall::write_report(&report, &config.evaluation.output_dir)?;

    info!(
        recall_at_1 = report.mean(1),
        recall_at_3 = report.mean(3),
        recall_at_5 = report.mean(5),
        recall_at_10 = report.mean(10),
        "Evaluation complete"
    );

    Ok(())
}

//! Build the assessment catalog from the curated seed list.
//!
//! Seed records come first, then records from any existing catalog, then
//! numbered variations of the seeds until the catalog reaches its minimum
//! size. The result is written as JSON and CSV.

use anyhow::Context;
use skillmatch_common::{catalog::seed, config::AppConfig};
use skillmatch_evaluation::init_tracing;
use std::path::Path;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.observability);

    let seed_path = Path::new(&config.catalog.seed_path);
    let catalog_path = Path::new(&config.catalog.path);
    let csv_path = Path::new(&config.catalog.csv_path);

    let base = seed::read_records(seed_path)
        .with_context(|| format!("failed to read seed records from {}", seed_path.display()))?;
    let existing = seed::read_existing(catalog_path);
    info!(seed = base.len(), existing = existing.len(), "Expanding catalog");

    let records = seed::expand_catalog(&base, existing)?;
    seed::write_json(catalog_path, &records)?;
    seed::write_csv(csv_path, &records)?;

    info!(
        total = records.len(),
        json = %catalog_path.display(),
        csv = %csv_path.display(),
        "Catalog written"
    );
    Ok(())
}

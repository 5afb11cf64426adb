//! SkillMatch offline tooling
//!
//! Scores the recommendation engine against labelled queries (Mean
//! Recall@K), generates top-1 predictions for an unlabelled test set and
//! seeds the assessment catalog.

pub mod dataset;
pub mod predictions;
pub mod recall;

use async_trait::async_trait;
use skillmatch_common::{config::ObservabilityConfig, errors::AppError};
use skillmatch_search::RecommendationEngine;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors from the offline tooling
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path} has no rows with a query")]
    NoQueries { path: PathBuf },

    #[error("invalid header: expected {expected:?}, got {found:?}")]
    InvalidHeader { expected: String, found: String },

    #[error("recommendation failed: {0}")]
    Engine(#[from] AppError),
}

impl EvaluationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvaluationError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Anything that can turn a query into ranked assessment URLs
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend_urls(&self, query: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl Recommender for RecommendationEngine {
    async fn recommend_urls(&self, query: &str) -> Result<Vec<String>> {
        let recommendations = self.recommend(query).await?;
        Ok(recommendations.into_iter().map(|r| r.url).collect())
    }
}

/// Log subscriber for the command-line tools
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

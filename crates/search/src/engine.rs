//! Recommendation engine
//!
//! Construction is a one-time, blocking phase that validates the catalog and
//! embeds every record. The built engine is immutable; any number of queries
//! can run against it concurrently through a shared reference.

use crate::resolver::QueryResolver;
use crate::retrieval::{detect_focus, rank, Diversifier, ScoredIndex};
use serde::{Deserialize, Serialize};
use skillmatch_common::{
    catalog::{AssessmentRecord, Catalog, SupportFlag, Topic},
    config::AppConfig,
    embeddings::{Embedder, EmbeddingTable, HashEmbedder},
    errors::{AppError, Result},
    metrics,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// One recommended assessment as returned to API callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub url: String,
    pub name: String,
    pub adaptive_support: SupportFlag,
    pub description: String,
    pub duration: u32,
    pub remote_support: SupportFlag,
    pub test_type: Vec<String>,
}

impl From<&AssessmentRecord> for Recommendation {
    fn from(record: &AssessmentRecord) -> Self {
        Self {
            url: record.url.clone(),
            name: record.name.clone(),
            adaptive_support: record.adaptive_support.clone(),
            description: record.description.clone(),
            duration: record.duration,
            remote_support: record.remote_support.clone(),
            test_type: record.test_type.to_vec(),
        }
    }
}

/// Immutable catalog plus embedding table, and the stateless query pipeline
pub struct RecommendationEngine {
    catalog: Catalog,
    embeddings: EmbeddingTable,
    buckets: Vec<Topic>,
    embedder: Arc<dyn Embedder>,
    resolver: QueryResolver,
    diversifier: Diversifier,
}

impl RecommendationEngine {
    /// Embed every catalog record and assemble the engine
    pub fn build(catalog: Catalog, embedder: Arc<dyn Embedder>, resolver: QueryResolver) -> Self {
        let embeddings = EmbeddingTable::build(&catalog, embedder.as_ref());
        let buckets = catalog.iter().map(AssessmentRecord::topic).collect();

        info!(
            assessments = catalog.len(),
            model = embedder.model_name(),
            dimension = embedder.dimension(),
            "Recommendation engine initialized"
        );

        Self {
            catalog,
            embeddings,
            buckets,
            embedder,
            resolver,
            diversifier: Diversifier::default(),
        }
    }

    /// Load the configured catalog and build with the hash embedder and an
    /// HTTP-backed resolver. Fails if the catalog is unreadable or too small.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = Catalog::load(&config.catalog.path)?;
        let resolver = QueryResolver::from_config(&config.resolver)?;
        Ok(Self::build(catalog, Arc::new(HashEmbedder::new()), resolver))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Full similarity ranking of the catalog against already-resolved text
    pub fn rank_text(&self, text: &str) -> Vec<ScoredIndex> {
        let query = self.embedder.embed(text);
        rank(&query, &self.embeddings)
    }

    /// Final, diversified selection for already-resolved text
    pub fn select(&self, text: &str) -> Vec<ScoredIndex> {
        let ranked = self.rank_text(text);
        self.diversifier.diversify(&ranked, &self.buckets, text)
    }

    /// Recommend up to ten assessments for a free-text or URL query
    #[instrument(skip(self), fields(query_len = query.len()))]
    pub async fn recommend(&self, query: &str) -> Result<Vec<Recommendation>> {
        let start = Instant::now();

        let resolved = self.resolver.resolve(query).await;
        let selected = self.select(&resolved.text);

        let recommendations = selected
            .iter()
            .map(|scored| {
                self.catalog
                    .get(scored.index)
                    .map(Recommendation::from)
                    .ok_or_else(|| AppError::Internal {
                        message: format!("ranked index {} outside catalog", scored.index),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let focus = detect_focus(&resolved.text);
        let elapsed = start.elapsed();
        metrics::record_recommendation(elapsed.as_secs_f64(), resolved.source.as_str(), focus.len());

        info!(
            source = resolved.source.as_str(),
            focus = ?focus,
            results = recommendations.len(),
            latency_ms = elapsed.as_millis() as u64,
            "Recommendations generated"
        );

        Ok(recommendations)
    }
}

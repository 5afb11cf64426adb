//! Embedding generation
//!
//! Provides a unified interface for turning text into fixed-length vectors.
//! The production embedder is a deterministic feature hash: every
//! whitespace token contributes a sinusoid whose phase is the token's
//! 32-bit rolling hash. It is reproducible bit for bit and needs no model.

use crate::catalog::Catalog;
use crate::EMBEDDING_DIMENSION;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Scale applied to every token contribution
const TOKEN_WEIGHT: f64 = 0.1;

/// Progress is logged every this many embedded records
const PROGRESS_INTERVAL: usize = 50;

/// L2-normalised embedding (or the zero vector for degenerate input)
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f64>);

impl EmbeddingVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// Trait for embedding generation
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    fn embed(&self, text: &str) -> EmbeddingVector;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;
}

/// Deterministic feature-hash embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIMENSION,
        }
    }

    /// 32-bit signed rolling hash over UTF-16 code units (`h = h*31 + c`)
    pub fn token_hash(token: &str) -> i32 {
        token
            .encode_utf16()
            .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> EmbeddingVector {
        let lowered = text.to_lowercase();
        let mut values = vec![0.0f64; self.dimension];

        for token in lowered.split_whitespace() {
            let phase = f64::from(Self::token_hash(token));
            for (i, value) in values.iter_mut().enumerate() {
                *value += (phase + i as f64).sin() * TOKEN_WEIGHT;
            }
        }

        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm != 0.0 {
            for value in &mut values {
                *value /= norm;
            }
        }

        EmbeddingVector(values)
    }

    fn model_name(&self) -> &str {
        "feature-hash-sin"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// One cached vector per catalog record, indexed by record index.
///
/// Built once and never mutated.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    vectors: Vec<EmbeddingVector>,
}

impl EmbeddingTable {
    /// Embed every catalog record in parallel
    pub fn build(catalog: &Catalog, embedder: &dyn Embedder) -> Self {
        let start = Instant::now();
        let total = catalog.len();
        let done = AtomicUsize::new(0);

        tracing::info!(
            records = total,
            model = embedder.model_name(),
            "Generating embeddings for assessments"
        );

        let vectors: Vec<EmbeddingVector> = catalog
            .records()
            .par_iter()
            .map(|record| {
                let vector = embedder.embed(&record.embedding_text());
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % PROGRESS_INTERVAL == 0 {
                    tracing::debug!(finished, total, "Embedding progress");
                }
                vector
            })
            .collect();

        crate::metrics::record_embedding(start.elapsed().as_secs_f64(), embedder.model_name(), total);
        tracing::info!(
            records = total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Embedding generation complete"
        );

        Self { vectors }
    }

    pub fn get(&self, index: usize) -> Option<&EmbeddingVector> {
        self.vectors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbeddingVector> {
        self.vectors.iter()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl From<Vec<EmbeddingVector>> for EmbeddingTable {
    fn from(vectors: Vec<EmbeddingVector>) -> Self {
        Self { vectors }
    }
}

//! SkillMatch Common Library
//!
//! Shared code for all SkillMatch crates including:
//! - Assessment catalog model, loading and seeding
//! - Deterministic feature-hash embedder
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod catalog;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use catalog::{AssessmentRecord, Catalog, DatasetError, Topic};
pub use config::AppConfig;
pub use embeddings::{EmbeddingTable, EmbeddingVector, HashEmbedder};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Embedding dimension produced by [`HashEmbedder`]
pub const EMBEDDING_DIMENSION: usize = 384;

/// Minimum number of records a catalog must hold to be usable
pub const MIN_CATALOG_SIZE: usize = 377;

/// Number of recommendations returned per query
pub const RECOMMENDATION_LIMIT: usize = 10;

//! Catalog retrieval
//!
//! Two stages run per query:
//! - Vector ranking (cosine similarity against every cached embedding)
//! - Diversification (spread results across topic buckets for multi-topic queries)

mod diversify;
mod vector;

pub use diversify::{detect_focus, Diversifier};
pub use vector::{cosine_similarity, rank};

use serde::{Deserialize, Serialize};

/// A catalog index paired with its similarity to the query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoredIndex {
    /// Catalog record index
    pub index: usize,

    /// Cosine similarity in [-1, 1]
    pub similarity: f64,
}

impl ScoredIndex {
    pub fn new(index: usize, similarity: f64) -> Self {
        Self { index, similarity }
    }
}

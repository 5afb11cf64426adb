//! Vector similarity ranking
//!
//! Scores every cached catalog embedding against the query vector.

use super::ScoredIndex;
use skillmatch_common::embeddings::{EmbeddingTable, EmbeddingVector};
use std::cmp::Ordering;

/// Cosine similarity of two vectors.
///
/// Returns 0 when the dimensions differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm = norm_a.sqrt() * norm_b.sqrt();
    if norm == 0.0 {
        0.0
    } else {
        dot / norm
    }
}

/// Rank the whole table by descending similarity to `query`.
///
/// Equal similarities keep ascending catalog index order.
pub fn rank(query: &EmbeddingVector, table: &EmbeddingTable) -> Vec<ScoredIndex> {
    let mut scored: Vec<ScoredIndex> = table
        .iter()
        .enumerate()
        .map(|(index, vector)| {
            ScoredIndex::new(index, cosine_similarity(query.as_slice(), vector.as_slice()))
        })
        .collect();

    // Stable sort: ties stay in index order
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmatch_common::embeddings::{Embedder, HashEmbedder};

    #[test]
    fn test_self_similarity_is_one() {
        let embedder = HashEmbedder::new();
        let v = embedder.embed("situational judgement test for graduates");
        let sim = cosine_similarity(v.as_slice(), v.as_slice());
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_bounded() {
        let embedder = HashEmbedder::new();
        let texts = ["java", "numerical reasoning", "sales manager", "héllo wörld", "a b c d e f"];
        for a in &texts {
            for b in &texts {
                let sim = cosine_similarity(
                    embedder.embed(a).as_slice(),
                    embedder.embed(b).as_slice(),
                );
                assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&sim), "{} vs {}: {}", a, b, sim);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.3, 0.4]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_rank_orders_descending() {
        let table = EmbeddingTable::from(vec![
            EmbeddingVector::new(vec![0.0, 1.0]),
            EmbeddingVector::new(vec![1.0, 0.0]),
            EmbeddingVector::new(vec![0.6, 0.8]),
            EmbeddingVector::new(vec![-1.0, 0.0]),
        ]);
        let query = EmbeddingVector::new(vec![1.0, 0.0]);

        let ranked: Vec<usize> = rank(&query, &table).iter().map(|s| s.index).collect();
        assert_eq!(ranked, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_rank_ties_keep_index_order() {
        let table = EmbeddingTable::from(vec![
            EmbeddingVector::new(vec![0.0, 1.0]),
            EmbeddingVector::new(vec![1.0, 0.0]),
            EmbeddingVector::new(vec![0.0, 1.0]),
            EmbeddingVector::new(vec![1.0, 0.0]),
            EmbeddingVector::new(vec![0.0, 0.0]),
        ]);
        let query = EmbeddingVector::new(vec![1.0, 0.0]);

        let first = rank(&query, &table);
        let second = rank(&query, &table);
        assert_eq!(first, second);

        let ranked: Vec<usize> = first.iter().map(|s| s.index).collect();
        assert_eq!(ranked, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_zero_query_keeps_catalog_order() {
        let embedder = HashEmbedder::new();
        let table = EmbeddingTable::from(vec![
            embedder.embed("alpha"),
            embedder.embed("beta"),
            embedder.embed("gamma"),
        ]);
        let query = embedder.embed("   ");

        let ranked: Vec<usize> = rank(&query, &table).iter().map(|s| s.index).collect();
        assert_eq!(ranked, vec![0, 1, 2]);
    }
}

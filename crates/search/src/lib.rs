//! SkillMatch recommendation engine
//!
//! Resolves a free-text or URL query, ranks every catalog assessment by
//! cosine similarity to the query embedding and picks a topic-diversified
//! top ten.

pub mod engine;
pub mod resolver;
pub mod retrieval;

pub use engine::{Recommendation, RecommendationEngine};
pub use resolver::{HttpFetcher, PageFetcher, QueryResolver, QuerySource, ResolvedQuery};
pub use retrieval::{Diversifier, ScoredIndex};

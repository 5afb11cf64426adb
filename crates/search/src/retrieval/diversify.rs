//! Topic diversification of ranked results
//!
//! For queries that touch several assessment domains the top results are
//! spread across topic buckets instead of being dominated by one bucket:
//! - Each focus topic gets `ceil(limit / focus_count)` slots, filled from
//!   its bucket in ranked order
//! - Leftover slots are backfilled from the global ranking
//! - A single focus topic bypasses bucketing and takes the global top results

use super::ScoredIndex;
use skillmatch_common::{catalog::Topic, RECOMMENDATION_LIMIT};
use std::collections::{HashMap, HashSet};

/// Topics a query is about, in detection order.
///
/// A topic is in focus when any of its keywords occurs as a substring of the
/// lowercased query. With no match the default `{cognitive, personality}`
/// focus applies.
pub fn detect_focus(query: &str) -> Vec<Topic> {
    let query = query.to_lowercase();

    let focus: Vec<Topic> = Topic::FOCUS_ORDER
        .iter()
        .copied()
        .filter(|topic| topic.keywords().iter().any(|keyword| query.contains(keyword)))
        .collect();

    if focus.is_empty() {
        Topic::DEFAULT_FOCUS.to_vec()
    } else {
        focus
    }
}

/// Diversification parameters
#[derive(Debug, Clone)]
pub struct Diversifier {
    /// Number of results produced
    pub limit: usize,
}

impl Default for Diversifier {
    fn default() -> Self {
        Self {
            limit: RECOMMENDATION_LIMIT,
        }
    }
}

impl Diversifier {
    /// Select the final results from a full ranking.
    ///
    /// `buckets[i]` is the topic of catalog record `i`; indices outside the
    /// slice are treated as [`Topic::Other`].
    pub fn diversify(&self, ranked: &[ScoredIndex], buckets: &[Topic], query: &str) -> Vec<ScoredIndex> {
        let focus = detect_focus(query);

        if focus.len() <= 1 {
            return ranked.iter().take(self.limit).copied().collect();
        }

        // Bucket members keep their ranked order
        let mut groups: HashMap<Topic, Vec<ScoredIndex>> = HashMap::new();
        for scored in ranked {
            let topic = buckets.get(scored.index).copied().unwrap_or(Topic::Other);
            groups.entry(topic).or_default().push(*scored);
        }

        let per_topic = self.limit.div_ceil(focus.len());
        let mut selected: Vec<ScoredIndex> = Vec::with_capacity(self.limit + per_topic);

        for topic in &focus {
            if let Some(group) = groups.get(topic) {
                selected.extend(group.iter().take(per_topic).copied());
            }
        }

        if selected.len() < self.limit {
            let remaining = self.limit - selected.len();
            let used: HashSet<usize> = selected.iter().map(|s| s.index).collect();
            selected.extend(
                ranked
                    .iter()
                    .filter(|s| !used.contains(&s.index))
                    .take(remaining)
                    .copied(),
            );
        }

        selected.truncate(self.limit);

        tracing::debug!(
            focus = ?focus,
            per_topic,
            selected = selected.len(),
            "Diversified recommendations"
        );

        selected
    }
}

//! Mean Recall@K evaluation
//!
//! `recall@k = |top-k ∩ relevant| / |relevant|`, averaged over every sample
//! that has both a query and at least one relevant URL.

use crate::dataset::Sample;
use crate::{EvaluationError, Recommender, Result};
use chrono::{SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Cut-offs evaluated
pub const K_VALUES: [usize; 4] = [1, 3, 5, 10];

/// File names written into the output directory
pub const RESULTS_FILE: &str = "recall_results.json";
pub const SUMMARY_FILE: &str = "recall_summary.csv";

const PROGRESS_INTERVAL: usize = 10;

/// Fraction of `relevant` found in `recommended`; 0 when nothing is relevant
pub fn calculate_recall(relevant: &[String], recommended: &[String]) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let relevant_set: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    let hits = recommended
        .iter()
        .filter(|url| relevant_set.contains(url.as_str()))
        .count();

    hits as f64 / relevant.len() as f64
}

/// Scores for one cut-off
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RecallAtK {
    pub mean: f64,
    pub samples: usize,
    pub individual_scores: Vec<f64>,
}

impl RecallAtK {
    fn from_scores(individual_scores: Vec<f64>) -> Self {
        let samples = individual_scores.len();
        let mean = if samples == 0 {
            0.0
        } else {
            individual_scores.iter().sum::<f64>() / samples as f64
        };

        Self {
            mean,
            samples,
            individual_scores,
        }
    }
}

/// Values keyed by cut-off, serialized as `recall_at_{k}` in ascending k
#[derive(Debug, Clone, PartialEq)]
pub struct ByCutoff<T>(pub Vec<(usize, T)>);

impl<T> ByCutoff<T> {
    pub fn get(&self, k: usize) -> Option<&T> {
        self.0.iter().find(|(cutoff, _)| *cutoff == k).map(|(_, value)| value)
    }
}

impl<T: Serialize> Serialize for ByCutoff<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, value) in &self.0 {
            map.serialize_entry(&format!("recall_at_{}", k), value)?;
        }
        map.end()
    }
}

/// Full evaluation report as written to `recall_results.json`
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub timestamp: String,
    pub evaluation_type: String,
    pub dataset_size: usize,
    pub results: ByCutoff<RecallAtK>,
    pub summary: ByCutoff<f64>,
}

impl EvaluationReport {
    pub fn mean(&self, k: usize) -> f64 {
        self.summary.get(k).copied().unwrap_or(0.0)
    }
}

/// Run every usable sample through the recommender and score each cut-off.
///
/// Samples without a query or relevant URLs are skipped; a sample whose
/// recommendation fails is logged and skipped.
pub async fn evaluate<R>(recommender: &R, samples: &[Sample]) -> EvaluationReport
where
    R: Recommender + ?Sized,
{
    info!(samples = samples.len(), "Starting Recall@K evaluation");

    let mut scores: Vec<Vec<f64>> = vec![Vec::new(); K_VALUES.len()];

    for (i, sample) in samples.iter().enumerate() {
        let Some(query) = sample.query.as_deref() else {
            continue;
        };
        if sample.relevant_urls.is_empty() {
            continue;
        }

        let recommended = match recommender.recommend_urls(query).await {
            Ok(urls) => urls,
            Err(e) => {
                error!(row = sample.row, error = %e, "Error evaluating sample");
                continue;
            }
        };

        for (slot, &k) in K_VALUES.iter().enumerate() {
            let top_k = &recommended[..recommended.len().min(k)];
            scores[slot].push(calculate_recall(&sample.relevant_urls, top_k));
        }

        if i % PROGRESS_INTERVAL == 0 {
            debug!(evaluated = i + 1, total = samples.len(), "Evaluation progress");
        }
    }

    let results: Vec<(usize, RecallAtK)> = K_VALUES
        .iter()
        .copied()
        .zip(scores)
        .map(|(k, scores)| (k, RecallAtK::from_scores(scores)))
        .collect();

    for (k, recall) in &results {
        info!(k, mean = recall.mean, samples = recall.samples, "Recall@{}: {:.4}", k, recall.mean);
    }

    let summary = results.iter().map(|(k, recall)| (*k, recall.mean)).collect();

    EvaluationReport {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        evaluation_type: "Mean Recall@K".to_string(),
        dataset_size: samples.len(),
        results: ByCutoff(results),
        summary: ByCutoff(summary),
    }
}

/// Write `recall_results.json` and `recall_summary.csv` into `output_dir`
pub fn write_report(report: &EvaluationReport, output_dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).map_err(|e| EvaluationError::io(output_dir, e))?;

    let results_path = output_dir.join(RESULTS_FILE);
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&results_path, json).map_err(|e| EvaluationError::io(&results_path, e))?;
    info!(path = %results_path.display(), "Evaluation results saved");

    let summary_path = output_dir.join(SUMMARY_FILE);
    let mut writer = csv::Writer::from_path(&summary_path)?;
    writer.write_record(["Metric", "Value"])?;
    for (k, mean) in &report.summary.0 {
        writer.write_record([format!("Recall@{}", k), mean.to_string()])?;
    }
    writer.write_record(["Dataset Size".to_string(), report.dataset_size.to_string()])?;
    writer.write_record(["Evaluation Date", report.timestamp.as_str()])?;
    writer.flush().map_err(|e| EvaluationError::io(&summary_path, e))?;
    info!(path = %summary_path.display(), "Summary saved");

    Ok((results_path, summary_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skillmatch_common::errors::AppError;
    use std::collections::HashMap;

    /// Canned rankings per query; unknown queries fail
    struct CannedRecommender(HashMap<&'static str, Vec<&'static str>>);

    #[async_trait]
    impl Recommender for CannedRecommender {
        async fn recommend_urls(&self, query: &str) -> Result<Vec<String>> {
            self.0
                .get(query)
                .map(|urls| urls.iter().map(|u| u.to_string()).collect())
                .ok_or_else(|| {
                    EvaluationError::Engine(AppError::Internal {
                        message: format!("no ranking for {}", query),
                    })
                })
        }
    }

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample(row: usize, query: Option<&str>, relevant: &[&str]) -> Sample {
        Sample {
            row,
            query: query.map(str::to_string),
            relevant_urls: urls(relevant),
        }
    }

    #[test]
    fn test_calculate_recall() {
        let relevant = urls(&["a", "b", "c", "d"]);
        assert_eq!(calculate_recall(&relevant, &urls(&["a", "x", "c"])), 0.5);
        assert_eq!(calculate_recall(&relevant, &urls(&[])), 0.0);
        assert_eq!(calculate_recall(&[], &urls(&["a"])), 0.0);
        assert_eq!(calculate_recall(&urls(&["a"]), &urls(&["b", "a"])), 1.0);
    }

    #[tokio::test]
    async fn test_evaluate_scores_each_cutoff() {
        let recommender = CannedRecommender(HashMap::from([
            ("java", vec!["u1", "u2", "u3", "u4", "u5", "u6"]),
            ("sales", vec!["s1", "s2"]),
        ]));
        let samples = vec![
            sample(0, Some("java"), &["u1", "u4"]),
            sample(1, Some("sales"), &["s9"]),
            sample(2, None, &["u1"]),
            sample(3, Some("java"), &[]),
            sample(4, Some("unknown"), &["u1"]),
        ];

        let report = evaluate(&recommender, &samples).await;

        assert_eq!(report.dataset_size, 5);
        assert_eq!(report.evaluation_type, "Mean Recall@K");

        let at_1 = report.results.get(1).unwrap();
        assert_eq!(at_1.samples, 2);
        assert_eq!(at_1.individual_scores, vec![0.5, 0.0]);
        assert_eq!(at_1.mean, 0.25);

        let at_5 = report.results.get(5).unwrap();
        assert_eq!(at_5.individual_scores, vec![1.0, 0.0]);
        assert_eq!(report.mean(5), 0.5);
        assert_eq!(report.mean(10), 0.5);
    }

    #[test]
    fn test_evaluate_without_usable_samples() {
        let recommender = CannedRecommender(HashMap::new());
        let report = tokio_test::block_on(evaluate(&recommender, &[sample(0, None, &[])]));

        for k in K_VALUES {
            assert_eq!(report.results.get(k).unwrap().samples, 0);
            assert_eq!(report.mean(k), 0.0);
        }
    }

    #[test]
    fn test_report_json_layout() {
        let report = EvaluationReport {
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            evaluation_type: "Mean Recall@K".to_string(),
            dataset_size: 3,
            results: ByCutoff(vec![
                (1, RecallAtK::from_scores(vec![1.0, 0.0])),
                (10, RecallAtK::from_scores(vec![1.0, 1.0])),
            ]),
            summary: ByCutoff(vec![(1, 0.5), (10, 1.0)]),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"]["recall_at_1"]["mean"], 0.5);
        assert_eq!(json["results"]["recall_at_10"]["samples"], 2);
        assert_eq!(json["summary"]["recall_at_10"], 1.0);
        assert_eq!(json["dataset_size"], 3);
    }

    #[test]
    fn test_write_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = EvaluationReport {
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            evaluation_type: "Mean Recall@K".to_string(),
            dataset_size: 4,
            results: ByCutoff(K_VALUES.iter().map(|&k| (k, RecallAtK::default())).collect()),
            summary: ByCutoff(vec![(1, 0.25), (3, 0.5), (5, 0.75), (10, 1.0)]),
        };

        let (results_path, summary_path) = write_report(&report, dir.path().join("evaluation")).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(results_path).unwrap()).unwrap();
        assert_eq!(json["summary"]["recall_at_3"], 0.5);

        let summary = std::fs::read_to_string(summary_path).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Metric,Value",
                "Recall@1,0.25",
                "Recall@3,0.5",
                "Recall@5,0.75",
                "Recall@10,1",
                "Dataset Size,4",
                "Evaluation Date,2024-05-01T12:00:00.000Z",
            ]
        );
    }
}

//! Metrics and observability utilities
//!
//! Provides Prometheus-compatible metrics through the `metrics` facade
//! with standardized naming conventions. Recording is a no-op until a
//! recorder is installed by the binary.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all SkillMatch metrics
pub const METRICS_PREFIX: &str = "skillmatch";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s - URL fetch timeout
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Recommendation metrics
    describe_counter!(
        format!("{}_recommendations_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of recommendation queries"
    );

    describe_histogram!(
        format!("{}_recommendation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Recommendation latency in seconds"
    );

    describe_gauge!(
        format!("{}_recommendation_focus_topics", METRICS_PREFIX),
        Unit::Count,
        "Number of focus topics detected for the last query"
    );

    // Query resolution metrics
    describe_counter!(
        format!("{}_url_fetch_total", METRICS_PREFIX),
        Unit::Count,
        "Total URL queries fetched, by outcome"
    );

    describe_histogram!(
        format!("{}_url_fetch_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "URL fetch latency in seconds"
    );

    // Embedding metrics
    describe_histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Catalog embedding latency in seconds"
    );

    describe_gauge!(
        format!("{}_catalog_records", METRICS_PREFIX),
        Unit::Count,
        "Number of records in the loaded catalog"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record recommendation metrics
pub fn record_recommendation(duration_secs: f64, source: &str, focus_topics: usize) {
    counter!(
        format!("{}_recommendations_total", METRICS_PREFIX),
        "source" => source.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_recommendation_duration_seconds", METRICS_PREFIX),
        "source" => source.to_string()
    )
    .record(duration_secs);

    gauge!(format!("{}_recommendation_focus_topics", METRICS_PREFIX)).set(focus_topics as f64);
}

/// Helper to record URL fetch metrics
pub fn record_url_fetch(duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "fallback" };

    counter!(
        format!("{}_url_fetch_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(format!("{}_url_fetch_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record catalog embedding metrics
pub fn record_embedding(duration_secs: f64, model: &str, records: usize) {
    histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        "model" => model.to_string()
    )
    .record(duration_secs);

    gauge!(format!("{}_catalog_records", METRICS_PREFIX)).set(records as f64);
}

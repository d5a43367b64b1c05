//! Pipeline counters and latency histograms.
//!
//! This module provides metrics for:
//! - Books analyzed, malformed and crossed
//! - Levels dropped by the parser
//! - HTTP request latency
//! - Batch analysis latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::analytics::BatchReport;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Batch analysis latency metric name.
pub const METRIC_BATCH_ANALYSIS_LATENCY: &str = "batch_analysis_latency_ms";
/// Books analyzed counter metric name.
pub const METRIC_BOOKS_ANALYZED: &str = "books_analyzed_total";
/// Malformed books counter metric name.
pub const METRIC_BOOKS_MALFORMED: &str = "books_malformed_total";
/// Crossed books counter metric name.
pub const METRIC_BOOKS_CROSSED: &str = "books_crossed_total";
/// Dropped levels counter metric name.
pub const METRIC_LEVELS_DROPPED: &str = "levels_dropped_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_BATCH_ANALYSIS_LATENCY,
        "Time to analyze one snapshot batch in milliseconds"
    );

    describe_counter!(METRIC_BOOKS_ANALYZED, "Total number of order books analyzed");
    describe_counter!(
        METRIC_BOOKS_MALFORMED,
        "Total number of order book records that could not be parsed"
    );
    describe_counter!(
        METRIC_BOOKS_CROSSED,
        "Total number of order books with best ask below best bid"
    );
    describe_counter!(
        METRIC_LEVELS_DROPPED,
        "Total number of price levels dropped as unparseable"
    );

    debug!("Metrics initialized");
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Record the counters of a finished batch.
pub fn record_batch(report: &BatchReport) {
    counter!(METRIC_BOOKS_ANALYZED).increment(report.records.len() as u64);
    counter!(METRIC_BOOKS_MALFORMED).increment(report.malformed as u64);
    counter!(METRIC_BOOKS_CROSSED).increment(report.crossed as u64);
    counter!(METRIC_LEVELS_DROPPED).increment(report.dropped_levels as u64);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for batch analysis.
pub fn timer_batch_analysis() -> LatencyTimer {
    LatencyTimer::new(METRIC_BATCH_ANALYSIS_LATENCY)
}

//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Resolutions (cache hits, fetched posters, not-found, errors)
//! - Pipeline stage durations (search, extract, download)
//! - External requests to Wikipedia and its image hosts

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Resolutions total by outcome.
pub static RESOLUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("posterd_resolutions_total", "Total poster resolutions"),
        &["outcome"], // "cache_hit", "fetched", "not_found", "error"
    )
    .unwrap()
});

/// Duration of each remote pipeline stage.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "posterd_stage_duration_seconds",
            "Duration of resolution pipeline stages",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["stage"], // "search", "extract", "download"
    )
    .unwrap()
});

/// Poster bytes written to disk.
pub static POSTER_BYTES_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "posterd_poster_bytes_written_total",
        "Total bytes of poster images written to disk",
    )
    .unwrap()
});

// =============================================================================
// External Request Metrics
// =============================================================================

/// External request duration.
pub static EXTERNAL_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "posterd_external_request_duration_seconds",
            "Duration of outbound HTTP requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"], // "page", "image"
    )
    .unwrap()
});

/// External requests total.
pub static EXTERNAL_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "posterd_external_requests_total",
            "Total outbound HTTP requests",
        ),
        &["operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(RESOLUTIONS_TOTAL.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(POSTER_BYTES_WRITTEN.clone()),
        Box::new(EXTERNAL_REQUEST_DURATION.clone()),
        Box::new(EXTERNAL_REQUESTS.clone()),
    ]
}

//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline outcomes
//! - Storage-service logins
//! - Catalog lookups
//! - Offline-download submissions
//! - Upstream HTTP calls (search, auth, storage)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Terminal pipeline outcomes.
pub static PIPELINE_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetdrop_pipeline_outcomes_total",
            "Total pipeline runs by terminal outcome",
        ),
        &["outcome"], // "success", "not_found", "auth_failed", "submission_failed"
    )
    .unwrap()
});

/// Pipeline run duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magnetdrop_pipeline_duration_seconds",
            "Duration of a pipeline run from identifier to outcome",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Credential Metrics
// =============================================================================

/// Login attempts against the auth service.
pub static LOGINS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetdrop_logins_total", "Total login attempts"),
        &["result"], // "success", "rejected", "malformed", "transport_error"
    )
    .unwrap()
});

// =============================================================================
// Resolver Metrics
// =============================================================================

/// Identifier resolutions by path taken.
pub static RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetdrop_resolutions_total",
            "Total identifier resolutions",
        ),
        &["result"], // "direct_magnet", "found", "not_found"
    )
    .unwrap()
});

// =============================================================================
// Submission Metrics
// =============================================================================

/// Offline-download submissions by result.
pub static SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetdrop_submissions_total",
            "Total offline-download submissions",
        ),
        &["result"], // "accepted", "auth_failed", "http_error", "rejected", "transport_error"
    )
    .unwrap()
});

// =============================================================================
// Upstream Metrics
// =============================================================================

/// Upstream HTTP call duration.
pub static UPSTREAM_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magnetdrop_upstream_call_duration_seconds",
            "Duration of upstream HTTP calls",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["upstream", "result"], // result: "completed", "timeout", "connection_failed"
    )
    .unwrap()
});

/// All core metrics, for registration in the binary's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PIPELINE_OUTCOMES.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(LOGINS.clone()),
        Box::new(RESOLUTIONS.clone()),
        Box::new(SUBMISSIONS.clone()),
        Box::new(UPSTREAM_CALL_DURATION.clone()),
    ]
}

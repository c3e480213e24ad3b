//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the bot:
//! - Chat messages by kind
//! - Telegram polling errors
//! - Core pipeline metrics (registered from `magnetdrop_core::metrics`)

use once_cell::sync::Lazy;
use prometheus::{self, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Chat Metrics
// =============================================================================

/// Inbound chat messages by kind.
pub static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetdrop_messages_total", "Total inbound chat messages"),
        &["kind"], // "identifier", "command", "unknown_command", "unauthorized", "ignored"
    )
    .unwrap()
});

/// Failed getUpdates calls.
pub static POLL_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "magnetdrop_poll_errors_total",
        "Total failed Telegram getUpdates calls",
    )
    .unwrap()
});

/// Failed sendMessage calls.
pub static SEND_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "magnetdrop_send_errors_total",
        "Total failed Telegram sendMessage calls",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry.register(Box::new(MESSAGES_TOTAL.clone())).unwrap();
    registry.register(Box::new(POLL_ERRORS_TOTAL.clone())).unwrap();
    registry.register(Box::new(SEND_ERRORS_TOTAL.clone())).unwrap();

    // Core metrics (pipeline, logins, upstream calls)
    for metric in magnetdrop_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
